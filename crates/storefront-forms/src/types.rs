//! Catalog records and form values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Product category identifier.
///
/// The backend sends numeric ids while hosts often hold them as strings, so
/// ids compare by their canonical text form: `10` and `"10"` are equal. The
/// attribute-type list nests the whole category object; its `id` is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host input to binding input: empty ids count as "no category".
    pub fn non_empty(self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::new(s.as_str())),
            Value::Number(n) => Some(match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Self(i.to_string()),
                (None, Some(u)) => Self(u.to_string()),
                _ => Self(n.to_string()),
            }),
            // Nested serializer output: `{"id": 10, "name": "Cards", ...}`.
            Value::Object(map) => map.get("id").and_then(Self::from_json),
            _ => None,
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<u64> for CategoryId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CategoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| {
                serde::de::Error::custom("category must be an id or an object with an `id`")
            })
    }
}

/// Input widget kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    #[default]
    Input,
    Dropdown,
    Date,
    Checkbox,
}

impl AttributeKind {
    /// Unknown kinds render as plain inputs.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "dropdown" => AttributeKind::Dropdown,
            "date" => AttributeKind::Date,
            "checkbox" => AttributeKind::Checkbox,
            _ => AttributeKind::Input,
        }
    }

    /// Value a freshly bound field starts with.
    pub fn initial_value(self) -> FieldValue {
        match self {
            AttributeKind::Checkbox => FieldValue::Flag(false),
            _ => FieldValue::Text(String::new()),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kind = Option::<String>::deserialize(deserializer)?;
        Ok(kind.as_deref().map(AttributeKind::parse).unwrap_or_default())
    }
}

/// One form field in the catalog, owned by a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub id: u64,
    pub name: String,
    #[serde(alias = "category")]
    pub category_id: CategoryId,
    #[serde(default, alias = "attribute_type", alias = "attributeType")]
    pub kind: AttributeKind,
}

impl AttributeDefinition {
    pub fn new(id: u64, name: impl Into<String>, category_id: impl Into<CategoryId>) -> Self {
        Self {
            id,
            name: name.into(),
            category_id: category_id.into(),
            kind: AttributeKind::Input,
        }
    }

    pub fn with_kind(mut self, kind: AttributeKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A selectable value of a dropdown attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOption {
    pub id: u64,
    /// Id of the owning [`AttributeDefinition`].
    pub attribute: u64,
    #[serde(alias = "attribute_value")]
    pub value: String,
}

/// The read-only attribute catalog for a form session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub definitions: Vec<AttributeDefinition>,
    #[serde(default)]
    pub options: Vec<AttributeOption>,
}

impl Catalog {
    pub fn new(definitions: Vec<AttributeDefinition>) -> Self {
        Self {
            definitions,
            options: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<AttributeOption>) -> Self {
        self.options = options;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn for_category<'a>(
        &'a self,
        category: &'a CategoryId,
    ) -> impl Iterator<Item = &'a AttributeDefinition> + 'a {
        self.definitions
            .iter()
            .filter(move |def| &def.category_id == category)
    }

    pub fn options_for(&self, attribute_id: u64) -> Vec<AttributeOption> {
        self.options
            .iter()
            .filter(|opt| opt.attribute == attribute_id)
            .cloned()
            .collect()
    }
}

/// Current value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Attribute name → value for the bound category. Published to hosts as a
/// snapshot; hosts never mutate it in place.
pub type FormValues = BTreeMap<String, FieldValue>;
