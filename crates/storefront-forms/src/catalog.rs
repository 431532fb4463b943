//! Catalog fetching seam and response parsing.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CatalogError;
use crate::types::{AttributeDefinition, AttributeOption, Catalog};

/// Where the attribute catalog comes from.
///
/// Implementations own the network call. The synchronizer turns any error
/// into an empty catalog, so implementations should not retry on its behalf.
#[async_trait(?Send)]
pub trait CatalogSource {
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogError>;
}

/// A catalog already in memory.
#[async_trait(?Send)]
impl CatalogSource for Catalog {
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
        Ok(self.clone())
    }
}

/// REST endpoints for the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    pub definitions_endpoint: String,
    pub options_endpoint: String,
    /// Requested page size; large enough to receive the whole list at once.
    pub page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            definitions_endpoint: "category/attribute-types/".to_string(),
            options_endpoint: "category/attribute-values/".to_string(),
            page_size: 1000,
        }
    }
}

impl CatalogConfig {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn definitions_url(&self, base_url: &str) -> String {
        self.url(base_url, &self.definitions_endpoint)
    }

    pub fn options_url(&self, base_url: &str) -> String {
        self.url(base_url, &self.options_endpoint)
    }

    fn url(&self, base_url: &str, endpoint: &str) -> String {
        format!(
            "{}/{}?page_size={}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/'),
            self.page_size
        )
    }
}

/// Pull the record list out of a list response: either a paginated
/// `{ "results": [...] }` envelope or a bare array.
fn records(body: &Value) -> Result<&Vec<Value>, CatalogError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(CatalogError::Malformed("`results` is not an array".into())),
            None => Err(CatalogError::Malformed("missing `results`".into())),
        },
        _ => Err(CatalogError::Malformed("expected an object or array".into())),
    }
}

fn parse_list<T: for<'de> Deserialize<'de>>(body: &Value) -> Result<Vec<T>, CatalogError> {
    records(body)?
        .iter()
        .map(|item| T::deserialize(item).map_err(CatalogError::from))
        .collect()
}

/// Parse the attribute definition list. One bad record rejects the list.
pub fn parse_definitions(body: &Value) -> Result<Vec<AttributeDefinition>, CatalogError> {
    parse_list(body)
}

/// Parse the dropdown option list.
pub fn parse_options(body: &Value) -> Result<Vec<AttributeOption>, CatalogError> {
    parse_list(body)
}

/// Build a catalog from the two list responses. A broken option list only
/// costs the dropdown choices; a broken definition list fails the catalog.
pub fn parse_catalog(definitions: &Value, options: Option<&Value>) -> Result<Catalog, CatalogError> {
    let definitions = parse_definitions(definitions)?;
    let options = match options.map(parse_options) {
        Some(Ok(options)) => options,
        Some(Err(err)) => {
            tracing::warn!(error = %err, "ignoring malformed attribute option list");
            Vec::new()
        }
        None => Vec::new(),
    };
    Ok(Catalog::new(definitions).with_options(options))
}
