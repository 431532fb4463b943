//! End-to-end behavior of the attribute form against the public API.

use std::sync::{Arc, Mutex};

use serde_json::json;
use storefront_forms::{
    parse_catalog, AttributeForm, Catalog, CategoryId, EditOutcome, FieldValue, FormValues,
};

// ============================================================================
// Helpers
// ============================================================================

fn scenario_catalog() -> Catalog {
    parse_catalog(
        &json!({
            "results": [
                {"id": 1, "name": "color", "category": 10},
                {"id": 2, "name": "size", "category": 10},
                {"id": 3, "name": "voltage", "category": 20}
            ]
        }),
        None,
    )
    .expect("scenario catalog parses")
}

fn values(pairs: &[(&str, &str)]) -> FormValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
        .collect()
}

/// A form whose published snapshots are collected in order.
fn make_form() -> (AttributeForm, Arc<Mutex<Vec<FormValues>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let form = AttributeForm::new(move |v| sink.lock().unwrap().push(v.clone()));
    (form, log)
}

fn category(id: u64) -> Option<CategoryId> {
    Some(CategoryId::from(id))
}

// ============================================================================
// Scenario walk-through
// ============================================================================

#[tokio::test]
async fn category_switch_scenario() {
    let (form, log) = make_form();
    form.load_catalog(&scenario_catalog()).await;

    assert!(form.bind_category(category(10)));
    assert_eq!(form.values(), values(&[("color", ""), ("size", "")]));

    assert_eq!(form.set_value("color", "red"), EditOutcome::Applied);
    assert_eq!(form.values(), values(&[("color", "red"), ("size", "")]));

    assert!(form.bind_category(category(20)));
    assert_eq!(form.values(), values(&[("voltage", "")]));

    assert!(form.bind_category(category(99)));
    assert_eq!(form.values(), FormValues::new());
    assert!(form.relevant_attributes().is_empty());

    let published = log.lock().unwrap();
    assert_eq!(published.len(), 4);
    assert_eq!(published[1], values(&[("color", "red"), ("size", "")]));
    assert_eq!(published[3], FormValues::new());
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn binding_twice_is_idempotent() {
    let (form, log) = make_form();
    form.load_catalog(&scenario_catalog()).await;
    form.bind_category(category(10));
    form.set_value("size", "M");
    let before = form.values();

    assert!(!form.bind_category(category(10)));
    assert!(!form.bind_category(Some(CategoryId::from("10"))));
    assert_eq!(form.values(), before);
    assert_eq!(form.bound_category(), category(10));
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn rebind_drops_previous_category_fields() {
    let (form, _) = make_form();
    form.load_catalog(&scenario_catalog()).await;
    form.bind_category(category(10));
    form.set_value("color", "red");
    form.set_value("size", "XL");

    form.bind_category(category(20));
    let current = form.values();
    assert!(!current.contains_key("color"));
    assert!(!current.contains_key("size"));
    assert_eq!(current.keys().collect::<Vec<_>>(), vec!["voltage"]);

    // Coming back starts from scratch too.
    form.bind_category(category(10));
    assert_eq!(form.values(), values(&[("color", ""), ("size", "")]));
}

#[tokio::test]
async fn set_value_touches_exactly_one_entry() {
    let (form, _) = make_form();
    form.load_catalog(&scenario_catalog()).await;
    form.bind_category(category(10));
    form.set_value("size", "M");
    let before = form.values();

    form.set_value("color", "green");
    let after = form.values();
    for (name, value) in &after {
        if name == "color" {
            assert_eq!(value, &FieldValue::from("green"));
        } else {
            assert_eq!(Some(value), before.get(name));
        }
    }
    assert_eq!(after.len(), before.len());
}

#[tokio::test]
async fn unknown_field_is_rejected_without_publishing() {
    let (form, log) = make_form();
    form.load_catalog(&scenario_catalog()).await;
    form.bind_category(category(10));
    let before = form.values();

    assert_eq!(form.set_value("voltage", "220"), EditOutcome::UnknownField);
    assert_eq!(form.values(), before);
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn relevant_attributes_follow_binding() {
    let (form, _) = make_form();
    form.load_catalog(&scenario_catalog()).await;
    assert!(form.relevant_attributes().is_empty());
    form.bind_category(category(10));
    let names: Vec<_> = form
        .relevant_attributes()
        .into_iter()
        .map(|def| def.name)
        .collect();
    assert_eq!(names, vec!["color", "size"]);
}

#[tokio::test]
async fn empty_or_missing_category_is_ignored() {
    let (form, log) = make_form();
    form.load_catalog(&scenario_catalog()).await;
    assert!(!form.bind_category(None));
    assert!(!form.bind_category(Some(CategoryId::from(""))));
    assert!(form.bound_category().is_none());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn attribute_type_serializer_body_yields_fields() {
    let body = json!({
        "count": 3, "next": null, "previous": null,
        "results": [
            {
                "id": 1, "name": "color", "attribute_type": "input",
                "category": {"id": 10, "name": "Cards", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"},
                "created_at": "2024-01-01T00:00:00Z"
            },
            {
                "id": 2, "name": "glossy", "attribute_type": "checkbox",
                "category": {"id": 10, "name": "Cards", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"},
                "created_at": "2024-01-01T00:00:00Z"
            },
            {
                "id": 3, "name": "voltage", "attribute_type": "input",
                "category": {"id": 20, "name": "Lamps", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"},
                "created_at": "2024-01-01T00:00:00Z"
            }
        ]
    });
    let options = json!({"results": [
        {"id": 5, "attribute": 1, "attribute_value": "red", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"}
    ]});
    let catalog = parse_catalog(&body, Some(&options)).expect("serializer output parses");
    assert_eq!(catalog.definitions.len(), 3);

    let (form, _) = make_form();
    form.load_catalog(&catalog).await;
    assert!(form.bind_category(category(10)));

    let mut expected = values(&[("color", "")]);
    expected.insert("glossy".to_string(), FieldValue::from(false));
    assert_eq!(form.values(), expected);
    assert_eq!(form.options_for(1)[0].value, "red");
}
