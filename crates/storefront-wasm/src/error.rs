//! Turning Rust results into values the storefront frontend can consume.

use serde::Serialize;
use wasm_bindgen::JsValue;

/// Rejection value for a failed binding call: the error's message as a JS string.
pub fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Serialize form values, catalog records and credentials for JS. Maps come
/// out as plain objects so the frontend can read `values.color`.
pub fn to_js_value(value: &impl Serialize) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true))
        .map_err(to_js_error)
}

/// Message of a value thrown by a host callback or fetcher.
pub fn js_error_message(thrown: &JsValue) -> String {
    use wasm_bindgen::JsCast;

    match (thrown.as_string(), thrown.dyn_ref::<js_sys::Error>()) {
        (Some(message), _) => message,
        (None, Some(err)) => String::from(err.message()),
        (None, None) => format!("{thrown:?}"),
    }
}
