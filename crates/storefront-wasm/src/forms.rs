//! WASM bindings for the attribute form.
//!
//! The host supplies the HTTP layer as a `JsCatalogFetcher` object; the form
//! itself runs in Rust and reports every published value map to a JS callback.

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use storefront_forms::{
    parse_catalog, AttributeForm, Catalog, CatalogConfig, CatalogError, CatalogSource,
    CategoryId, FieldValue, FormValues,
};

use crate::error::{js_error_message, to_js_error, to_js_value};

// ============================================================================
// JS extern fetcher type
// ============================================================================

#[wasm_bindgen]
extern "C" {
    /// JavaScript object performing authenticated GETs. Each method resolves
    /// to the parsed JSON body.
    pub type JsCatalogFetcher;

    #[wasm_bindgen(method, catch, js_name = "fetchAttributes")]
    async fn fetch_attributes(this: &JsCatalogFetcher, url: &str) -> Result<JsValue, JsValue>;

    /// Optional. A missing method throws and the catalog loads without options.
    #[wasm_bindgen(method, catch, js_name = "fetchAttributeValues")]
    async fn fetch_attribute_values(
        this: &JsCatalogFetcher,
        url: &str,
    ) -> Result<JsValue, JsValue>;
}

/// `CatalogSource` that delegates the requests to JS.
pub struct JsCatalogSource {
    fetcher: JsCatalogFetcher,
    config: CatalogConfig,
    base_url: String,
}

impl JsCatalogSource {
    pub fn new(fetcher: JsCatalogFetcher, base_url: String, config: CatalogConfig) -> Self {
        Self {
            fetcher,
            config,
            base_url,
        }
    }
}

fn transport_err(e: JsValue) -> CatalogError {
    CatalogError::Transport(js_error_message(&e))
}

fn to_json(value: JsValue) -> Result<Value, CatalogError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| CatalogError::Malformed(e.to_string()))
}

#[async_trait(?Send)]
impl CatalogSource for JsCatalogSource {
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
        let definitions_url = self.config.definitions_url(&self.base_url);
        let definitions = self
            .fetcher
            .fetch_attributes(&definitions_url)
            .await
            .map_err(transport_err)
            .and_then(to_json)?;

        let options_url = self.config.options_url(&self.base_url);
        let options = match self.fetcher.fetch_attribute_values(&options_url).await {
            Ok(body) => to_json(body).ok(),
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("attribute options unavailable: {}", js_error_message(&e)).into(),
                );
                None
            }
        };

        parse_catalog(&definitions, options.as_ref())
    }
}

// ============================================================================
// AttributeForm class
// ============================================================================

/// Wrapper to make `js_sys::Function` satisfy the callback's `Send + Sync`.
struct SendSyncCallback(js_sys::Function);

// SAFETY: WASM is single-threaded.
unsafe impl Send for SendSyncCallback {}
unsafe impl Sync for SendSyncCallback {}

impl SendSyncCallback {
    fn notify(&self, values: &FormValues) {
        match to_js_value(values) {
            Ok(js_val) => {
                if let Err(e) = self.0.call1(&JsValue::NULL, &js_val) {
                    web_sys::console::error_1(&e);
                }
            }
            Err(e) => web_sys::console::error_1(&e),
        }
    }
}

#[wasm_bindgen(js_name = "AttributeForm")]
pub struct WasmAttributeForm {
    inner: Rc<AttributeForm>,
}

#[wasm_bindgen(js_class = "AttributeForm")]
impl WasmAttributeForm {
    /// `on_change` receives the full value map every time it changes.
    #[wasm_bindgen(constructor)]
    pub fn new(on_change: js_sys::Function) -> WasmAttributeForm {
        console_error_panic_hook::set_once();
        let callback = SendSyncCallback(on_change);
        Self {
            inner: Rc::new(AttributeForm::new(move |values| callback.notify(values))),
        }
    }

    /// Fetch the catalog once. Resolves when the catalog is in place; a failed
    /// fetch resolves too and leaves the form with no fields.
    #[wasm_bindgen(js_name = "loadCatalog")]
    pub fn load_catalog(
        &self,
        fetcher: JsCatalogFetcher,
        base_url: String,
        config: JsValue,
    ) -> Result<js_sys::Promise, JsValue> {
        let config: CatalogConfig = if config.is_undefined() || config.is_null() {
            CatalogConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        let source = JsCatalogSource::new(fetcher, base_url, config);
        let form = Rc::clone(&self.inner);
        Ok(wasm_bindgen_futures::future_to_promise(async move {
            form.load_catalog(&source).await;
            Ok(JsValue::from_bool(form.is_catalog_loaded()))
        }))
    }

    /// Bind to a category id (string or integer). `null`, `undefined` and
    /// `""` unbind. Returns whether the value map was rebuilt.
    #[wasm_bindgen(js_name = "bindCategory")]
    pub fn bind_category(&self, category: JsValue) -> bool {
        self.inner.bind_category(category_from_js(&category))
    }

    /// Generation of the current binding, or `undefined` when unbound. Pass it
    /// to `setValue` so edits made for an earlier category are dropped.
    pub fn binding(&self) -> Option<f64> {
        self.inner.binding().map(|b| b.generation() as f64)
    }

    /// Returns `false` when the edit was rejected: unknown field, value of the
    /// wrong type, unbound or closed form, or `generation` no longer current.
    #[wasm_bindgen(js_name = "setValue")]
    pub fn set_value(&self, name: &str, value: JsValue, generation: Option<f64>) -> bool {
        let Some(value) = field_value_from_js(&value) else {
            return false;
        };
        let outcome = match generation {
            None => self.inner.set_value(name, value),
            Some(generation) => match generation_from_js(generation) {
                Some(generation) => self.inner.set_value_at(generation, name, value),
                None => return false,
            },
        };
        outcome.is_applied()
    }

    pub fn toggle(&self, name: &str) -> bool {
        self.inner.toggle(name).is_applied()
    }

    pub fn values(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.inner.values())
    }

    #[wasm_bindgen(js_name = "relevantAttributes")]
    pub fn relevant_attributes(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.inner.relevant_attributes())
    }

    #[wasm_bindgen(js_name = "optionsFor")]
    pub fn options_for(&self, attribute_id: f64) -> Result<JsValue, JsValue> {
        if attribute_id < 0.0 || attribute_id.fract() != 0.0 {
            return to_js_value(&Vec::<Value>::new());
        }
        to_js_value(&self.inner.options_for(attribute_id as u64))
    }

    #[wasm_bindgen(js_name = "boundCategory")]
    pub fn bound_category(&self) -> Option<String> {
        self.inner.bound_category().map(|c| c.as_str().to_string())
    }

    #[wasm_bindgen(js_name = "isLoading")]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    /// Detach from the host. Later edits and in-flight loads are ignored.
    pub fn close(&self) {
        self.inner.close();
    }
}

fn category_from_js(value: &JsValue) -> Option<CategoryId> {
    if let Some(s) = value.as_string() {
        return CategoryId::new(s).non_empty();
    }
    match value.as_f64() {
        Some(n) if n.is_finite() && n.fract() == 0.0 => Some(CategoryId::from(n as i64)),
        _ => None,
    }
}

/// Generations are non-negative integers; anything else matches no binding.
fn generation_from_js(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
}

fn field_value_from_js(value: &JsValue) -> Option<FieldValue> {
    if let Some(flag) = value.as_bool() {
        Some(FieldValue::Flag(flag))
    } else if let Some(text) = value.as_string() {
        Some(FieldValue::Text(text))
    } else {
        value.as_f64().map(|n| FieldValue::Text(n.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_accepts_only_whole_numbers() {
        assert_eq!(generation_from_js(0.0), Some(0));
        assert_eq!(generation_from_js(7.0), Some(7));
        assert_eq!(generation_from_js(1.5), None);
        assert_eq!(generation_from_js(-1.0), None);
        assert_eq!(generation_from_js(f64::NAN), None);
        assert_eq!(generation_from_js(f64::INFINITY), None);
    }
}
