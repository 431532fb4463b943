use serde_json::Value;
use wasm_bindgen::prelude::*;

use storefront_auth::{
    unwrap_credential, wrap_credential, AuthConfig, AuthSession, CredentialStore, MemoryStore,
};

use crate::error::{to_js_error, to_js_value};

/// Decrypt a stored credential blob. Returns `null` when the blob is absent or
/// unreadable; corruption never throws.
#[wasm_bindgen(js_name = "unwrapCredential")]
pub fn wasm_unwrap_credential(blob: Option<String>, passphrase: &str) -> Result<JsValue, JsValue> {
    match unwrap_credential(blob.as_deref(), passphrase) {
        Some(credential) => to_js_value(credential.value()),
        None => Ok(JsValue::NULL),
    }
}

/// Encrypt any JSON-serializable value into the stored blob format.
#[wasm_bindgen(js_name = "wrapCredential")]
pub fn wasm_wrap_credential(value: JsValue, passphrase: &str) -> Result<String, JsValue> {
    let value: Value = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
    wrap_credential(&value, passphrase).map_err(to_js_error)
}

// ============================================================================
// localStorage-backed store
// ============================================================================

/// `window.localStorage`, or an in-memory map where storage is unavailable
/// (workers, private mode with storage disabled).
pub struct LocalStorageStore {
    storage: Option<web_sys::Storage>,
    fallback: MemoryStore,
}

// SAFETY: WASM is single-threaded.
unsafe impl Send for LocalStorageStore {}
unsafe impl Sync for LocalStorageStore {}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            web_sys::console::warn_1(&"localStorage unavailable, credentials kept in memory".into());
        }
        Self {
            storage,
            fallback: MemoryStore::new(),
        }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for LocalStorageStore {
    fn get(&self, slot: &str) -> Option<String> {
        match &self.storage {
            Some(storage) => storage.get_item(slot).ok().flatten(),
            None => self.fallback.get(slot),
        }
    }

    fn set(&self, slot: &str, value: &str) {
        match &self.storage {
            // Quota errors leave the previous value in place.
            Some(storage) => {
                let _ = storage.set_item(slot, value);
            }
            None => self.fallback.set(slot, value),
        }
    }

    fn remove(&self, slot: &str) {
        match &self.storage {
            Some(storage) => {
                let _ = storage.remove_item(slot);
            }
            None => self.fallback.remove(slot),
        }
    }
}

// ============================================================================
// AuthSession class
// ============================================================================

#[wasm_bindgen(js_name = "AuthSession")]
pub struct WasmAuthSession {
    inner: AuthSession<LocalStorageStore>,
}

#[wasm_bindgen(js_class = "AuthSession")]
impl WasmAuthSession {
    /// `config` may override `passphrase` and the slot names
    /// (`accessTokenSlot`, `refreshTokenSlot`, `roleSlot`).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmAuthSession, JsValue> {
        console_error_panic_hook::set_once();
        let config: AuthConfig = if config.is_undefined() || config.is_null() {
            AuthConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Ok(Self {
            inner: AuthSession::new(LocalStorageStore::new(), config),
        })
    }

    /// `"Bearer <token>"`, or `undefined` when no readable access token is stored.
    #[wasm_bindgen(js_name = "authorizationHeader")]
    pub fn authorization_header(&self) -> Option<String> {
        self.inner.authorization_header()
    }

    #[wasm_bindgen(js_name = "accessToken")]
    pub fn access_token(&self) -> Result<JsValue, JsValue> {
        match self.inner.access_token() {
            Some(credential) => to_js_value(credential.value()),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = "refreshToken")]
    pub fn refresh_token(&self) -> Result<JsValue, JsValue> {
        match self.inner.refresh_token() {
            Some(credential) => to_js_value(credential.value()),
            None => Ok(JsValue::NULL),
        }
    }

    /// Numeric staff role id.
    pub fn role(&self) -> Option<u32> {
        self.inner.role().map(|role| role.id() as u32)
    }

    #[wasm_bindgen(js_name = "roleName")]
    pub fn role_name(&self) -> Option<String> {
        self.inner.role().map(|role| role.name().to_string())
    }

    /// `now` is in seconds since the epoch; defaults to the current time.
    #[wasm_bindgen(js_name = "isAccessTokenExpired")]
    pub fn is_access_token_expired(&self, now: Option<f64>) -> bool {
        let now = now.unwrap_or_else(|| js_sys::Date::now() / 1000.0);
        self.inner.is_access_token_expired(now)
    }

    #[wasm_bindgen(js_name = "storeAccessToken")]
    pub fn store_access_token(&self, token: &str) -> Result<(), JsValue> {
        self.inner.store_access_token(token).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "storeRefreshToken")]
    pub fn store_refresh_token(&self, token: &str) -> Result<(), JsValue> {
        self.inner.store_refresh_token(token).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "storeRole")]
    pub fn store_role(&self, role_id: u32) -> Result<(), JsValue> {
        let role = storefront_auth::StaffRole::from_id(u64::from(role_id))
            .ok_or_else(|| JsValue::from_str(&format!("Unknown role id {role_id}")))?;
        self.inner.store_role(role).map_err(to_js_error)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}
