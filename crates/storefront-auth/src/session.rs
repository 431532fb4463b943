//! Authenticated request helper over a credential store.
//!
//! Every accessor re-reads its slot and re-unwraps it; nothing decrypted is
//! cached between calls.

use serde_json::Value;

use crate::config::AuthConfig;
use crate::credential::{Credential, CredentialUnwrapper};
use crate::error::AuthError;
use crate::jwt::is_token_expired;
use crate::role::{decode_role, StaffRole};
use crate::store::CredentialStore;

pub struct AuthSession<S: CredentialStore> {
    store: S,
    unwrapper: CredentialUnwrapper,
    config: AuthConfig,
}

impl<S: CredentialStore> AuthSession<S> {
    pub fn new(store: S, config: AuthConfig) -> Self {
        let unwrapper = CredentialUnwrapper::from_config(&config);
        Self {
            store,
            unwrapper,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn read(&self, slot: &str) -> Option<Credential> {
        let blob = self.store.get(slot);
        self.unwrapper.unwrap(blob.as_deref())
    }

    /// Current access token, if one is stored and readable.
    pub fn access_token(&self) -> Option<Credential> {
        self.read(&self.config.access_token_slot)
    }

    pub fn refresh_token(&self) -> Option<Credential> {
        self.read(&self.config.refresh_token_slot)
    }

    /// `Bearer <token>` for the `Authorization` header, or `None` when the
    /// request should go out unauthenticated.
    pub fn authorization_header(&self) -> Option<String> {
        self.access_token()?
            .bearer_token()
            .map(|token| format!("Bearer {token}"))
    }

    pub fn role(&self) -> Option<StaffRole> {
        decode_role(self.read(&self.config.role_slot)?.value())
    }

    /// Whether the stored access token is missing, unreadable, or past `exp`.
    pub fn is_access_token_expired(&self, now: f64) -> bool {
        match self.access_token().and_then(|c| c.bearer_token()) {
            Some(token) => is_token_expired(&token, now),
            None => true,
        }
    }

    /// Seal and store a new access token (after login or refresh).
    pub fn store_access_token(&self, token: &str) -> Result<(), AuthError> {
        let blob = self.unwrapper.wrap(&Value::String(token.to_string()))?;
        self.store.set(&self.config.access_token_slot, &blob);
        Ok(())
    }

    pub fn store_refresh_token(&self, token: &str) -> Result<(), AuthError> {
        let blob = self.unwrapper.wrap(&Value::String(token.to_string()))?;
        self.store.set(&self.config.refresh_token_slot, &blob);
        Ok(())
    }

    pub fn store_role(&self, role: StaffRole) -> Result<(), AuthError> {
        let blob = self.unwrapper.wrap(&Value::from(vec![role.id()]))?;
        self.store.set(&self.config.role_slot, &blob);
        Ok(())
    }

    /// Log out: drop every credential slot.
    pub fn clear(&self) {
        self.store.remove(&self.config.access_token_slot);
        self.store.remove(&self.config.refresh_token_slot);
        self.store.remove(&self.config.role_slot);
    }
}
