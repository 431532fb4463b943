use std::fmt;

use serde::Deserialize;

use crate::error::AuthError;

/// Passphrase the existing frontend encrypts stored credentials with.
///
/// It ships inside the client bundle, so it obfuscates stored values but does
/// not keep them confidential from anyone holding the bundle. It is the
/// default only so blobs written by deployed clients remain readable.
pub const DEFAULT_PASSPHRASE: &str = "TET4-1";

/// Where credentials live and how they are sealed.
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthConfig {
    /// Shared passphrase for the credential cipher.
    pub passphrase: String,
    /// Storage slot holding the encrypted access token.
    pub access_token_slot: String,
    /// Storage slot holding the encrypted refresh token.
    pub refresh_token_slot: String,
    /// Storage slot holding the encrypted role list.
    pub role_slot: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            passphrase: DEFAULT_PASSPHRASE.to_string(),
            access_token_slot: "auth_token".to_string(),
            refresh_token_slot: "refresh_token".to_string(),
            role_slot: "role".to_string(),
        }
    }
}

impl AuthConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let config: Self = serde_json::from_str(json)?;
        if config.passphrase.is_empty() {
            return Err(AuthError::InvalidConfig("passphrase must not be empty".into()));
        }
        Ok(config)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("passphrase", &"<redacted>")
            .field("access_token_slot", &self.access_token_slot)
            .field("refresh_token_slot", &self.refresh_token_slot)
            .field("role_slot", &self.role_slot)
            .finish()
    }
}
