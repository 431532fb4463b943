//! Stored credential unwrapping.
//!
//! A stored value is `encrypt(JSON.stringify(value), passphrase)`. Unwrapping
//! is total: a missing slot and a corrupt blob both end up as `None` for the
//! caller, with the corruption reason reported through `tracing` only.

use std::fmt;

use serde_json::Value;
use storefront_crypto::{decrypt_with_passphrase, encrypt_with_passphrase};
use zeroize::{Zeroize, Zeroizing};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// A decrypted, JSON-parsed credential value.
#[derive(Clone, PartialEq)]
pub struct Credential(Value);

impl Credential {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Token text for an `Authorization: Bearer` header.
    ///
    /// Only strings and numbers interpolate into a usable header; arrays and
    /// objects yield `None`.
    pub fn bearer_token(&self) -> Option<String> {
        match &self.0 {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Detailed result of an unwrap attempt.
#[derive(Debug)]
pub enum UnwrapOutcome {
    Unwrapped(Credential),
    /// Nothing stored. Normal before login.
    Missing,
    /// Something was stored but could not be decrypted or parsed.
    Corrupt(AuthError),
}

impl UnwrapOutcome {
    pub fn into_option(self) -> Option<Credential> {
        match self {
            UnwrapOutcome::Unwrapped(credential) => Some(credential),
            UnwrapOutcome::Missing | UnwrapOutcome::Corrupt(_) => None,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, UnwrapOutcome::Corrupt(_))
    }
}

/// Decrypts stored credentials with an injected passphrase.
pub struct CredentialUnwrapper {
    passphrase: Zeroizing<String>,
}

impl CredentialUnwrapper {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.passphrase.clone())
    }

    /// Unwrap a stored blob. Never fails; see [`Self::unwrap_detailed`].
    pub fn unwrap(&self, blob: Option<&str>) -> Option<Credential> {
        self.unwrap_detailed(blob).into_option()
    }

    /// Unwrap a stored blob, keeping the reason when it is unusable.
    pub fn unwrap_detailed(&self, blob: Option<&str>) -> UnwrapOutcome {
        let blob = match blob {
            Some(b) if !b.trim().is_empty() => b,
            _ => return UnwrapOutcome::Missing,
        };

        match self.open(blob) {
            Ok(credential) => UnwrapOutcome::Unwrapped(credential),
            Err(err) => {
                tracing::warn!(error = %err, "stored credential could not be unwrapped");
                UnwrapOutcome::Corrupt(err)
            }
        }
    }

    /// Seal `value` for storage: JSON-serialize, then encrypt with a random salt.
    pub fn wrap(&self, value: &Value) -> Result<String, AuthError> {
        let plaintext = Zeroizing::new(serde_json::to_string(value)?);
        Ok(encrypt_with_passphrase(plaintext.as_bytes(), &self.passphrase)?)
    }

    fn open(&self, blob: &str) -> Result<Credential, AuthError> {
        let plaintext = decrypt_with_passphrase(blob, &self.passphrase)?;
        let mut text = String::from_utf8(plaintext)?;
        if text.is_empty() {
            return Err(AuthError::EmptyPlaintext);
        }
        let parsed = serde_json::from_str::<Value>(&text);
        text.zeroize();
        Ok(Credential(parsed?))
    }
}

/// One-shot unwrap with an explicit passphrase.
pub fn unwrap_credential(blob: Option<&str>, passphrase: &str) -> Option<Credential> {
    CredentialUnwrapper::new(passphrase).unwrap(blob)
}

/// One-shot wrap with an explicit passphrase.
pub fn wrap_credential(value: &Value, passphrase: &str) -> Result<String, AuthError> {
    CredentialUnwrapper::new(passphrase).wrap(value)
}
