//! Unverified JWT payload inspection.
//!
//! Only the `exp` claim is read, to decide whether a refresh is due. The
//! signature is the backend's concern and is not checked here.

use serde_json::Value;
use storefront_crypto::base64url_decode;

use crate::error::AuthError;

/// Read the `exp` claim (seconds since the epoch) from a JWT.
///
/// Returns `Ok(None)` for a well-formed token without `exp`.
pub fn token_expiry(token: &str) -> Result<Option<f64>, AuthError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next()) {
        (Some(header), Some(payload)) if !header.is_empty() && !payload.is_empty() => payload,
        _ => return Err(AuthError::MalformedToken("expected header.payload.signature".into())),
    };
    let bytes = base64url_decode(payload)?;
    let claims: Value = serde_json::from_slice(&bytes)?;
    if !claims.is_object() {
        return Err(AuthError::MalformedToken("payload is not a JSON object".into()));
    }
    Ok(claims.get("exp").and_then(Value::as_f64))
}

/// Whether `token` has expired at `now` (seconds since the epoch).
///
/// Undecodable tokens count as expired. A token without `exp` does not expire.
pub fn is_token_expired(token: &str, now: f64) -> bool {
    match token_expiry(token) {
        Ok(Some(exp)) => exp < now,
        Ok(None) => false,
        Err(err) => {
            tracing::debug!(error = %err, "treating undecodable token as expired");
            true
        }
    }
}
