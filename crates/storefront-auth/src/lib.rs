//! Client-side authentication helpers.
//!
//! Stored credentials are passphrase-encrypted JSON values. Everything here
//! reads them fresh from a [`CredentialStore`] on each call and collapses any
//! failure to "no credential" at the public boundary.

pub mod config;
pub mod credential;
pub mod error;
pub mod jwt;
pub mod role;
pub mod session;
pub mod store;

pub use config::{AuthConfig, DEFAULT_PASSPHRASE};
pub use credential::{unwrap_credential, wrap_credential, Credential, CredentialUnwrapper, UnwrapOutcome};
pub use error::AuthError;
pub use jwt::{is_token_expired, token_expiry};
pub use role::{decode_role, StaffRole};
pub use session::AuthSession;
pub use store::{CredentialStore, MemoryStore};
