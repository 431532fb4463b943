//! Passphrase encryption for client-stored credentials.
//!
//! Blobs use the OpenSSL `enc` layout that browser-side CryptoJS emits in
//! passphrase mode, so values written by the existing frontend stay readable.

pub mod base64;
pub mod error;
pub mod kdf;
pub mod passphrase;
pub mod types;

pub use base64::{base64_decode, base64_encode, base64url_decode};
pub use error::CryptoError;
pub use kdf::{evp_bytes_to_key, DerivedKey};
pub use passphrase::{decrypt_with_passphrase, encrypt_with_passphrase, encrypt_with_salt};
pub use types::{AES_BLOCK_LENGTH, AES_IV_LENGTH, AES_KEY_LENGTH, SALTED_MAGIC, SALT_LENGTH};
