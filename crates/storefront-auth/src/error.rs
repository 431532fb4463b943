use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] storefront_crypto::CryptoError),

    #[error("Decrypted credential is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Decrypted credential is empty")]
    EmptyPlaintext,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
