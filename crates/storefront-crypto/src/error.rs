use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("Missing \"Salted__\" header")]
    MissingSaltHeader,

    #[error("Encrypted data too short")]
    DataTooShort,

    #[error("Ciphertext length {0} is not a multiple of the block size")]
    UnalignedCiphertext(usize),

    #[error("Invalid salt length: expected {expected} bytes, got {got}")]
    InvalidSaltLength { expected: usize, got: usize },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
