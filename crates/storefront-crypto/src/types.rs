/// Magic prefix of a salted OpenSSL blob.
///
/// Format: ["Salted__":8B][salt:8B][AES-256-CBC ciphertext, PKCS#7 padded]
pub const SALTED_MAGIC: &[u8; 8] = b"Salted__";

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 8;

/// Length of the magic prefix plus salt.
pub const HEADER_LENGTH: usize = SALTED_MAGIC.len() + SALT_LENGTH;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// CBC IV length in bytes.
pub const AES_IV_LENGTH: usize = 16;

/// AES block length in bytes.
pub const AES_BLOCK_LENGTH: usize = 16;
