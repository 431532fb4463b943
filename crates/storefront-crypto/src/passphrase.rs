//! Salted AES-256-CBC passphrase encryption.
//!
//! Text format: base64(["Salted__":8B][salt:8B][ciphertext]), identical to
//! `openssl enc -aes-256-cbc -md md5 -a` and CryptoJS `AES.encrypt(msg, pass)`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::base64::{base64_decode, base64_encode};
use crate::error::CryptoError;
use crate::kdf::evp_bytes_to_key;
use crate::types::{AES_BLOCK_LENGTH, HEADER_LENGTH, SALTED_MAGIC, SALT_LENGTH};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Generate a random 8-byte salt.
fn generate_salt() -> Result<[u8; SALT_LENGTH], CryptoError> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(salt)
}

/// Encrypt `plaintext` under `passphrase` with a fresh random salt.
pub fn encrypt_with_passphrase(plaintext: &[u8], passphrase: &str) -> Result<String, CryptoError> {
    let salt = generate_salt()?;
    encrypt_with_salt(plaintext, passphrase, &salt)
}

/// Encrypt with a caller-chosen salt. Deterministic; meant for fixtures and
/// interop checks, not for storing new secrets.
pub fn encrypt_with_salt(
    plaintext: &[u8],
    passphrase: &str,
    salt: &[u8],
) -> Result<String, CryptoError> {
    let derived = evp_bytes_to_key(passphrase.as_bytes(), salt)?;
    let cipher = Aes256CbcEnc::new_from_slices(&derived.key, &derived.iv)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut blob = Vec::with_capacity(HEADER_LENGTH + ciphertext.len());
    blob.extend_from_slice(SALTED_MAGIC);
    blob.extend_from_slice(salt);
    blob.extend_from_slice(&ciphertext);
    Ok(base64_encode(&blob))
}

/// Decrypt a salted blob back into plaintext bytes.
pub fn decrypt_with_passphrase(blob: &str, passphrase: &str) -> Result<Vec<u8>, CryptoError> {
    let raw = base64_decode(blob)?;
    if !raw.starts_with(SALTED_MAGIC) {
        return Err(CryptoError::MissingSaltHeader);
    }
    if raw.len() < HEADER_LENGTH + AES_BLOCK_LENGTH {
        return Err(CryptoError::DataTooShort);
    }

    let salt = &raw[SALTED_MAGIC.len()..HEADER_LENGTH];
    let ciphertext = &raw[HEADER_LENGTH..];
    if ciphertext.len() % AES_BLOCK_LENGTH != 0 {
        return Err(CryptoError::UnalignedCiphertext(ciphertext.len()));
    }

    let derived = evp_bytes_to_key(passphrase.as_bytes(), salt)?;
    let cipher = Aes256CbcDec::new_from_slices(&derived.key, &derived.iv)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed("invalid padding".to_string()))
}
