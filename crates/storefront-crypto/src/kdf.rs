//! OpenSSL `EVP_BytesToKey` with MD5 and a single iteration.
//!
//! D_1 = MD5(pass || salt), D_i = MD5(D_{i-1} || pass || salt); the
//! concatenation is split into a 32-byte key and a 16-byte IV.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::types::{AES_IV_LENGTH, AES_KEY_LENGTH, SALT_LENGTH};

/// Key and IV derived from a passphrase and salt. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    pub key: [u8; AES_KEY_LENGTH],
    pub iv: [u8; AES_IV_LENGTH],
}

/// Derive the AES-256 key and CBC IV for `passphrase` and an 8-byte `salt`.
pub fn evp_bytes_to_key(passphrase: &[u8], salt: &[u8]) -> Result<DerivedKey, CryptoError> {
    if salt.len() != SALT_LENGTH {
        return Err(CryptoError::InvalidSaltLength {
            expected: SALT_LENGTH,
            got: salt.len(),
        });
    }

    let mut material = Vec::with_capacity(AES_KEY_LENGTH + AES_IV_LENGTH + 16);
    let mut previous: Option<[u8; 16]> = None;
    while material.len() < AES_KEY_LENGTH + AES_IV_LENGTH {
        let mut ctx = md5::Context::new();
        if let Some(block) = &previous {
            ctx.consume(block);
        }
        ctx.consume(passphrase);
        ctx.consume(salt);
        let block = ctx.compute().0;
        material.extend_from_slice(&block);
        previous = Some(block);
    }

    let mut derived = DerivedKey {
        key: [0u8; AES_KEY_LENGTH],
        iv: [0u8; AES_IV_LENGTH],
    };
    derived.key.copy_from_slice(&material[..AES_KEY_LENGTH]);
    derived
        .iv
        .copy_from_slice(&material[AES_KEY_LENGTH..AES_KEY_LENGTH + AES_IV_LENGTH]);
    material.zeroize();
    if let Some(mut block) = previous {
        block.zeroize();
    }
    Ok(derived)
}
