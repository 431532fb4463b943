use base64ct::{Base64, Base64UrlUnpadded, Encoding};

use crate::error::CryptoError;

/// Standard padded base64, as written by `CipherParams.toString()`.
pub fn base64_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Decode standard padded base64. Surrounding whitespace is ignored.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    Base64::decode_vec(s.trim()).map_err(|e| CryptoError::Base64Decode(e.to_string()))
}

/// Decode base64url, tolerating trailing `=` padding (JWT segments).
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    Base64UrlUnpadded::decode_vec(s.trim_end_matches('='))
        .map_err(|e| CryptoError::Base64Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"Salted__\x01\x02";
        let encoded = base64_encode(data);
        assert_eq!(base64_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn keeps_padding() {
        assert_eq!(base64_encode(b"ab"), "YWI=");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(base64_decode("  YWI=\n").unwrap(), b"ab");
    }

    #[test]
    fn rejects_url_alphabet() {
        assert!(base64_decode("not-a-real-cipher-output").is_err());
    }

    #[test]
    fn url_decode_accepts_padded_and_unpadded() {
        assert_eq!(base64url_decode("eyJhIjoxfQ").unwrap(), br#"{"a":1}"#);
        assert_eq!(base64url_decode("eyJhIjoxfQ==").unwrap(), br#"{"a":1}"#);
    }
}
