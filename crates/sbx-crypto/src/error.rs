use sbx_core::SbxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key decode failed: {0}")]
    KeyDecode(String),

    #[error("sealed data malformed: {0}")]
    SealedFormat(String),

    #[error("encryption failed")]
    Encrypt,

    /// GCM tag did not verify: tampered ciphertext or wrong key.
    #[error("authentication tag mismatch")]
    Authentication,

    /// OAEP unwrap failed. Carries no detail about which check failed.
    #[error("key unwrap failed")]
    Unwrap,

    #[error("key wrap failed: {0}")]
    Wrap(String),
}

impl From<CryptoError> for SbxError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Authentication | CryptoError::Unwrap => SbxError::AuthenticationFailed,
            CryptoError::KeyDecode(msg) => SbxError::KeyMaterial(msg),
            CryptoError::SealedFormat(msg) => SbxError::Validation(msg),
            CryptoError::KeyGeneration(msg) | CryptoError::Wrap(msg) => SbxError::Primitive(msg),
            CryptoError::Encrypt => SbxError::Primitive("AES-GCM encryption failed".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_collapse_to_opaque_rejection() {
        for err in [CryptoError::Authentication, CryptoError::Unwrap] {
            let mapped = SbxError::from(err);
            assert!(matches!(mapped, SbxError::AuthenticationFailed));
            assert_eq!(mapped.to_string(), "authentication rejected");
        }
    }

    #[test]
    fn test_unwrap_error_message_is_opaque() {
        assert_eq!(CryptoError::Unwrap.to_string(), "key unwrap failed");
    }
}
