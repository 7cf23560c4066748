use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user: password credential, TOTP secret, and the envelope
/// keypair. Created once at registration and immutable afterwards.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    /// Unique across the store.
    pub username: String,
    /// PBKDF2-HMAC-SHA512 derived key, 32 bytes.
    pub password_hash: Vec<u8>,
    /// Per-identity random salt, 16 bytes. Never reused across identities.
    pub salt: Vec<u8>,
    /// Raw TOTP secret, 20 bytes. Rendered Base32 for authenticator apps.
    pub totp_secret: Vec<u8>,
    /// RSA public key, SubjectPublicKeyInfo DER.
    pub public_key_der: Vec<u8>,
    /// RSA private key, PKCS#8 DER. Stored in the clear — demo-grade only.
    pub private_key_der: Vec<u8>,
    /// Unix seconds at registration.
    pub created_at: u64,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("salt", &self.salt)
            .field("password_hash", &"[REDACTED]")
            .field("totp_secret", &"[REDACTED]")
            .field("private_key_der", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// One encrypted file owned by an identity. Create-only: re-encrypting a
/// file produces a new record rather than mutating this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedFile {
    pub id: Uuid,
    pub identity_id: Uuid,
    /// Where the plaintext came from. Opaque to the core.
    pub original_locator: String,
    /// Where the sealed bytes were written. Opaque to the core.
    pub cipher_locator: String,
    /// RSA-OAEP ciphertext of the per-file AES key.
    pub wrapped_key: Vec<u8>,
    /// Unix seconds at encryption.
    pub created_at: u64,
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_debug_redacts_secrets() {
        let identity = Identity {
            id: Uuid::new_v4(),
            username: "alice".into(),
            password_hash: vec![1; 32],
            salt: vec![2; 16],
            totp_secret: vec![3; 20],
            public_key_der: vec![4; 8],
            private_key_der: vec![5; 8],
            created_at: 0,
        };
        let debug = format!("{identity:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("[5, 5"));
    }
}
