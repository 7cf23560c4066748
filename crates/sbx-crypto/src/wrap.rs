//! RSA-OAEP wrapping of per-file AES keys

use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::envelope::FileKey;
use crate::error::CryptoError;
use crate::KEY_SIZE;

/// Wrap a file key under an identity's public key.
///
/// OAEP with SHA-256 and MGF1(SHA-256). The 32-byte payload is well under
/// the RSA-2048/OAEP-SHA256 plaintext limit of ~190 bytes.
pub fn wrap_file_key(key: &FileKey, public: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
    public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key.as_bytes())
        .map_err(|e| CryptoError::Wrap(e.to_string()))
}

/// Unwrap a wrapped file key with the identity's private key.
///
/// Every padding or validation failure collapses into the same opaque
/// [`CryptoError::Unwrap`]; the error must not reveal which OAEP check
/// failed.
pub fn unwrap_file_key(wrapped: &[u8], private: &RsaPrivateKey) -> Result<FileKey, CryptoError> {
    let mut plaintext = private
        .decrypt(Oaep::new::<Sha256>(), wrapped)
        .map_err(|_| CryptoError::Unwrap)?;

    if plaintext.len() != KEY_SIZE {
        plaintext.zeroize();
        return Err(CryptoError::Unwrap);
    }

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&plaintext);
    plaintext.zeroize();
    Ok(FileKey::from_bytes(bytes))
}
