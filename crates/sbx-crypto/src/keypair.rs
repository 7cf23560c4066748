//! RSA keypair generation and DER codecs
//!
//! Public keys are stored as SubjectPublicKeyInfo DER, private keys as
//! PKCS#8 DER. The store keeps both verbatim as opaque byte strings; this
//! module is the only place that decodes them.

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// A freshly generated keypair in its storage encoding.
pub struct EncodedKeypair {
    /// SubjectPublicKeyInfo DER
    pub public_der: Vec<u8>,
    /// PKCS#8 DER, zeroized on drop
    pub private_der: Zeroizing<Vec<u8>>,
}

/// Generate an RSA keypair and encode both halves for storage.
///
/// The keypair is generated once per identity at registration and is
/// immutable afterwards; there is no rotation.
pub fn generate_keypair(bits: usize) -> Result<EncodedKeypair, CryptoError> {
    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;

    let public_der = private
        .to_public_key()
        .to_public_key_der()
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?
        .into_vec();

    let private_der = private
        .to_pkcs8_der()
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;

    Ok(EncodedKeypair {
        public_der,
        private_der: Zeroizing::new(private_der.as_bytes().to_vec()),
    })
}

/// Decode a stored public key from SPKI DER.
pub fn decode_public_key(der: &[u8]) -> Result<RsaPublicKey, CryptoError> {
    RsaPublicKey::from_public_key_der(der).map_err(|e| CryptoError::KeyDecode(e.to_string()))
}

/// Decode a stored private key from PKCS#8 DER.
pub fn decode_private_key(der: &[u8]) -> Result<RsaPrivateKey, CryptoError> {
    RsaPrivateKey::from_pkcs8_der(der).map_err(|e| CryptoError::KeyDecode(e.to_string()))
}
