//! AES-256-GCM file sealing
//!
//! Sealed format (byte-exact, no magic number or version byte):
//! ```text
//! [1 byte: nonce length][nonce][ciphertext + 16-byte tag]
//! ```
//! The length prefix lets a future nonce-size change ride on the same
//! layout without versioning elsewhere. Nonces are random per call; the
//! per-file key makes 96-bit random nonces safe (one key never seals
//! enough messages for collisions to matter).

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CryptoError;
use crate::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// A per-file 256-bit encryption key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FileKey([u8; KEY_SIZE]);

impl FileKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FileKey").field(&"[REDACTED]").finish()
    }
}

/// Generate a fresh random file key. One per file, never reused.
pub fn generate_file_key() -> FileKey {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut bytes);
    FileKey::from_bytes(bytes)
}

/// Seal plaintext under a file key with a fresh random nonce.
pub fn seal(plaintext: &[u8], key: &FileKey) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::Encrypt)?;

    let mut out = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
    out.push(NONCE_SIZE as u8);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open sealed bytes, verifying the tag.
///
/// Truncated input is a [`CryptoError::SealedFormat`] error. A wrong nonce
/// length prefix or a tag mismatch (tampering or wrong key) is
/// [`CryptoError::Authentication`] and the data must not be trusted.
pub fn open(sealed: &[u8], key: &FileKey) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let (&len_byte, rest) = sealed
        .split_first()
        .ok_or_else(|| CryptoError::SealedFormat("empty input".into()))?;
    let nonce_len = len_byte as usize;

    // Only 96-bit nonces are produced today; any other prefix means the
    // header was tampered with, so it fails the same way a bad tag does.
    if nonce_len != NONCE_SIZE {
        return Err(CryptoError::Authentication);
    }
    if rest.len() < nonce_len + TAG_SIZE {
        return Err(CryptoError::SealedFormat(format!(
            "{} bytes after prefix, need at least {}",
            rest.len(),
            nonce_len + TAG_SIZE
        )));
    }

    let (nonce_bytes, ciphertext) = rest.split_at(nonce_len);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::Authentication)?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_file_keys_are_unique() {
        let k1 = generate_file_key();
        let k2 = generate_file_key();
        assert_ne!(k1.as_bytes(), k2.as_bytes(), "random keys must differ");
    }

    #[test]
    fn test_file_key_debug_redacted() {
        let key = generate_file_key();
        assert!(!format!("{key:?}").contains(&format!("{}", key.as_bytes()[0])));
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = generate_file_key();
        let plaintext = b"hello, sealed world!";

        let sealed = seal(plaintext, &key).unwrap();
        let opened = open(&sealed, &key).unwrap();

        assert_eq!(&*opened, plaintext);
    }

    #[test]
    fn test_seal_open_empty() {
        let key = generate_file_key();
        let sealed = seal(b"", &key).unwrap();
        let opened = open(&sealed, &key).unwrap();
        assert_eq!(&*opened, b"");
    }

    #[test]
    fn test_sealed_layout() {
        let key = generate_file_key();
        let plaintext = vec![0u8; 1000];
        let sealed = seal(&plaintext, &key).unwrap();

        assert_eq!(sealed[0] as usize, NONCE_SIZE);
        // prefix (1) + nonce (12) + plaintext (1000) + tag (16)
        assert_eq!(sealed.len(), 1 + NONCE_SIZE + 1000 + TAG_SIZE);
    }

    #[test]
    fn test_nonces_are_fresh_per_call() {
        let key = generate_file_key();
        let a = seal(b"same input", &key).unwrap();
        let b = seal(b"same input", &key).unwrap();
        assert_ne!(a[1..=NONCE_SIZE], b[1..=NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_open_wrong_key() {
        let sealed = seal(b"secret data", &generate_file_key()).unwrap();
        let result = open(&sealed, &generate_file_key());
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_open_truncated() {
        let key = generate_file_key();
        let sealed = seal(b"secret data", &key).unwrap();

        assert!(matches!(
            open(&[], &key),
            Err(CryptoError::SealedFormat(_))
        ));
        assert!(matches!(
            open(&sealed[..NONCE_SIZE], &key),
            Err(CryptoError::SealedFormat(_))
        ));
    }

    #[test]
    fn test_open_bad_nonce_length_prefix() {
        let key = generate_file_key();
        let mut sealed = seal(b"secret data", &key).unwrap();
        sealed[0] = 16;
        assert!(matches!(
            open(&sealed, &key),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_any_bit_flip_fails_authentication() {
        let key = generate_file_key();
        let sealed = seal(b"integrity matters", &key).unwrap();

        // Flip one bit in every byte position: length prefix, nonce,
        // ciphertext, and tag regions must all be covered.
        for i in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(open(&tampered, &key), Err(CryptoError::Authentication)),
                "bit flip at byte {i} was not detected"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let key = generate_file_key();
            let sealed = seal(&payload, &key).unwrap();
            let opened = open(&sealed, &key).unwrap();
            prop_assert_eq!(&*opened, &payload[..]);
        }
    }
}
