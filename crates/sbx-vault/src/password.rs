//! PBKDF2 password credential
//!
//! Passwords arrive as `SecretString` and derived keys leave in zeroizing
//! buffers; nothing here keeps a plaintext copy alive past its scope.

use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use zeroize::Zeroizing;

/// Salt length in bytes (128-bit)
pub const SALT_SIZE: usize = 16;

/// Derived key length in bytes (256-bit)
pub const HASH_SIZE: usize = 32;

/// Generate a fresh random salt. One per identity, never reused.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a password via PBKDF2-HMAC-SHA512.
///
/// `iterations` is a cost parameter, tunable through `KdfConfig`
/// (default 100 000).
pub fn derive(
    password: &SecretString,
    salt: &[u8],
    iterations: u32,
) -> Zeroizing<[u8; HASH_SIZE]> {
    let mut hash = Zeroizing::new([0u8; HASH_SIZE]);
    pbkdf2_hmac::<Sha512>(
        password.expose_secret().as_bytes(),
        salt,
        iterations,
        &mut *hash,
    );
    hash
}

/// Verify a password against a stored hash.
///
/// Recomputes the derived key and compares in constant time. A length
/// mismatch returns false, never an error.
pub fn verify(password: &SecretString, salt: &[u8], expected: &[u8], iterations: u32) -> bool {
    let computed = derive(password, salt, iterations);
    ct_eq(&*computed, expected)
}

/// XOR-accumulate comparison: walks both slices to the end, no
/// short-circuit on the first differing byte.
fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}
