//! sbx-crypto: envelope encryption for strongbox
//!
//! Hybrid scheme:
//! ```text
//! Identity keypair (RSA-2048, SPKI / PKCS#8 DER at rest)
//!   └── File Key (per-file, 256-bit random, RSA-OAEP-SHA256 wrapped)
//!       └── File AEAD: AES-256-GCM (nonce=random_96bit, tag=128bit)
//! ```
//!
//! Bulk data only ever touches the symmetric cipher; the asymmetric
//! operation covers exactly 32 key bytes per file.

pub mod envelope;
pub mod error;
pub mod keypair;
pub mod wrap;

pub use envelope::{generate_file_key, open, seal, FileKey};
pub use error::CryptoError;
pub use keypair::{decode_private_key, decode_public_key, generate_keypair, EncodedKeypair};
pub use wrap::{unwrap_file_key, wrap_file_key};

/// Size of a file key in bytes (256-bit AES)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;
