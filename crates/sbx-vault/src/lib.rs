//! sbx-vault: identity, two-factor authentication, and file protection
//!
//! Registration composes four independent secrets for a new identity: a
//! random salt, a PBKDF2 password hash, a TOTP shared secret, and an RSA
//! envelope keypair. Login passes two gates in strict order (password,
//! then TOTP); both must succeed and only a boolean leaves the service.
//! File protection seals plaintext with a fresh AES key and wraps that key
//! under the identity's public key (see `sbx-crypto`).

pub mod files;
pub mod identity;
pub mod password;
pub mod totp;

pub use files::FileVault;
pub use identity::IdentityService;
