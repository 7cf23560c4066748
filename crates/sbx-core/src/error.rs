use thiserror::Error;

pub type SbxResult<T> = Result<T, SbxError>;

#[derive(Debug, Error)]
pub enum SbxError {
    /// Recoverable caller mistake: duplicate username, malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Single opaque rejection covering wrong password, wrong TOTP code,
    /// GCM tag mismatch, and OAEP unwrap failure. The internal cause never
    /// crosses the trust boundary.
    #[error("authentication rejected")]
    AuthenticationFailed,

    /// Missing or undecodable stored key material: a corrupted identity
    /// record, not a wrong credential.
    #[error("key material error: {0}")]
    KeyMaterial(String),

    /// Randomness source or crypto primitive failed. Fatal; retrying a
    /// broken primitive will not help.
    #[error("crypto primitive unavailable: {0}")]
    Primitive(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
