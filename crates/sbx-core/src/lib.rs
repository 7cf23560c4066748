pub mod config;
pub mod error;
pub mod types;

pub use error::{SbxError, SbxResult};
pub use types::{Identity, ProtectedFile};
