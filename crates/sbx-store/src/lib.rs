//! sbx-store: persistence for identities and protected files
//!
//! The crypto core never reaches for storage directly; it depends on the
//! [`VaultStore`] trait, so tests can substitute [`MemoryStore`] while the
//! CLI runs on [`JsonStore`].

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use sbx_core::{Identity, ProtectedFile, SbxResult};
use uuid::Uuid;

/// Repository contract for identity and protected-file records.
///
/// Each call is atomic from the caller's perspective; implementations own
/// their locking and transaction discipline. Identity records are written
/// once at registration; file records are create-only.
pub trait VaultStore: Send + Sync {
    /// Persist a new identity. Rejects a username that already exists.
    fn save_identity(&self, identity: &Identity) -> SbxResult<()>;

    /// Look up an identity by its unique username.
    fn find_identity(&self, username: &str) -> SbxResult<Option<Identity>>;

    /// Persist a new protected-file record.
    fn save_file(&self, file: &ProtectedFile) -> SbxResult<()>;

    /// Look up a protected-file record by id.
    fn find_file(&self, id: Uuid) -> SbxResult<Option<ProtectedFile>>;

    /// All protected files owned by an identity, newest first.
    fn files_for(&self, identity_id: Uuid) -> SbxResult<Vec<ProtectedFile>>;
}
