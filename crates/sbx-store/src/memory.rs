//! In-memory store for tests and crypto-core isolation

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use sbx_core::{Identity, ProtectedFile, SbxError, SbxResult};

use crate::VaultStore;

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    identities: HashMap<String, Identity>,
    files: HashMap<Uuid, ProtectedFile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VaultStore for MemoryStore {
    fn save_identity(&self, identity: &Identity) -> SbxResult<()> {
        let mut inner = self.inner.write();
        if inner.identities.contains_key(&identity.username) {
            return Err(SbxError::Validation(format!(
                "username already registered: {}",
                identity.username
            )));
        }
        inner
            .identities
            .insert(identity.username.clone(), identity.clone());
        Ok(())
    }

    fn find_identity(&self, username: &str) -> SbxResult<Option<Identity>> {
        Ok(self.inner.read().identities.get(username).cloned())
    }

    fn save_file(&self, file: &ProtectedFile) -> SbxResult<()> {
        self.inner.write().files.insert(file.id, file.clone());
        Ok(())
    }

    fn find_file(&self, id: Uuid) -> SbxResult<Option<ProtectedFile>> {
        Ok(self.inner.read().files.get(&id).cloned())
    }

    fn files_for(&self, identity_id: Uuid) -> SbxResult<Vec<ProtectedFile>> {
        let inner = self.inner.read();
        let mut files: Vec<ProtectedFile> = inner
            .files
            .values()
            .filter(|f| f.identity_id == identity_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }
}
