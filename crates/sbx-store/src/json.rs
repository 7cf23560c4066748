//! Single-document JSON store
//!
//! One JSON document holds an `identities` array and a `files` array;
//! byte columns are base64 strings so the file stays diffable. Every trait
//! call re-reads, mutates, and rewrites the document under a lock, which
//! makes each call atomic for in-process callers. Not meant for concurrent
//! access from multiple processes.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use sbx_core::{Identity, ProtectedFile, SbxError, SbxResult};

use crate::VaultStore;

pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultDocument {
    identities: Vec<IdentityRecord>,
    files: Vec<FileRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IdentityRecord {
    id: Uuid,
    username: String,
    password_hash: String,
    salt: String,
    totp_secret: String,
    public_key: String,
    private_key: String,
    created_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileRecord {
    id: Uuid,
    identity_id: Uuid,
    original_locator: String,
    cipher_locator: String,
    wrapped_key: String,
    created_at: u64,
}

impl From<&Identity> for IdentityRecord {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            password_hash: BASE64.encode(&identity.password_hash),
            salt: BASE64.encode(&identity.salt),
            totp_secret: BASE64.encode(&identity.totp_secret),
            public_key: BASE64.encode(&identity.public_key_der),
            private_key: BASE64.encode(&identity.private_key_der),
            created_at: identity.created_at,
        }
    }
}

impl IdentityRecord {
    fn decode(&self) -> SbxResult<Identity> {
        Ok(Identity {
            id: self.id,
            username: self.username.clone(),
            password_hash: decode_column(&self.password_hash, "password_hash")?,
            salt: decode_column(&self.salt, "salt")?,
            totp_secret: decode_column(&self.totp_secret, "totp_secret")?,
            public_key_der: decode_column(&self.public_key, "public_key")?,
            private_key_der: decode_column(&self.private_key, "private_key")?,
            created_at: self.created_at,
        })
    }
}

impl From<&ProtectedFile> for FileRecord {
    fn from(file: &ProtectedFile) -> Self {
        Self {
            id: file.id,
            identity_id: file.identity_id,
            original_locator: file.original_locator.clone(),
            cipher_locator: file.cipher_locator.clone(),
            wrapped_key: BASE64.encode(&file.wrapped_key),
            created_at: file.created_at,
        }
    }
}

impl FileRecord {
    fn decode(&self) -> SbxResult<ProtectedFile> {
        Ok(ProtectedFile {
            id: self.id,
            identity_id: self.identity_id,
            original_locator: self.original_locator.clone(),
            cipher_locator: self.cipher_locator.clone(),
            wrapped_key: decode_column(&self.wrapped_key, "wrapped_key")?,
            created_at: self.created_at,
        })
    }
}

fn decode_column(value: &str, column: &str) -> SbxResult<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|e| SbxError::Store(format!("corrupt {column} column: {e}")))
}

impl JsonStore {
    /// Open a store at the given path. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> SbxResult<VaultDocument> {
        if !self.path.exists() {
            return Ok(VaultDocument::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| SbxError::Store(format!("parsing {}: {e}", self.path.display())))
    }

    fn persist(&self, doc: &VaultDocument) -> SbxResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| SbxError::Store(format!("serializing vault document: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl VaultStore for JsonStore {
    fn save_identity(&self, identity: &Identity) -> SbxResult<()> {
        let _guard = self.lock.lock();
        let mut doc = self.load()?;
        if doc.identities.iter().any(|r| r.username == identity.username) {
            return Err(SbxError::Validation(format!(
                "username already registered: {}",
                identity.username
            )));
        }
        doc.identities.push(identity.into());
        self.persist(&doc)?;
        tracing::debug!(username = %identity.username, "identity saved");
        Ok(())
    }

    fn find_identity(&self, username: &str) -> SbxResult<Option<Identity>> {
        let _guard = self.lock.lock();
        let doc = self.load()?;
        doc.identities
            .iter()
            .find(|r| r.username == username)
            .map(IdentityRecord::decode)
            .transpose()
    }

    fn save_file(&self, file: &ProtectedFile) -> SbxResult<()> {
        let _guard = self.lock.lock();
        let mut doc = self.load()?;
        doc.files.push(file.into());
        self.persist(&doc)
    }

    fn find_file(&self, id: Uuid) -> SbxResult<Option<ProtectedFile>> {
        let _guard = self.lock.lock();
        let doc = self.load()?;
        doc.files
            .iter()
            .find(|r| r.id == id)
            .map(FileRecord::decode)
            .transpose()
    }

    fn files_for(&self, identity_id: Uuid) -> SbxResult<Vec<ProtectedFile>> {
        let _guard = self.lock.lock();
        let doc = self.load()?;
        let mut files = doc
            .files
            .iter()
            .filter(|r| r.identity_id == identity_id)
            .map(FileRecord::decode)
            .collect::<SbxResult<Vec<_>>>()?;
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbx_core::types::unix_now;

    fn identity(username: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: vec![0xAA; 32],
            salt: vec![0xBB; 16],
            totp_secret: vec![0xCC; 20],
            public_key_der: vec![0xDD; 64],
            private_key_der: vec![0xEE; 64],
            created_at: unix_now(),
        }
    }

    #[test]
    fn test_roundtrip_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let alice = identity("alice");
        let file = ProtectedFile {
            id: Uuid::new_v4(),
            identity_id: alice.id,
            original_locator: "/home/alice/report.pdf".into(),
            cipher_locator: "/home/alice/report.pdf.sbx".into(),
            wrapped_key: vec![0x11; 256],
            created_at: unix_now(),
        };

        {
            let store = JsonStore::open(&path);
            store.save_identity(&alice).unwrap();
            store.save_file(&file).unwrap();
        }

        let store = JsonStore::open(&path);
        let loaded = store.find_identity("alice").unwrap().unwrap();
        assert_eq!(loaded.id, alice.id);
        assert_eq!(loaded.salt, alice.salt);
        assert_eq!(loaded.private_key_der, alice.private_key_der);

        let loaded_file = store.find_file(file.id).unwrap().unwrap();
        assert_eq!(loaded_file.wrapped_key, file.wrapped_key);
        assert_eq!(store.files_for(alice.id).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("absent.json"));
        assert!(store.find_identity("anyone").unwrap().is_none());
        assert!(store.files_for(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("vault.json"));
        store.save_identity(&identity("alice")).unwrap();
        assert!(matches!(
            store.save_identity(&identity("alice")),
            Err(SbxError::Validation(_))
        ));
    }

    #[test]
    fn test_corrupt_column_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let store = JsonStore::open(&path);
        store.save_identity(&identity("alice")).unwrap();

        let mangled = std::fs::read_to_string(&path)
            .unwrap()
            .replace(&BASE64.encode([0xBB; 16]), "!!not-base64!!");
        std::fs::write(&path, mangled).unwrap();

        assert!(matches!(
            store.find_identity("alice"),
            Err(SbxError::Store(_))
        ));
    }
}
