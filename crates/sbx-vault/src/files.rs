//! File protection: seal-and-wrap on encrypt, unwrap-and-open on decrypt
//!
//! Whole files are buffered in memory; good enough for documents, a known
//! limit for very large files (streaming would need chunked GCM).

use std::path::Path;
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

use sbx_core::types::unix_now;
use sbx_core::{Identity, ProtectedFile, SbxError, SbxResult};
use sbx_crypto::{envelope, keypair, wrap};
use sbx_store::VaultStore;

pub struct FileVault<'a> {
    store: &'a dyn VaultStore,
}

impl<'a> FileVault<'a> {
    pub fn new(store: &'a dyn VaultStore) -> Self {
        Self { store }
    }

    /// Seal `input` to `output` under a fresh per-file key, wrap that key
    /// with the identity's public key, and persist the record.
    ///
    /// Re-encrypting the same path creates a new record; existing records
    /// are never mutated.
    pub fn encrypt_file(
        &self,
        identity: &Identity,
        input: &Path,
        output: &Path,
    ) -> SbxResult<ProtectedFile> {
        let public = keypair::decode_public_key(&identity.public_key_der)?;

        let plaintext = Zeroizing::new(std::fs::read(input)?);
        let file_key = envelope::generate_file_key();
        let sealed = envelope::seal(&plaintext, &file_key)?;
        let wrapped_key = wrap::wrap_file_key(&file_key, &public)?;

        std::fs::write(output, &sealed)?;

        let record = ProtectedFile {
            id: Uuid::new_v4(),
            identity_id: identity.id,
            original_locator: input.display().to_string(),
            cipher_locator: output.display().to_string(),
            wrapped_key,
            created_at: unix_now(),
        };
        self.store.save_file(&record)?;

        info!(
            event = "encrypt_file",
            username = %identity.username,
            original = %record.original_locator,
            cipher = %record.cipher_locator,
            "file sealed"
        );
        Ok(record)
    }

    /// Unwrap the record's file key with the identity's private key, open
    /// the sealed bytes, and write the plaintext to `output`.
    pub fn decrypt_file(
        &self,
        identity: &Identity,
        record_id: Uuid,
        output: &Path,
    ) -> SbxResult<()> {
        let record = self
            .store
            .find_file(record_id)?
            .ok_or_else(|| SbxError::Validation(format!("no protected file {record_id}")))?;
        if record.identity_id != identity.id {
            return Err(SbxError::Validation(
                "protected file belongs to a different identity".into(),
            ));
        }

        let private = keypair::decode_private_key(&identity.private_key_der)?;
        let file_key = wrap::unwrap_file_key(&record.wrapped_key, &private)?;

        let sealed = std::fs::read(&record.cipher_locator)?;
        let plaintext = envelope::open(&sealed, &file_key)?;
        std::fs::write(output, &*plaintext)?;

        info!(
            event = "decrypt_file",
            username = %identity.username,
            cipher = %record.cipher_locator,
            output = %output.display(),
            "file opened"
        );
        Ok(())
    }

    /// All protected files owned by the identity, newest first.
    pub fn list_files(&self, identity: &Identity) -> SbxResult<Vec<ProtectedFile>> {
        self.store.files_for(identity.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityService;
    use rand::RngCore;
    use sbx_core::config::{KdfConfig, StrongboxConfig};
    use sbx_store::MemoryStore;
    use secrecy::SecretString;

    fn registered(store: &MemoryStore) -> Identity {
        let config = StrongboxConfig::default();
        IdentityService::new(store, KdfConfig { iterations: 1_000 }, config.totp, config.keys)
            .register("alice", &SecretString::from("Str0ng!Pw"))
            .unwrap()
    }

    #[test]
    fn test_register_login_encrypt_decrypt_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let config = StrongboxConfig::default();
        let service =
            IdentityService::new(&store, KdfConfig { iterations: 1_000 }, config.totp, config.keys);
        let identity = service
            .register("alice", &SecretString::from("Str0ng!Pw"))
            .unwrap();

        let code = crate::totp::code_at(
            &identity.totp_secret,
            sbx_core::types::unix_now(),
            service.totp_params(),
        );
        assert!(service
            .login("alice", &SecretString::from("Str0ng!Pw"), code)
            .unwrap());

        let vault = FileVault::new(&store);

        // 10 KiB random payload
        let mut payload = vec![0u8; 10 * 1024];
        rand::rngs::OsRng.fill_bytes(&mut payload);
        let input = dir.path().join("report.bin");
        let sealed_path = dir.path().join("report.bin.sbx");
        let restored = dir.path().join("report.restored.bin");
        std::fs::write(&input, &payload).unwrap();

        let record = vault.encrypt_file(&identity, &input, &sealed_path).unwrap();
        assert_eq!(record.identity_id, identity.id);
        assert!(!record.wrapped_key.is_empty());
        assert_ne!(std::fs::read(&sealed_path).unwrap(), payload);

        vault.decrypt_file(&identity, record.id, &restored).unwrap();
        assert_eq!(std::fs::read(&restored).unwrap(), payload);
    }

    #[test]
    fn test_decrypt_rejects_foreign_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let alice = registered(&store);
        let config = StrongboxConfig::default();
        let bob = IdentityService::new(
            &store,
            KdfConfig { iterations: 1_000 },
            config.totp,
            config.keys,
        )
        .register("bob", &SecretString::from("pw"))
        .unwrap();

        let input = dir.path().join("note.txt");
        std::fs::write(&input, b"for alice only").unwrap();
        let vault = FileVault::new(&store);
        let record = vault
            .encrypt_file(&alice, &input, &dir.path().join("note.txt.sbx"))
            .unwrap();

        let result = vault.decrypt_file(&bob, record.id, &dir.path().join("out.txt"));
        assert!(matches!(result, Err(SbxError::Validation(_))));
    }

    #[test]
    fn test_decrypt_tampered_ciphertext_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let identity = registered(&store);
        let vault = FileVault::new(&store);

        let input = dir.path().join("ledger.csv");
        let sealed_path = dir.path().join("ledger.csv.sbx");
        std::fs::write(&input, b"balance,amount\n1,100\n").unwrap();
        let record = vault.encrypt_file(&identity, &input, &sealed_path).unwrap();

        let mut sealed = std::fs::read(&sealed_path).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x80;
        std::fs::write(&sealed_path, &sealed).unwrap();

        let result = vault.decrypt_file(&identity, record.id, &dir.path().join("out.csv"));
        assert!(matches!(result, Err(SbxError::AuthenticationFailed)));
    }

    #[test]
    fn test_decrypt_missing_record() {
        let store = MemoryStore::new();
        let identity = registered(&store);
        let vault = FileVault::new(&store);

        let result = vault.decrypt_file(&identity, Uuid::new_v4(), Path::new("/tmp/out"));
        assert!(matches!(result, Err(SbxError::Validation(_))));
    }

    #[test]
    fn test_each_file_gets_its_own_wrapped_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let identity = registered(&store);
        let vault = FileVault::new(&store);

        let input = dir.path().join("same.txt");
        std::fs::write(&input, b"same plaintext").unwrap();

        let a = vault
            .encrypt_file(&identity, &input, &dir.path().join("a.sbx"))
            .unwrap();
        let b = vault
            .encrypt_file(&identity, &input, &dir.path().join("b.sbx"))
            .unwrap();

        assert_ne!(a.wrapped_key, b.wrapped_key);
        assert_eq!(vault.list_files(&identity).unwrap().len(), 2);
    }
}
