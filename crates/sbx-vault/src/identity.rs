//! Identity lifecycle: registration and two-factor login
//!
//! Login is a fixed gate sequence — lookup, password check, TOTP check —
//! and fails closed at every gate. The caller only ever learns a boolean;
//! which gate rejected is logged at debug level and goes no further.

use rsa::{RsaPrivateKey, RsaPublicKey};
use secrecy::SecretString;
use tracing::{debug, info};
use uuid::Uuid;

use sbx_core::config::{KdfConfig, KeyConfig, TotpConfig};
use sbx_core::types::unix_now;
use sbx_core::{Identity, SbxError, SbxResult};
use sbx_crypto::keypair;
use sbx_store::VaultStore;

use crate::{password, totp};

pub struct IdentityService<'a> {
    store: &'a dyn VaultStore,
    kdf: KdfConfig,
    totp: TotpConfig,
    keys: KeyConfig,
}

impl<'a> IdentityService<'a> {
    pub fn new(store: &'a dyn VaultStore, kdf: KdfConfig, totp: TotpConfig, keys: KeyConfig) -> Self {
        Self {
            store,
            kdf,
            totp,
            keys,
        }
    }

    /// Register a new identity: fresh salt, PBKDF2 password hash, TOTP
    /// secret, and RSA envelope keypair, persisted as one record.
    pub fn register(&self, username: &str, password: &SecretString) -> SbxResult<Identity> {
        if username.trim().is_empty() {
            return Err(SbxError::Validation("username must not be empty".into()));
        }
        if self.store.find_identity(username)?.is_some() {
            return Err(SbxError::Validation(format!(
                "username already registered: {username}"
            )));
        }

        let salt = password::generate_salt();
        let hash = password::derive(password, &salt, self.kdf.iterations);
        let secret = totp::generate_secret();
        let keypair = keypair::generate_keypair(self.keys.rsa_bits)?;

        let identity = Identity {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            password_hash: hash.to_vec(),
            salt: salt.to_vec(),
            totp_secret: secret.to_vec(),
            public_key_der: keypair.public_der,
            private_key_der: keypair.private_der.to_vec(),
            created_at: unix_now(),
        };
        self.store.save_identity(&identity)?;

        info!(event = "register", username, "identity registered");
        Ok(identity)
    }

    /// Authenticate with password and TOTP code. Both gates must pass, in
    /// order; any miss — unknown username, password mismatch, code
    /// mismatch — yields the same `Ok(false)`.
    pub fn login(&self, username: &str, password: &SecretString, code: u32) -> SbxResult<bool> {
        let Some(identity) = self.store.find_identity(username)? else {
            debug!(username, "login gate: unknown username");
            info!(event = "login_fail", username, "login rejected");
            return Ok(false);
        };

        if !password::verify(
            password,
            &identity.salt,
            &identity.password_hash,
            self.kdf.iterations,
        ) {
            debug!(username, "login gate: password mismatch");
            info!(event = "login_fail", username, "login rejected");
            return Ok(false);
        }

        if !totp::verify(&identity.totp_secret, code, unix_now(), &self.totp) {
            debug!(username, "login gate: TOTP mismatch");
            info!(event = "login_fail", username, "login rejected");
            return Ok(false);
        }

        info!(event = "login_success", username, "password and TOTP verified");
        Ok(true)
    }

    /// Decode the identity's stored public key for key wrapping.
    pub fn public_key_for(&self, identity: &Identity) -> SbxResult<RsaPublicKey> {
        Ok(keypair::decode_public_key(&identity.public_key_der)?)
    }

    /// Decode the identity's stored private key for key unwrapping.
    pub fn private_key_for(&self, identity: &Identity) -> SbxResult<RsaPrivateKey> {
        Ok(keypair::decode_private_key(&identity.private_key_der)?)
    }

    /// otpauth:// URI for the external QR-rendering collaborator.
    pub fn provisioning_uri(&self, identity: &Identity) -> String {
        totp::provisioning_uri(
            &self.totp.issuer,
            &identity.username,
            &identity.totp_secret,
            &self.totp,
        )
    }

    pub fn totp_params(&self) -> &TotpConfig {
        &self.totp
    }
}
