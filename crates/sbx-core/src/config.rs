use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration (loaded from strongbox.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrongboxConfig {
    pub log: LogConfig,
    pub store: StoreConfig,
    pub kdf: KdfConfig,
    pub totp: TotpConfig,
    pub keys: KeyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the JSON vault store
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("~/.local/share/strongbox/vault.json"),
        }
    }
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// PBKDF2-HMAC-SHA512 iteration count. A cost parameter: raise it as
    /// hardware gets faster (default: 100000)
    pub iterations: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            iterations: 100_000,
        }
    }
}

/// TOTP parameters (RFC 6238)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// Code length in digits (default: 6)
    pub digits: u32,
    /// Time step in seconds (default: 30)
    pub period_secs: u64,
    /// Accepted clock drift in steps either side of now (default: 1).
    /// Widening this widens the replay window too.
    pub drift_steps: u32,
    /// Issuer label for provisioning URIs (default: Strongbox)
    pub issuer: String,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            digits: 6,
            period_secs: 30,
            drift_steps: 1,
            issuer: "Strongbox".into(),
        }
    }
}

/// Asymmetric keypair configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// RSA modulus size in bits (default: 2048)
    pub rsa_bits: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self { rsa_bits: 2048 }
    }
}
