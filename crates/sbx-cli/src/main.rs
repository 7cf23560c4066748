//! sbx: Strongbox vault CLI
//!
//! Commands:
//!   register <username>              - create an identity (prompts for password)
//!   login <username>                 - authenticate with password + TOTP code
//!   uri <username>                   - print the otpauth:// provisioning URI
//!   encrypt <username> <file>        - seal a file under a fresh wrapped key
//!   decrypt <username> <id> <out>    - authenticate, then open a protected file
//!   ls <username>                    - list protected files, newest first
//!   config show                      - display the active configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use sbx_core::config::StrongboxConfig;
use sbx_store::JsonStore;
use sbx_vault::totp;
use sbx_vault::{FileVault, IdentityService};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sbx",
    version,
    about = "Strongbox encrypted file vault",
    long_about = "sbx: manage identities, two-factor login, and envelope-encrypted files"
)]
struct Cli {
    /// Path to strongbox.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "STRONGBOX_CONFIG",
        default_value = "~/.config/strongbox/strongbox.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new identity (prompts for a password)
    Register {
        username: String,
    },

    /// Authenticate with password and TOTP code
    Login {
        username: String,
        /// TOTP code from the authenticator app (prompted if omitted)
        #[arg(long)]
        code: Option<u32>,
    },

    /// Print the otpauth:// provisioning URI for an authenticator app
    Uri {
        username: String,
    },

    /// Encrypt a file under the identity's public key
    Encrypt {
        username: String,
        /// File to protect
        input: PathBuf,
        /// Sealed output path (default: <input>.sbx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Authenticate, then decrypt a protected file
    Decrypt {
        username: String,
        /// Protected file record id (see `sbx ls`)
        id: Uuid,
        /// Plaintext output path
        output: PathBuf,
        /// TOTP code from the authenticator app (prompted if omitted)
        #[arg(long)]
        code: Option<u32>,
    },

    /// List an identity's protected files, newest first
    Ls {
        username: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = load_config(&config_path)?;
    init_logging(&config.log.level, &config.log.format);

    let store = JsonStore::open(expand_tilde(&config.store.path));

    match cli.command {
        Commands::Register { username } => cmd_register(&config, &store, &username),
        Commands::Login { username, code } => cmd_login(&config, &store, &username, code),
        Commands::Uri { username } => cmd_uri(&config, &store, &username),
        Commands::Encrypt {
            username,
            input,
            output,
        } => cmd_encrypt(&store, &username, &input, output.as_deref()),
        Commands::Decrypt {
            username,
            id,
            output,
            code,
        } => cmd_decrypt(&config, &store, &username, id, &output, code),
        Commands::Ls { username } => cmd_ls(&store, &username),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &config_path),
    }
}

// ── Config loading / logging ──────────────────────────────────────────────────

fn load_config(path: &Path) -> Result<StrongboxConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))
    } else {
        Ok(StrongboxConfig::default())
    }
}

fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

/// Expand `~` in path to the user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{}/{}", home, &s[2..]))
    } else {
        path.to_path_buf()
    }
}

fn identity_service<'a>(config: &StrongboxConfig, store: &'a JsonStore) -> IdentityService<'a> {
    IdentityService::new(
        store,
        config.kdf.clone(),
        config.totp.clone(),
        config.keys.clone(),
    )
}

// ── Prompts ───────────────────────────────────────────────────────────────────

fn prompt_password(prompt: &str) -> Result<SecretString> {
    let password = rpassword::prompt_password(prompt).context("reading password")?;
    Ok(SecretString::from(password))
}

fn prompt_code(provided: Option<u32>) -> Result<u32> {
    if let Some(code) = provided {
        return Ok(code);
    }
    print!("TOTP code: ");
    std::io::stdout().flush().context("flushing stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("reading TOTP code")?;
    line.trim()
        .parse()
        .with_context(|| format!("invalid TOTP code: {:?}", line.trim()))
}

/// Authenticate or bail; shared by `login` and `decrypt`.
fn authenticate(
    config: &StrongboxConfig,
    store: &JsonStore,
    username: &str,
    code: Option<u32>,
) -> Result<()> {
    let service = identity_service(config, store);
    let password = prompt_password("Password: ")?;
    let code = prompt_code(code)?;

    if !service.login(username, &password, code)? {
        anyhow::bail!("authentication rejected");
    }
    Ok(())
}

// ── `sbx register` ────────────────────────────────────────────────────────────

fn cmd_register(config: &StrongboxConfig, store: &JsonStore, username: &str) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    {
        use secrecy::ExposeSecret;
        if password.expose_secret() != confirm.expose_secret() {
            anyhow::bail!("passwords do not match");
        }
    }

    let service = identity_service(config, store);
    let identity = service
        .register(username, &password)
        .with_context(|| format!("registering {username}"))?;

    println!("Registered: {username}");
    println!("  id:   {}", identity.id);
    println!();
    println!("Add this account to your authenticator app:");
    println!("  {}", service.provisioning_uri(&identity));
    println!();
    println!(
        "Or enter the secret manually: {}",
        totp::secret_to_base32(&identity.totp_secret)
    );
    Ok(())
}

// ── `sbx login` ───────────────────────────────────────────────────────────────

fn cmd_login(
    config: &StrongboxConfig,
    store: &JsonStore,
    username: &str,
    code: Option<u32>,
) -> Result<()> {
    authenticate(config, store, username, code)?;
    println!("Login OK: {username}");
    Ok(())
}

// ── `sbx uri` ─────────────────────────────────────────────────────────────────

fn cmd_uri(config: &StrongboxConfig, store: &JsonStore, username: &str) -> Result<()> {
    let service = identity_service(config, store);
    let identity = find_identity(store, username)?;
    println!("{}", service.provisioning_uri(&identity));
    Ok(())
}

// ── `sbx encrypt` ─────────────────────────────────────────────────────────────

fn cmd_encrypt(
    store: &JsonStore,
    username: &str,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("not a file: {}", input.display());
    }
    let identity = find_identity(store, username)?;

    let default_output = sealed_name(input);
    let output = output.unwrap_or(&default_output);

    let vault = FileVault::new(store);
    let record = vault
        .encrypt_file(&identity, input, output)
        .with_context(|| format!("encrypting {}", input.display()))?;

    println!("Sealed: {} → {}", input.display(), output.display());
    println!("  record id: {}", record.id);
    Ok(())
}

/// Default sealed path: append `.sbx` to the input name
fn sealed_name(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".sbx");
    PathBuf::from(name)
}

// ── `sbx decrypt` ─────────────────────────────────────────────────────────────

fn cmd_decrypt(
    config: &StrongboxConfig,
    store: &JsonStore,
    username: &str,
    id: Uuid,
    output: &Path,
    code: Option<u32>,
) -> Result<()> {
    // Decryption is gated on a full two-factor login, not mere possession
    // of the vault file.
    authenticate(config, store, username, code)?;

    let identity = find_identity(store, username)?;
    let vault = FileVault::new(store);
    vault
        .decrypt_file(&identity, id, output)
        .with_context(|| format!("decrypting record {id}"))?;

    println!("Restored: {}", output.display());
    Ok(())
}

// ── `sbx ls` ──────────────────────────────────────────────────────────────────

fn cmd_ls(store: &JsonStore, username: &str) -> Result<()> {
    let identity = find_identity(store, username)?;
    let vault = FileVault::new(store);
    let files = vault.list_files(&identity)?;

    if files.is_empty() {
        println!("No protected files for {username}.");
        return Ok(());
    }

    println!("Protected files for {username}:");
    for file in files {
        println!("  {}  {}", file.id, file.original_locator);
        println!("      sealed: {}", file.cipher_locator);
    }
    Ok(())
}

// ── `sbx config show` ─────────────────────────────────────────────────────────

fn cmd_config_show(config: &StrongboxConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!(
            "# Configuration: defaults (no file at {})",
            config_path.display()
        );
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Utilities ─────────────────────────────────────────────────────────────────

fn find_identity(store: &JsonStore, username: &str) -> Result<sbx_core::Identity> {
    use sbx_store::VaultStore;
    store
        .find_identity(username)?
        .with_context(|| format!("no identity registered as {username}"))
}
