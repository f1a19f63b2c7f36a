//! Crypto Vault - password-protected secret custody.
//!
//! Thin command-line adapter over the library: one-shot token encryption and
//! decryption, token inspection, and an interactive shell backed by a single
//! in-memory vault.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crypto_vault::{Cipher, ErrorKind, Token, Vault, VaultConfig};
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crypto-vault")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Password-protected in-memory secret custody",
    long_about = "Encrypts secrets under PBKDF2-derived keys into authenticated AES-GCM tokens and keeps them in an in-memory vault."
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Deployment-wide derivation secret (overrides the config file)
    #[arg(long, global = true, env = "CRYPTO_VAULT_SECRET", hide_env_values = true)]
    derivation_secret: Option<String>,

    /// PBKDF2 iteration count
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Derived key length in bytes (16 or 32)
    #[arg(long, global = true)]
    key_length: Option<usize>,

    /// Token freshness window in seconds (0 = unbounded)
    #[arg(long, global = true)]
    max_age: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a secret into a token
    Encrypt {
        /// Secret to encrypt (default: read from stdin)
        #[arg(long)]
        data: Option<String>,
    },

    /// Decrypt a token
    Decrypt {
        /// Token produced by `encrypt`
        token: String,
    },

    /// Show a token's version and creation time
    Inspect {
        /// Token to inspect
        token: String,
    },

    /// Interactive session over one in-memory vault
    Shell,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber on stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crypto_vault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Inspect { token } => cmd_inspect(&token),
        Commands::Encrypt { data } => cmd_encrypt(&load_config(&cli.config)?, data),
        Commands::Decrypt { token } => cmd_decrypt(&load_config(&cli.config)?, &token),
        Commands::Shell => cmd_shell(&load_config(&cli.config)?),
    }
}

fn load_config(args: &ConfigArgs) -> Result<VaultConfig> {
    let mut config = match (&args.config, &args.derivation_secret) {
        (Some(path), secret) => {
            let mut config = VaultConfig::from_json_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            if let Some(secret) = secret {
                config.derivation_secret = secret.clone();
            }
            config
        }
        (None, Some(secret)) => VaultConfig::new(secret.clone()),
        (None, None) => {
            bail!("no derivation secret: pass --config or set CRYPTO_VAULT_SECRET")
        }
    };

    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(key_length) = args.key_length {
        config.key_length = key_length;
    }
    if let Some(max_age) = args.max_age {
        config.max_age_secs = (max_age > 0).then_some(max_age);
    }

    config.validate()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn prompt_password(prompt: &str) -> Result<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Ok(password),
        Err(_) => {
            eprint!("{}", prompt);
            io::stderr().flush()?;
            read_password_line(&mut io::stdin().lock())
        }
    }
}

/// Read one password line without a tty. End of input is an error, not "".
fn read_password_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut password = String::new();
    if reader.read_line(&mut password)? == 0 {
        bail!("no password provided");
    }
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

/// Passwords that protect new secrets must not be empty.
fn require_password(password: String) -> Result<String> {
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn cmd_encrypt(config: &VaultConfig, data: Option<String>) -> Result<()> {
    let secret = match data {
        Some(s) => s,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading secret from stdin")?;
            buffer
        }
    };

    let password = require_password(prompt_password("Password: ")?)?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("passwords do not match");
    }

    let cipher = Cipher::new(config)?;
    let token = cipher
        .encrypt(secret.as_bytes(), &password)
        .map_err(ErrorKind::from)?;
    println!("{}", token);

    Ok(())
}

fn cmd_decrypt(config: &VaultConfig, token: &str) -> Result<()> {
    let password = prompt_password("Password: ")?;

    let cipher = Cipher::new(config)?;
    let plaintext = cipher
        .decrypt(token.trim(), &password)
        .map_err(ErrorKind::from)?;
    io::stdout().write_all(&plaintext)?;

    Ok(())
}

fn cmd_inspect(token: &str) -> Result<()> {
    let token = Token::parse(token.trim())
        .map_err(|reason| anyhow::anyhow!("{}", reason.as_str()))?;

    println!("Token");
    println!("=====");
    println!("Version:          0x{:02x}", token.version());
    match token.created_at_utc() {
        Some(created) => println!("Created:          {}", created.to_rfc3339()),
        None => println!("Created:          {} (out of range)", token.created_at()),
    }
    println!("Payload:          {} bytes", token.payload_len());

    Ok(())
}

fn cmd_shell(config: &VaultConfig) -> Result<()> {
    let vault = Vault::new(config)?;
    println!("crypto-vault shell. Commands: store <id>, retrieve <id>, remove <id>, count, quit");

    let stdin = io::stdin();
    loop {
        print!("vault> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (None, _) => continue,
            (Some("quit" | "exit"), _) => break,
            (Some("count"), _) => println!("{} account(s)", vault.len()),
            (Some("store"), Some(id)) => {
                let secret = prompt_password("Secret: ")?;
                let password = match require_password(prompt_password("Password: ")?) {
                    Ok(password) => password,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match vault.store(id, &secret, &password) {
                    Ok(()) => println!("Stored successfully"),
                    Err(kind) => println!("Error: {}", kind),
                }
            }
            (Some("retrieve"), Some(id)) => {
                let password = prompt_password("Password: ")?;
                match vault.retrieve(id, &password) {
                    Ok(secret) => println!("{}", secret),
                    Err(kind) => println!("Error: {}", kind),
                }
            }
            (Some("remove"), Some(id)) => {
                if vault.remove(id) {
                    println!("Removed {}", id);
                } else {
                    println!("Error: {}", ErrorKind::NotFound);
                }
            }
            (Some(cmd @ ("store" | "retrieve" | "remove")), None) => {
                println!("Usage: {} <id>", cmd)
            }
            (Some(other), _) => println!("Unknown command: {}", other),
        }
    }

    Ok(())
}
