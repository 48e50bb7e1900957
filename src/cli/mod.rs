//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{Backend, OperatorSalt, Settings};
use crate::crypto::is_pin_shaped;
use crate::errors::{Result, SecretShareError};
use crate::messages::MessageService;
use crate::store::open_repository;

/// Environment variable read for the PIN before prompting.
const ENV_PIN: &str = "SECRETSHARE_PIN";

/// SecretShare CLI: one-time, PIN-protected secret sharing.
#[derive(Parser)]
#[command(
    name = "secretshare",
    about = "Share a secret once, protected by a PIN",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory holding .secretshare.toml and the data directory
    #[arg(long, env = "SECRETSHARE_DIR", default_value = ".", global = true)]
    pub dir: String,

    /// Override the configured storage backend
    #[arg(long, value_enum, global = true)]
    pub backend: Option<Backend>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Store a secret and print its id and one-time PIN
    Create {
        /// Secret text (omit to pipe via stdin or type at a prompt)
        text: Option<String>,

        /// Owner the message is listed under
        #[arg(short, long, env = "SECRETSHARE_OWNER")]
        owner: String,
    },

    /// Show a message's metadata without revealing it
    Show {
        /// Message id
        id: String,
    },

    /// Reveal a message once; it is destroyed afterwards
    Reveal {
        /// Message id
        id: String,

        /// PIN (omit for an interactive prompt)
        #[arg(long)]
        pin: Option<String>,
    },

    /// List active messages created by an owner
    List {
        /// Owner to list messages for
        #[arg(short, long, env = "SECRETSHARE_OWNER")]
        owner: String,
    },

    /// Count active messages
    Count,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the project directory from `--dir`.
pub fn project_dir(cli: &Cli) -> Result<PathBuf> {
    let dir = PathBuf::from(&cli.dir);
    if dir.is_absolute() {
        Ok(dir)
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}

/// Load settings and apply command-line overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(&project_dir(cli)?)?;
    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }
    Ok(settings)
}

/// Build the message service for this invocation.
///
/// Settings, operator salt and backend are all resolved here, once.
pub fn open_service(cli: &Cli) -> Result<(MessageService, Settings)> {
    let settings = load_settings(cli)?;
    let salt = OperatorSalt::from_env()?;
    let repo = open_repository(&settings, &project_dir(cli)?)?;
    let service = MessageService::with_pin_params(repo, salt, settings.pin_hash_params())?;
    Ok((service, settings))
}

/// Get the PIN, trying in order:
/// 1. `SECRETSHARE_PIN` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the PIN is wiped from memory on drop.
pub fn prompt_pin() -> Result<Zeroizing<String>> {
    if let Ok(pin) = std::env::var(ENV_PIN) {
        if !pin.is_empty() {
            return Ok(Zeroizing::new(pin));
        }
    }

    let pin = dialoguer::Password::new()
        .with_prompt("Enter PIN")
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if is_pin_shaped(input) {
                Ok(())
            } else {
                Err("PIN must be 4 or 5 digits")
            }
        })
        .interact()
        .map_err(|e| SecretShareError::CommandFailed(format!("PIN prompt: {e}")))?;
    Ok(Zeroizing::new(pin))
}
