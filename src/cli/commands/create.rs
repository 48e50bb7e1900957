//! `secretshare create`: encrypt and store a secret, print its id and PIN.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::config::Backend;
use crate::errors::{Result, SecretShareError};
use crate::messages::CancelToken;

/// Execute the `create` command.
pub fn execute(cli: &Cli, text: Option<&str>, owner: &str) -> Result<()> {
    // Determine the secret text from one of three sources.
    let secret = if let Some(t) = text {
        // Source 1: Inline text on the command line.
        output::warning("Secret provided on command line; it may appear in shell history.");
        Zeroizing::new(t.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input.
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end().len();
        buf.truncate(trimmed);
        buf
    } else {
        // Source 3: Interactive hidden prompt.
        let entered = dialoguer::Password::new()
            .with_prompt("Secret to share")
            .interact()
            .map_err(|e| SecretShareError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(entered)
    };

    let (service, settings) = open_service(cli)?;
    let created = service.create(&secret, owner, &CancelToken::new())?;

    output::print_created(&created);

    if settings.backend == Backend::Memory {
        output::warning("Memory backend: this message is lost when the process exits.");
    }

    Ok(())
}
