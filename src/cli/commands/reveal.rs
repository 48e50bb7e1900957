//! `secretshare reveal`: decrypt a message once and destroy it.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_service, prompt_pin, Cli};
use crate::errors::{Result, SecretShareError};
use crate::messages::CancelToken;

/// Execute the `reveal` command.
pub fn execute(cli: &Cli, id: &str, pin: Option<&str>) -> Result<()> {
    let (service, _) = open_service(cli)?;

    let pin = match pin {
        Some(p) => {
            output::warning("PIN provided on command line; it may appear in shell history.");
            Zeroizing::new(p.to_string())
        }
        None => prompt_pin()?,
    };

    match service.reveal(id, &pin, &CancelToken::new()) {
        Ok(revealed) => {
            // Plain stdout so the secret can be piped.
            println!("{}", revealed.content.as_str());
            Ok(())
        }
        // Missing, already revealed and wrong PIN all look the same.
        Err(e) if e.is_reveal_denial() => Err(SecretShareError::CommandFailed(
            "Could not retrieve secret: it does not exist or the PIN is wrong".into(),
        )),
        Err(e) => Err(e),
    }
}
