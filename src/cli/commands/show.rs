//! `secretshare show`: print a message's metadata without revealing it.

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::errors::Result;
use crate::messages::CancelToken;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let (service, _) = open_service(cli)?;
    let meta = service.metadata(id, &CancelToken::new())?;

    output::print_metadata(&meta);
    Ok(())
}
