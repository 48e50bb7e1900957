//! `secretshare list`: show active messages created by an owner.

use crate::cli::output;
use crate::cli::{open_service, Cli};
use crate::errors::Result;
use crate::messages::CancelToken;

/// Execute the `list` command.
pub fn execute(cli: &Cli, owner: &str) -> Result<()> {
    let (service, _) = open_service(cli)?;
    let messages = service.list(owner, &CancelToken::new())?;

    output::print_messages_table(&messages);
    Ok(())
}
