//! `secretshare count`: print the number of active messages.

use crate::cli::{open_service, Cli};
use crate::errors::Result;
use crate::messages::CancelToken;

/// Execute the `count` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (service, _) = open_service(cli)?;
    println!("{}", service.count(&CancelToken::new())?);
    Ok(())
}
