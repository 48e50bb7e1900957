//! One module per subcommand.  Each exposes `execute(...) -> Result<()>`.

pub mod count;
pub mod create;
pub mod list;
pub mod reveal;
pub mod show;
