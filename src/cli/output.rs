//! Terminal output for the CLI.
//!
//! Status lines carry a colored marker; errors and warnings go to stderr
//! so stdout stays clean for piping a revealed secret or a count.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::store::{CreatedMessage, MessageMetadata};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub fn success(msg: &str) {
    println!("{} {msg}", style("\u{2713}").green().bold());
}

pub fn error(msg: &str) {
    eprintln!("{} {msg}", style("\u{2717}").red().bold());
}

pub fn warning(msg: &str) {
    eprintln!("{} {msg}", style("\u{26a0}").yellow().bold());
}

pub fn info(msg: &str) {
    println!("{} {msg}", style("\u{2139}").blue().bold());
}

/// Dimmed hint shown after an empty result.
pub fn hint(msg: &str) {
    println!("  {}", style(msg).dim());
}

/// `label: value` on its own line.  Tests and scripts parse these.
fn field(label: &str, value: &str) {
    println!("{}: {value}", style(label).bold());
}

/// The id and PIN of a freshly created message.
pub fn print_created(created: &CreatedMessage) {
    success("Secret stored. Send the id and the PIN over separate channels.");
    field("id", &created.id);
    field("pin", &created.pin);
}

/// Everything `show` may reveal about a message.
pub fn print_metadata(meta: &MessageMetadata) {
    field("id", &meta.id);
    field("owner", &meta.owner);
    field("created", &meta.created_at.format(TIME_FORMAT).to_string());
    field("attempts left", &meta.attempts_remaining.to_string());
}

/// Table of an owner's active messages, oldest first.
pub fn print_messages_table(messages: &[MessageMetadata]) {
    if messages.is_empty() {
        info("No active messages.");
        hint("Create one with `secretshare create --owner <NAME>`.");
        return;
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Id", "Created", "Attempts left"]);

    for m in messages {
        table.add_row(vec![
            m.id.clone(),
            m.created_at.format(TIME_FORMAT).to_string(),
            m.attempts_remaining.to_string(),
        ]);
    }

    println!("{table}");
}
