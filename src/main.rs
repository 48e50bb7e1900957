use clap::Parser;
use secretshare::cli::{commands, output, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SECRETSHARE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create {
            ref text,
            ref owner,
        } => commands::create::execute(&cli, text.as_deref(), owner),
        Commands::Show { ref id } => commands::show::execute(&cli, id),
        Commands::Reveal { ref id, ref pin } => {
            commands::reveal::execute(&cli, id, pin.as_deref())
        }
        Commands::List { ref owner } => commands::list::execute(&cli, owner),
        Commands::Count => commands::count::execute(&cli),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
