//! unimail CLI
//!
//! Send email through Outlook 365 or Gmail from the command line.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

/// unimail: send email through Outlook 365 or Gmail.
#[derive(Parser, Debug)]
#[command(name = "unimail", version, about)]
struct Cli {
    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a message.
    Send(commands::send::SendArgs),
    /// Obtain provider credentials.
    Auth(commands::auth::AuthArgs),
    /// Print version information.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Send(args) => commands::send::run(&args, cli.format).await,
        Command::Auth(args) => commands::auth::run(&args).await,
        Command::Version => commands::version::run(cli.format),
    }
}
