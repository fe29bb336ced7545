mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, chat, diff, history, init, pages, publish, ApplyArgs, ChatArgs, DiffArgs, HistoryArgs,
    InitArgs, PagesArgs, PublishArgs,
};
use tracing_subscriber::EnvFilter;

/// Pagesmith CLI - edit landing pages by describing the change
#[derive(Parser, Debug)]
#[command(name = "pagesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a starter layout
    Init(InitArgs),

    /// Edit a layout interactively
    Chat(ChatArgs),

    /// Apply a JSON Patch file to a layout
    Apply(ApplyArgs),

    /// Print the JSON Patch that turns one layout into another
    Diff(DiffArgs),

    /// List the versions of a saved chat session
    History(HistoryArgs),

    /// Publish a layout as a new page
    Publish(PublishArgs),

    /// List published pages
    Pages(PagesArgs),
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagesmith=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()
        .context("Cannot get current directory")?
        .display()
        .to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Chat(args) => chat(args, &cwd).await,
        Command::Apply(args) => apply(args, &cwd),
        Command::Diff(args) => diff(args, &cwd),
        Command::History(args) => history(args, &cwd),
        Command::Publish(args) => publish(args, &cwd),
        Command::Pages(args) => pages(args, &cwd),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
