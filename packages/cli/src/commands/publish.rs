use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::Document;
use pagesmith_publish::{FilePublisher, Publisher};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Layout to publish (defaults to the configured layout)
    pub layout: Option<PathBuf>,

    /// Page name: a letter, then 1 to 29 letters, digits, `-` or `_`
    #[arg(short, long)]
    pub name: String,

    /// Publish root (defaults to the configured one)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PagesArgs {
    /// Publish root (defaults to the configured one)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

fn publisher(config: &Config, root: Option<PathBuf>, cwd: &str) -> FilePublisher {
    let root = match root {
        Some(root) => Config::resolve(cwd, root),
        None => config.publish_root(cwd),
    };
    FilePublisher::new(root)
}

pub fn publish(args: PublishArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let layout_path = match &args.layout {
        Some(path) => Config::resolve(cwd, path),
        None => config.layout_path(cwd),
    };

    let document = Document::load(&layout_path)
        .with_context(|| format!("Cannot load {}", layout_path.display()))?;
    let publisher = publisher(&config, args.root, cwd);

    let page = publisher.publish(&args.name, document.layout())?;

    println!(
        "{} Published {} at {}",
        "✅".green(),
        page.info.title.bright_white(),
        page.url.cyan()
    );
    for file in &page.files {
        println!("  {} {}", "✓".green(), file.display());
    }

    Ok(())
}

pub fn pages(args: PagesArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let publisher = publisher(&config, args.root, cwd);

    let pages = publisher.list()?;
    if pages.is_empty() {
        println!(
            "{} No pages published under {}",
            "ℹ".blue(),
            publisher.root().display()
        );
        return Ok(());
    }

    for page in pages {
        let created = page
            .created_at
            .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:<16} {}",
            page.url.cyan(),
            created.bright_black(),
            page.title
        );
    }

    Ok(())
}
