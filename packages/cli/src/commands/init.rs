use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagesmith_editor::Document;
use pagesmith_schema::PageLayout;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing config and layout
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagesmith project...".bright_blue().bold());

    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json + "\n")?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let layout_path = config.layout_path(cwd);
    if !layout_path.exists() || args.force {
        Document::from_layout(PageLayout::default_template()).save_as(&layout_path)?;
        println!("  {} Created {}", "✓".green(), config.layout);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Set PAGESMITH_API_KEY (or ANTHROPIC_API_KEY) to use the language model");
    println!("  2. Run: pagesmith chat");
    println!("  3. Run: pagesmith publish --name my-page");

    Ok(())
}
