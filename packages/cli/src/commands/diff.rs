use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use pagesmith_editor::{diff as layout_diff, Document};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Original layout
    pub old: PathBuf,

    /// Edited layout
    pub new: PathBuf,

    /// Print on one line
    #[arg(long)]
    pub compact: bool,
}

pub fn diff(args: DiffArgs, cwd: &str) -> Result<()> {
    let load = |path: &PathBuf| -> Result<serde_json::Value> {
        let path = Config::resolve(cwd, path);
        let document =
            Document::load(&path).with_context(|| format!("Cannot load {}", path.display()))?;
        Ok(document.layout().to_value()?)
    };

    let patches = layout_diff::diff(&load(&args.old)?, &load(&args.new)?);

    let output = if args.compact {
        serde_json::to_string(&patches)?
    } else {
        serde_json::to_string_pretty(&patches)?
    };
    println!("{output}");

    Ok(())
}
