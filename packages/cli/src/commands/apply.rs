use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{patch, summary, Document};
use pagesmith_schema::PatchOperation;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Layout file to patch
    pub layout: PathBuf,

    /// JSON file holding an array of patch operations
    pub patch: PathBuf,

    /// Write the result here instead of overwriting the layout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Validate and apply without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let layout_path = Config::resolve(cwd, &args.layout);
    let patch_path = Config::resolve(cwd, &args.patch);

    let source = std::fs::read_to_string(&patch_path)
        .with_context(|| format!("Cannot read {}", patch_path.display()))?;
    let patches: Vec<PatchOperation> = serde_json::from_str(&source)
        .with_context(|| format!("{} is not a JSON Patch array", patch_path.display()))?;

    patch::validate(&patches)?;

    let mut document = Document::load(&layout_path)
        .with_context(|| format!("Cannot load {}", layout_path.display()))?;
    document.apply(&patches)?;

    println!(
        "  {} Applied {} operation(s): {}",
        "✓".green(),
        patches.len(),
        summary::describe_patches(&patches)
    );

    if args.dry_run {
        println!("{}", "Dry run, nothing written".yellow());
        return Ok(());
    }

    match args.out {
        Some(out) => {
            let out = Config::resolve(cwd, out);
            document.save_as(&out)?;
            println!("  {} Wrote {}", "✓".green(), out.display());
        }
        None => {
            document.save()?;
            println!("  {} Updated {}", "✓".green(), layout_path.display());
        }
    }

    Ok(())
}
