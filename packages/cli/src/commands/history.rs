use crate::config::Config;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use colored::Colorize;
use pagesmith_editor::{SessionSnapshot, VersionManager};
use pagesmith_schema::PageLayout;
use std::path::PathBuf;

/// Characters of a version id shown in listings and accepted by `:goto`
pub const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Saved session file (defaults to the configured session file)
    pub session: Option<PathBuf>,
}

pub fn history(args: HistoryArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = match args.session {
        Some(path) => Config::resolve(cwd, path),
        None => config.session_path(cwd),
    };

    let snapshot = SessionSnapshot::load(&path)
        .with_context(|| format!("Cannot read session {}", path.display()))?;
    let versions = VersionManager::restore(snapshot.versions, snapshot.cursor)?;

    print_history(&versions);
    Ok(())
}

pub fn print_history(versions: &VersionManager<PageLayout>) {
    for (index, version) in versions.history().iter().enumerate() {
        let current = index == versions.current_index();
        let marker = if current { "▶".green().bold() } else { " ".normal() };
        let when = DateTime::<Utc>::from_timestamp_millis(version.timestamp)
            .map(|time| time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let id = short_id(&version.id);

        let line = format!(
            "{marker} {index:>3}  {}  {when}  {}  ({} op)",
            id.bright_black(),
            version.message,
            version.patches.len()
        );
        if current {
            println!("{}", line.bold());
        } else {
            println!("{line}");
        }
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Full id of the version whose id starts with `prefix`, if exactly one does
pub fn resolve_version_id(versions: &VersionManager<PageLayout>, prefix: &str) -> Option<String> {
    let mut matches = versions
        .history()
        .iter()
        .filter(|version| version.id.starts_with(prefix));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_version_id() {
        let mut versions = VersionManager::new(PageLayout::default_template());
        versions.add_version(PageLayout::default_template(), "second", vec![]);
        let full = versions.history()[1].id.clone();

        assert_eq!(
            resolve_version_id(&versions, short_id(&full)),
            Some(full.clone())
        );
        assert_eq!(resolve_version_id(&versions, &full), Some(full));
        assert_eq!(resolve_version_id(&versions, ""), None);
        assert_eq!(resolve_version_id(&versions, "zz"), None);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }
}
