use crate::{
    validate_page_name, PageInfo, PageSummary, PublishError, PublishResult, PublishedPage,
    Publisher,
};
use chrono::Utc;
use pagesmith_schema::PageLayout;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const LAYOUT_FILE: &str = "layout.json";
pub const PAGE_INFO_FILE: &str = "page-info.json";

/// Publishes into one directory per page under `root`
#[derive(Debug, Clone)]
pub struct FilePublisher {
    root: PathBuf,
}

impl FilePublisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_summary(&self, name: &str, dir: &Path) -> PageSummary {
        let info = std::fs::read_to_string(dir.join(PAGE_INFO_FILE))
            .map_err(PublishError::from)
            .and_then(|source| Ok(serde_json::from_str::<PageInfo>(&source)?));

        let (title, created_at) = match info {
            Ok(info) => (info.title, Some(info.created_at)),
            Err(err) => {
                warn!(page = name, error = %err, "Could not read page info");
                (name.to_string(), None)
            }
        };

        PageSummary {
            name: name.to_string(),
            url: format!("/{name}"),
            title,
            created_at,
        }
    }
}

/// Write a page's files into its new directory, removing the directory
/// again if any write fails so a retry is not refused as a conflict
fn fill_page_dir(
    name: &str,
    dir: &Path,
    layout: &PageLayout,
    info: &PageInfo,
) -> PublishResult<Vec<PathBuf>> {
    let written = write_page_files(dir, layout, info);
    if written.is_err() {
        if let Err(err) = std::fs::remove_dir_all(dir) {
            warn!(page = name, error = %err, "Could not remove partial page");
        }
    }
    written
}

fn write_page_files(dir: &Path, layout: &PageLayout, info: &PageInfo) -> PublishResult<Vec<PathBuf>> {
    let layout_path = dir.join(LAYOUT_FILE);
    std::fs::write(&layout_path, layout.to_json_pretty()?)?;
    let info_path = dir.join(PAGE_INFO_FILE);
    std::fs::write(&info_path, serde_json::to_string_pretty(info)?)?;
    Ok(vec![layout_path, info_path])
}

impl Publisher for FilePublisher {
    fn publish(&self, name: &str, layout: &PageLayout) -> PublishResult<PublishedPage> {
        validate_page_name(name)?;
        layout.validate()?;

        std::fs::create_dir_all(&self.root)?;
        let dir = self.root.join(name);
        // create_dir fails on an existing directory, which is the conflict check
        match std::fs::create_dir(&dir) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(PublishError::Conflict(name.to_string()))
            }
            Err(err) => return Err(err.into()),
        }

        let info = PageInfo {
            name: name.to_string(),
            title: layout.title().to_string(),
            created_at: Utc::now(),
        };

        let files = fill_page_dir(name, &dir, layout, &info)?;

        info!(page = name, dir = %dir.display(), "Published page");

        Ok(PublishedPage {
            url: format!("/{name}"),
            info,
            dir,
            files,
        })
    }

    fn list(&self) -> PublishResult<Vec<PageSummary>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry?;
            let dir = entry.path();
            if !dir.is_dir() || !dir.join(LAYOUT_FILE).is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            pages.push(self.read_summary(&name, &dir));
        }

        // newest first; undated pages last
        pages.sort_by(|a, b| match (&a.created_at, &b.created_at) {
            (Some(a_time), Some(b_time)) => b_time.cmp(a_time),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });
        Ok(pages)
    }
}
