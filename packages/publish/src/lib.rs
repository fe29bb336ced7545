//! # Pagesmith Publish
//!
//! Hand-off of a finished layout to wherever pages are served from.
//!
//! ```text
//! <root>/
//! └── <name>/
//!     ├── layout.json      the page document
//!     └── page-info.json   { name, title, createdAt }
//! ```
//!
//! Rendering the layout to HTML is the page renderer's job; a publisher only
//! stores the document and the listing metadata.

mod error;
mod file;

pub use error::{PublishError, PublishResult};
pub use file::{FilePublisher, LAYOUT_FILE, PAGE_INFO_FILE};

use chrono::{DateTime, Utc};
use pagesmith_schema::PageLayout;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

const PAGE_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_-]{1,29}$";

/// Letter first, then 1 to 29 letters, digits, `-` or `_`
pub fn validate_page_name(name: &str) -> PublishResult<()> {
    static PAGE_NAME: OnceLock<Regex> = OnceLock::new();
    let pattern = PAGE_NAME
        .get_or_init(|| Regex::new(PAGE_NAME_PATTERN).expect("page name pattern is valid"));

    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(PublishError::InvalidName(name.to_string()))
    }
}

/// Contents of `page-info.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub name: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful publish
#[derive(Debug, Clone)]
pub struct PublishedPage {
    pub info: PageInfo,

    /// Path the page is served under, e.g. `/summer-sale`
    pub url: String,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// One entry of a page listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub name: String,
    pub url: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
}

pub trait Publisher {
    /// Store `layout` as a new page; an existing page is never overwritten
    fn publish(&self, name: &str, layout: &PageLayout) -> PublishResult<PublishedPage>;

    /// Published pages, newest first, undated ones last
    fn list(&self) -> PublishResult<Vec<PageSummary>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_page_names() {
        for name in ["ab", "summer-sale", "Page_2024", "a23456789012345678901234567890"] {
            assert!(validate_page_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_invalid_page_names() {
        for name in [
            "",
            "a",
            "1page",
            "-page",
            "my page",
            "page/../../etc",
            "ab.html",
            "a2345678901234567890123456789012",
        ] {
            assert!(
                matches!(validate_page_name(name), Err(PublishError::InvalidName(_))),
                "{name}"
            );
        }
    }
}
