//! # Document Handle
//!
//! A page layout plus where it lives.
//!
//! Documents can be:
//! - **Memory-backed**: built in code, e.g. from the default template
//! - **File-backed**: loaded from a `layout.json`, saved back on request
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Validate → Patch → Schema check → Save
//!   ↓        ↓         ↓          ↓          ↓
//! File   PageLayout  Value    PageLayout   File
//! ```

use crate::pointer::JsonPointer;
use crate::{patch, EditorError, EditorResult};
use pagesmith_schema::{PageLayout, PatchOperation, SchemaError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Apply a batch to a layout and check the result against the schema
///
/// The layout is patched as JSON, so a batch may pass through shapes the
/// schema forbids as long as where it ends up is valid. The result must
/// also serialize back to exactly the patched JSON: a `null` written to an
/// optional field would otherwise vanish, and replaying the batch on the
/// previous version would no longer reproduce the stored layout. On any
/// failure the input layout is all there is.
pub fn apply_to_layout(layout: &PageLayout, patches: &[PatchOperation]) -> EditorResult<PageLayout> {
    let document = layout.to_value()?;
    let patched = patch::apply(&document, patches)?;
    let result = PageLayout::from_value(patched.clone())?;

    let stored = result.to_value()?;
    if let Some(path) = first_difference(&JsonPointer::root(), &patched, &stored) {
        return Err(SchemaError::not_representable(path.to_string()).into());
    }
    Ok(result)
}

/// Pointer to the first place `a` and `b` disagree
fn first_difference(path: &JsonPointer, a: &Value, b: &Value) -> Option<JsonPointer> {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            for (key, value) in left {
                let child = path.child(key.as_str());
                match right.get(key) {
                    Some(other) => {
                        if let Some(found) = first_difference(&child, value, other) {
                            return Some(found);
                        }
                    }
                    None => return Some(child),
                }
            }
            right
                .keys()
                .find(|key| !left.contains_key(*key))
                .map(|key| path.child(key.as_str()))
        }
        (Value::Array(left), Value::Array(right)) if left.len() == right.len() => left
            .iter()
            .zip(right)
            .enumerate()
            .find_map(|(index, (x, y))| first_difference(&path.child(index.to_string()), x, y)),
        _ if a == b => None,
        _ => Some(path.clone()),
    }
}

/// Editable page layout
#[derive(Debug)]
pub struct Document {
    /// Incremented on each successful apply
    pub version: u64,

    storage: DocumentStorage,
}

#[derive(Debug)]
pub enum DocumentStorage {
    Memory {
        layout: PageLayout,
    },

    File {
        path: PathBuf,
        layout: PageLayout,
        dirty: bool,
    },
}

impl Document {
    /// Memory-backed document
    pub fn from_layout(layout: PageLayout) -> Self {
        Self {
            version: 0,
            storage: DocumentStorage::Memory { layout },
        }
    }

    /// Load and validate a layout file
    pub fn load(path: impl Into<PathBuf>) -> EditorResult<Self> {
        let path = path.into();
        let source = std::fs::read_to_string(&path)?;
        let layout = PageLayout::from_json(&source)?;
        debug!(path = %path.display(), "Loaded layout");

        Ok(Self {
            version: 0,
            storage: DocumentStorage::File {
                path,
                layout,
                dirty: false,
            },
        })
    }

    pub fn layout(&self) -> &PageLayout {
        match &self.storage {
            DocumentStorage::Memory { layout } | DocumentStorage::File { layout, .. } => layout,
        }
    }

    pub fn into_layout(self) -> PageLayout {
        match self.storage {
            DocumentStorage::Memory { layout } | DocumentStorage::File { layout, .. } => layout,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            DocumentStorage::File { path, .. } => Some(path),
            DocumentStorage::Memory { .. } => None,
        }
    }

    /// Apply a patch batch atomically, returning the new version number
    pub fn apply(&mut self, patches: &[PatchOperation]) -> EditorResult<u64> {
        let next = apply_to_layout(self.layout(), patches)?;

        match &mut self.storage {
            DocumentStorage::Memory { layout } => *layout = next,
            DocumentStorage::File { layout, dirty, .. } => {
                *layout = next;
                *dirty = true;
            }
        }
        self.version += 1;
        Ok(self.version)
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> EditorResult<()> {
        match &mut self.storage {
            DocumentStorage::File {
                path,
                layout,
                dirty,
            } => {
                write_layout(path, layout)?;
                *dirty = false;
                Ok(())
            }
            DocumentStorage::Memory { .. } => Err(EditorError::NotFileBacked),
        }
    }

    /// Write to `path` and make the document file-backed there
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> EditorResult<()> {
        let path = path.into();
        write_layout(&path, self.layout())?;

        if let DocumentStorage::File {
            path: current,
            dirty,
            ..
        } = &mut self.storage
        {
            *current = path;
            *dirty = false;
            return Ok(());
        }

        self.storage = DocumentStorage::File {
            path,
            layout: self.layout().clone(),
            dirty: false,
        };
        Ok(())
    }
}

fn write_layout(path: &Path, layout: &PageLayout) -> EditorResult<()> {
    let mut json = layout.to_json_pretty()?;
    json.push('\n');
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Saved layout");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_document() {
        let mut doc = Document::from_layout(PageLayout::default_template());

        assert_eq!(doc.version, 0);
        assert!(!doc.is_dirty());
        assert!(doc.path().is_none());
        assert!(matches!(doc.save(), Err(EditorError::NotFileBacked)));
    }

    #[test]
    fn test_apply_increments_version_only_on_success() {
        let mut doc = Document::from_layout(PageLayout::default_template());

        let version = doc
            .apply(&[PatchOperation::replace("/hero/cta", json!("Buy now"))])
            .unwrap();
        assert_eq!(version, 1);
        assert_eq!(doc.layout().hero.cta, "Buy now");

        let err = doc.apply(&[PatchOperation::remove("/hero/nope")]).unwrap_err();
        assert!(matches!(err, EditorError::Apply(_)));
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_schema_violation_rejects_batch() {
        let layout = PageLayout::default_template();

        let err = apply_to_layout(
            &layout,
            &[
                PatchOperation::replace("/hero/cta", json!("Changed")),
                PatchOperation::remove("/hero/headline"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::Schema(_)));

        let err = apply_to_layout(&layout, &[PatchOperation::add("/bogus", json!(1))]).unwrap_err();
        assert!(matches!(err, EditorError::Schema(_)));

        let err = apply_to_layout(&layout, &[PatchOperation::add("/hero/ctaColor", json!("#12"))])
            .unwrap_err();
        assert!(matches!(err, EditorError::Schema(_)));
    }

    #[test]
    fn test_null_optional_field_is_rejected() {
        let mut layout = PageLayout::default_template();
        layout.hero.cta_color = Some("#ff6600".to_string());

        for patches in [
            vec![PatchOperation::add("/hero/ctaColor", json!(null))],
            vec![PatchOperation::replace("/hero/ctaColor", json!(null))],
            vec![PatchOperation::add("/offer", json!(null))],
        ] {
            let err = apply_to_layout(&layout, &patches).unwrap_err();
            assert!(
                matches!(
                    &err,
                    EditorError::Schema(SchemaError::NotRepresentable { path })
                        if *path == patches[0].path
                ),
                "{err}"
            );
        }

        let cleared =
            apply_to_layout(&layout, &[PatchOperation::remove("/hero/ctaColor")]).unwrap();
        assert_eq!(cleared.hero.cta_color, None);
    }

    #[test]
    fn test_stored_layout_matches_patched_json() {
        let layout = PageLayout::default_template();
        let patches = vec![
            PatchOperation::add("/hero/ctaColor", json!("#00aa00")),
            PatchOperation::replace("/hero/cta", json!("Order today")),
        ];

        let result = apply_to_layout(&layout, &patches).unwrap();

        let replayed = patch::apply(&layout.to_value().unwrap(), &patches).unwrap();
        assert_eq!(result.to_value().unwrap(), replayed);
    }

    #[test]
    fn test_save_as_retargets_file_document() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");

        let mut doc = Document::from_layout(PageLayout::default_template());
        doc.save_as(&first).unwrap();
        doc.apply(&[PatchOperation::replace("/hero/headline", json!("Moved"))])
            .unwrap();
        assert!(doc.is_dirty());

        doc.save_as(&second).unwrap();

        assert_eq!(doc.path(), Some(second.as_path()));
        assert!(!doc.is_dirty());
        assert_eq!(doc.layout().hero.headline, "Moved");
        assert_eq!(Document::load(&second).unwrap().layout().hero.headline, "Moved");
        assert_ne!(Document::load(&first).unwrap().layout().hero.headline, "Moved");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");

        let mut doc = Document::from_layout(PageLayout::default_template());
        doc.save_as(&path).unwrap();
        assert_eq!(doc.path(), Some(path.as_path()));

        doc.apply(&[PatchOperation::replace("/hero/headline", json!("Saved"))])
            .unwrap();
        assert!(doc.is_dirty());
        doc.save().unwrap();
        assert!(!doc.is_dirty());

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.layout().hero.headline, "Saved");
        assert_eq!(loaded.into_layout(), doc.into_layout());
    }

    #[test]
    fn test_load_rejects_invalid_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, r#"{"hero":{"headline":"x"},"usps":[]}"#).unwrap();

        assert!(matches!(Document::load(&path), Err(EditorError::Schema(_))));
        assert!(matches!(
            Document::load(dir.path().join("missing.json")),
            Err(EditorError::Io(_))
        ));
    }
}
