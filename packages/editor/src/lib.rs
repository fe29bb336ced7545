//! # Pagesmith Editor
//!
//! Patch-based editing and version history for landing pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ translator: instruction → patch batch       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - patch: validate / apply / optimize       │
//! │  - diff: layout → layout patch              │
//! │  - schema check of every result             │
//! │  - history: linear versions with a cursor   │
//! │  - session: transcript + state machine      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ publish: final layout → page store          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Batches are atomic**: a patch batch applies fully or not at all
//! 2. **The schema gates every mutation**: patched JSON must read back as a
//!    `PageLayout`
//! 3. **History is linear**: committing after a rollback discards the redo
//!    branch
//! 4. **Failures are replies**: a failed instruction becomes an assistant
//!    message and leaves the page as it was
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagesmith_editor::EditSession;
//! use pagesmith_schema::{BrandConfig, PageLayout};
//! use pagesmith_translator::RuleBasedTranslator;
//! use std::sync::Arc;
//!
//! let mut session = EditSession::new(
//!     PageLayout::default_template(),
//!     Arc::new(RuleBasedTranslator::new()),
//!     BrandConfig::default(),
//! );
//!
//! let report = session.submit("make the headline catchier").await?;
//! println!("{}", report.reply.content);
//!
//! session.rollback()?;
//! ```

pub mod diff;
mod document;
mod errors;
mod handle;
pub mod history;
pub mod patch;
pub mod pointer;
mod session;
pub mod summary;

pub use document::{apply_to_layout, Document, DocumentStorage};
pub use errors::{EditorError, EditorResult};
pub use handle::SessionHandle;
pub use history::{HistoryError, PageVersion, VersionManager};
pub use patch::{ApplyError, ApplyFault, ValidationError};
pub use pointer::{JsonPointer, PointerError};
pub use session::{
    CompletedTranslation, EditSession, PendingSubmit, SessionSnapshot, SessionState,
    SubmitOutcome, SubmitReport,
};
