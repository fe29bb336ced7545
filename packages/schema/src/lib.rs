//! # Pagesmith Schema
//!
//! Shared data model for the landing-page editor.
//!
//! - [`PageLayout`]: the edited document (hero, selling points, FAQ, ...)
//! - [`PatchOperation`]: one RFC 6902 JSON Patch operation
//! - [`ChatMessage`]: one entry of the edit transcript
//! - [`BrandConfig`]: tone and vocabulary constraints handed to the translator
//!
//! Everything here is plain serde data. A [`PageLayout`] that passes
//! [`PageLayout::from_value`] round-trips through JSON without loss, which is
//! what lets the editor patch it as a `serde_json::Value` and re-check the
//! result against the typed schema afterwards.

pub mod brand;
pub mod chat;
pub mod error;
pub mod layout;
pub mod patch;

pub use brand::{BrandColors, BrandConfig, Tone};
pub use chat::{ChatMessage, Role};
pub use error::{SchemaError, SchemaResult};
pub use layout::{
    FaqItem, Hero, HeroImage, Offer, PageLayout, Reference, Science, SpecEntry, Tip, Usp,
};
pub use patch::{PatchOp, PatchOperation};

/// Milliseconds since the Unix epoch, the timestamp unit used on the wire.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
