//! # Pagesmith Translator
//!
//! Turns a free-text editing instruction plus the current page into a JSON
//! Patch batch.
//!
//! ## Strategies
//!
//! ```text
//!                    ┌────────────────────────┐
//!  instruction ───▶  │ dyn Translator         │ ───▶ TranslationOutcome
//!  + PageLayout      ├────────────────────────┤      (Patches | NoChanges)
//!                    │ RemoteTranslator       │  LLM over HTTP
//!                    │ RuleBasedTranslator    │  keyword table, offline
//!                    │ FallbackTranslator     │  primary, then fallback on error
//!                    └────────────────────────┘
//! ```
//!
//! A translator never turns "nothing to do" into an error: it returns
//! [`TranslationOutcome::NoChanges`] and leaves the wording of the reply to the
//! edit session. Errors are reserved for configuration, transport and parse
//! failures, and no translator falls back to another on its own; that is what
//! [`FallbackTranslator`] is for, and a caller has to ask for it.

mod config;
mod error;
mod fallback;
pub mod prompt;
mod remote;
pub mod response;
mod rules;

pub use config::{api_key_from_env, build_translator, Strategy, TranslatorConfig, API_KEY_ENV_VARS};
pub use error::{TranslateError, TranslateResult};
pub use fallback::FallbackTranslator;
pub use remote::{
    AuthScheme, RemoteOptions, RemoteTranslator, ANTHROPIC_VERSION, DEFAULT_ENDPOINT,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
pub use rules::RuleBasedTranslator;

use async_trait::async_trait;
use pagesmith_schema::{BrandConfig, PageLayout, PatchOperation};

/// Everything a translator may look at
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub instruction: String,
    pub layout: PageLayout,
    pub brand: BrandConfig,
}

impl TranslationRequest {
    pub fn new(instruction: impl Into<String>, layout: PageLayout, brand: BrandConfig) -> Self {
        Self {
            instruction: instruction.into(),
            layout,
            brand,
        }
    }
}

/// Result of a successful translation
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// A non-empty patch batch
    Patches(Vec<PatchOperation>),

    /// The instruction did not map to any change
    NoChanges,
}

impl TranslationOutcome {
    pub fn from_patches(patches: Vec<PatchOperation>) -> Self {
        if patches.is_empty() {
            TranslationOutcome::NoChanges
        } else {
            TranslationOutcome::Patches(patches)
        }
    }

    pub fn patches(&self) -> &[PatchOperation] {
        match self {
            TranslationOutcome::Patches(patches) => patches,
            TranslationOutcome::NoChanges => &[],
        }
    }

    pub fn into_patches(self) -> Vec<PatchOperation> {
        match self {
            TranslationOutcome::Patches(patches) => patches,
            TranslationOutcome::NoChanges => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TranslationOutcome::NoChanges)
    }
}

/// Strategy interface, selected once when an edit session is built
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short name for logs and status lines
    fn name(&self) -> &'static str;

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationOutcome>;
}
