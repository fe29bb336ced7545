//! # Edit Session
//!
//! One chat-driven editing conversation over one page.
//!
//! The session owns the version history (whose cursor version is the
//! current layout), the transcript and the translator chosen when it was
//! built.
//!
//! ```text
//!            begin_submit                 finish_submit
//!   Idle ──────────────────▶ Awaiting ──────────────────▶ Idle
//!            user message     Translation   reply message
//!                                           (+ version when applied)
//! ```
//!
//! `submit` runs both halves back to back. They are separate so that a
//! shared handle can drop its lock while the translator is out on the
//! network; a second instruction arriving meanwhile is refused with
//! [`EditorError::Busy`].
//!
//! A [`PendingSubmit`] (or the future running it) that is dropped before
//! `finish_submit` releases the session: it is idle again at once, and the
//! next mutating call records a "cancelled" reply for the orphaned user
//! message.

use crate::document::apply_to_layout;
use crate::history::{PageVersion, VersionManager};
use crate::summary::{describe_patches, written_text};
use crate::{diff, patch, EditorError, EditorResult};
use pagesmith_schema::{BrandConfig, ChatMessage, PageLayout, PatchOperation};
use pagesmith_translator::{
    TranslateResult, TranslationOutcome, TranslationRequest, Translator,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Weak};
use tracing::{info, warn};
use uuid::Uuid;

const CLARIFICATION: &str = "I couldn't turn that into a change to the page. Try naming the part \
you want to edit, for example \"make the headline more exciting\" or \"add an eco-friendly \
selling point\".";

const CANCELLED: &str = "That request was cancelled before it finished. The page is unchanged.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingTranslation,
}

/// What became of one instruction
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Patches were applied and recorded as a new version
    Applied {
        version_id: String,
        patches: Vec<PatchOperation>,
    },

    /// The translator found nothing to change
    NoChanges,

    /// Translation or application failed; nothing changed
    Failed(EditorError),
}

#[derive(Debug)]
pub struct SubmitReport {
    pub outcome: SubmitOutcome,

    /// The assistant message appended to the transcript
    pub reply: ChatMessage,
}

/// A translation that has been started but not yet run
pub struct PendingSubmit {
    ticket: Arc<()>,
    translator: Arc<dyn Translator>,
    request: TranslationRequest,
}

impl PendingSubmit {
    pub fn instruction(&self) -> &str {
        &self.request.instruction
    }

    /// Run the translator; the session is not borrowed meanwhile
    pub async fn run(self) -> CompletedTranslation {
        let result = self.translator.translate(&self.request).await;
        CompletedTranslation {
            ticket: self.ticket,
            translator: self.translator.name(),
            result,
        }
    }
}

pub struct CompletedTranslation {
    ticket: Arc<()>,
    translator: &'static str,
    result: TranslateResult<TranslationOutcome>,
}

/// Serializable state of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub cursor: usize,
    pub versions: Vec<PageVersion<PageLayout>>,
    pub messages: Vec<ChatMessage>,
}

impl SessionSnapshot {
    pub fn load(path: &Path) -> EditorResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&source)?)
    }

    pub fn save(&self, path: &Path) -> EditorResult<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }
}

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    history: VersionManager<PageLayout>,
    messages: Vec<ChatMessage>,
    translator: Arc<dyn Translator>,
    brand: BrandConfig,
    state: SessionState,

    /// Ticket of the outstanding translation; dead once it is dropped
    in_flight: Weak<()>,
}

impl EditSession {
    pub fn new(layout: PageLayout, translator: Arc<dyn Translator>, brand: BrandConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            history: VersionManager::new(layout),
            messages: Vec::new(),
            translator,
            brand,
            state: SessionState::Idle,
            in_flight: Weak::new(),
        }
    }

    /// Resume from a snapshot, re-checking every recorded layout
    pub fn restore(
        snapshot: SessionSnapshot,
        translator: Arc<dyn Translator>,
        brand: BrandConfig,
    ) -> EditorResult<Self> {
        for version in &snapshot.versions {
            version.layout.validate()?;
        }
        let history = VersionManager::restore(snapshot.versions, snapshot.cursor)?;

        Ok(Self {
            id: snapshot.id,
            history,
            messages: snapshot.messages,
            translator,
            brand,
            state: SessionState::Idle,
            in_flight: Weak::new(),
        })
    }

    /// Keep at most `limit` versions (0 = unlimited)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history.set_max_versions(limit);
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            cursor: self.history.current_index(),
            versions: self.history.history().to_vec(),
            messages: self.messages.clone(),
        }
    }

    pub fn layout(&self) -> &PageLayout {
        self.history.current_layout()
    }

    pub fn history(&self) -> &VersionManager<PageLayout> {
        &self.history
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn brand(&self) -> &BrandConfig {
        &self.brand
    }

    pub fn translator_name(&self) -> &'static str {
        self.translator.name()
    }

    pub fn state(&self) -> SessionState {
        if self.is_busy() {
            SessionState::AwaitingTranslation
        } else {
            SessionState::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state == SessionState::AwaitingTranslation && self.in_flight.strong_count() > 0
    }

    /// Abandon the outstanding translation, if any
    ///
    /// Its user message gets a "cancelled" reply; a late `finish_submit` for
    /// it is refused with [`EditorError::NotAwaiting`].
    pub fn cancel_submit(&mut self) -> bool {
        if self.state != SessionState::AwaitingTranslation {
            return false;
        }
        self.state = SessionState::Idle;
        self.in_flight = Weak::new();
        warn!(session = %self.id, "Translation cancelled");
        self.messages.push(ChatMessage::assistant(CANCELLED));
        true
    }

    // a dropped PendingSubmit leaves `state` behind with a dead ticket
    fn reap_abandoned(&mut self) {
        if self.state == SessionState::AwaitingTranslation && self.in_flight.strong_count() == 0 {
            self.cancel_submit();
        }
    }

    fn ensure_idle(&mut self) -> EditorResult<()> {
        self.reap_abandoned();
        if self.is_busy() {
            Err(EditorError::Busy)
        } else {
            Ok(())
        }
    }

    /// Translate, apply and record one instruction
    pub async fn submit(&mut self, text: &str) -> EditorResult<SubmitReport> {
        let pending = self.begin_submit(text)?;
        let completed = pending.run().await;
        self.finish_submit(completed)
    }

    /// Record the user message and hand out the translation to run
    pub fn begin_submit(&mut self, text: &str) -> EditorResult<PendingSubmit> {
        self.ensure_idle()?;
        let instruction = text.trim();
        if instruction.is_empty() {
            return Err(EditorError::EmptyInstruction);
        }

        self.messages.push(ChatMessage::user(instruction));
        let ticket = Arc::new(());
        self.in_flight = Arc::downgrade(&ticket);
        self.state = SessionState::AwaitingTranslation;

        Ok(PendingSubmit {
            ticket,
            translator: self.translator.clone(),
            request: TranslationRequest::new(instruction, self.layout().clone(), self.brand.clone()),
        })
    }

    /// Turn a finished translation into a version and/or a reply
    pub fn finish_submit(&mut self, completed: CompletedTranslation) -> EditorResult<SubmitReport> {
        let current = self
            .in_flight
            .upgrade()
            .is_some_and(|ticket| Arc::ptr_eq(&ticket, &completed.ticket));
        if self.state != SessionState::AwaitingTranslation || !current {
            return Err(EditorError::NotAwaiting);
        }
        self.state = SessionState::Idle;
        self.in_flight = Weak::new();

        let outcome = match completed.result {
            Ok(TranslationOutcome::Patches(patches)) => match self.commit(patches, None) {
                Ok((version_id, patches)) => SubmitOutcome::Applied {
                    version_id,
                    patches,
                },
                Err(err) => SubmitOutcome::Failed(err),
            },
            Ok(TranslationOutcome::NoChanges) => SubmitOutcome::NoChanges,
            Err(err) => SubmitOutcome::Failed(err.into()),
        };

        let reply = match &outcome {
            SubmitOutcome::Applied { patches, .. } => {
                ChatMessage::assistant_with_patches(self.applied_reply(patches), patches.clone())
            }
            SubmitOutcome::NoChanges => ChatMessage::assistant(CLARIFICATION),
            SubmitOutcome::Failed(err) => {
                warn!(
                    session = %self.id,
                    translator = completed.translator,
                    error = %err,
                    "Instruction failed"
                );
                ChatMessage::assistant(format!(
                    "Sorry, that didn't work: {err}. The page is unchanged."
                ))
            }
        };
        self.messages.push(reply.clone());

        Ok(SubmitReport { outcome, reply })
    }

    /// Apply a patch batch directly, bypassing the translator
    pub fn apply_patches(
        &mut self,
        patches: Vec<PatchOperation>,
        message: Option<&str>,
    ) -> EditorResult<String> {
        self.ensure_idle()?;
        let (version_id, patches) = self.commit(patches, message)?;
        let reply = self.applied_reply(&patches);
        self.messages
            .push(ChatMessage::assistant_with_patches(reply, patches));
        Ok(version_id)
    }

    /// Replace the layout wholesale, recording the difference as the patch
    ///
    /// Returns `None` when the new layout equals the current one.
    pub fn apply_manual_edit(
        &mut self,
        layout: PageLayout,
        message: Option<&str>,
    ) -> EditorResult<Option<String>> {
        self.ensure_idle()?;
        layout.validate()?;

        let patches = diff::diff(&self.layout().to_value()?, &layout.to_value()?);
        if patches.is_empty() {
            return Ok(None);
        }
        let message = message.unwrap_or("Manual edit");
        self.apply_patches(patches, Some(message)).map(Some)
    }

    /// Step back one version; false at the oldest version
    pub fn rollback(&mut self) -> EditorResult<bool> {
        self.ensure_idle()?;
        Ok(self.history.rollback().is_some())
    }

    /// Step forward one version; false at the newest version
    pub fn forward(&mut self) -> EditorResult<bool> {
        self.ensure_idle()?;
        Ok(self.history.forward().is_some())
    }

    /// Jump to a version; false (and no change) for an unknown id
    pub fn switch_to_version(&mut self, id: &str) -> EditorResult<bool> {
        self.ensure_idle()?;
        Ok(self.history.switch_to_version(id).is_some())
    }

    /// optimize → validate → apply → schema check → record
    fn commit(
        &mut self,
        patches: Vec<PatchOperation>,
        message: Option<&str>,
    ) -> EditorResult<(String, Vec<PatchOperation>)> {
        let patches = patch::optimize(patches);
        patch::validate(&patches)?;
        let next = apply_to_layout(self.layout(), &patches)?;

        let message = match message {
            Some(message) => message.to_string(),
            None => describe_patches(&patches),
        };
        let version_id = self.history.add_version(next, message, patches.clone());

        info!(
            session = %self.id,
            version = %version_id,
            patches = patches.len(),
            "Committed version"
        );
        Ok((version_id, patches))
    }

    fn applied_reply(&self, patches: &[PatchOperation]) -> String {
        let mut reply = format!("Done: {}.", describe_patches(patches));

        let mut flagged: Vec<&str> = Vec::new();
        for text in written_text(patches) {
            for word in self.brand.forbidden_in(text) {
                if !flagged.contains(&word) {
                    flagged.push(word);
                }
            }
        }
        if !flagged.is_empty() {
            reply.push_str(&format!(
                " Heads-up: the new copy uses words {} avoids: {}.",
                self.brand.name,
                flagged.join(", ")
            ));
        }
        reply
    }
}
