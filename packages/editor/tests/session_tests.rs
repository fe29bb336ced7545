//! Edit session scenarios with scripted translators

use async_trait::async_trait;
use pagesmith_editor::{EditSession, EditorError, SessionHandle, SessionState, SubmitOutcome};
use pagesmith_schema::{BrandConfig, PageLayout, PatchOperation, Role, SchemaError};
use pagesmith_translator::{
    response, RuleBasedTranslator, TranslateError, TranslateResult, TranslationOutcome,
    TranslationRequest, Translator,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Replies with fixed model output, parsed the way the remote translator does
struct CannedReply(&'static str);

#[async_trait]
impl Translator for CannedReply {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn translate(&self, _: &TranslationRequest) -> TranslateResult<TranslationOutcome> {
        response::extract_patches(self.0)
    }
}

/// Holds every translation until released
struct Gate {
    release: Notify,
}

#[async_trait]
impl Translator for Gate {
    fn name(&self) -> &'static str {
        "gate"
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationOutcome> {
        self.release.notified().await;
        RuleBasedTranslator::new().translate(request).await
    }
}

/// Never answers its first translation; the rules handle later ones
#[derive(Default)]
struct StallsOnce {
    calls: AtomicUsize,
}

#[async_trait]
impl Translator for StallsOnce {
    fn name(&self) -> &'static str {
        "stalls-once"
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationOutcome> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        RuleBasedTranslator::new().translate(request).await
    }
}

fn session_with(translator: Arc<dyn Translator>) -> EditSession {
    EditSession::new(PageLayout::default_template(), translator, BrandConfig::default())
}

#[tokio::test]
async fn test_empty_translator_output_asks_for_clarification() {
    let mut session = session_with(Arc::new(RuleBasedTranslator::new()));

    let report = session.submit("asdf1234").await.unwrap();

    assert!(matches!(report.outcome, SubmitOutcome::NoChanges));
    assert!(report.reply.patches.is_none());
    assert!(report.reply.content.contains("couldn't turn that into a change"));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_malformed_model_output_leaves_page_unchanged() {
    let mut session = session_with(Arc::new(CannedReply("Sure! Here's nothing useful.")));
    let before = session.layout().clone();

    let report = session.submit("make it pop").await.unwrap();

    assert!(matches!(
        report.outcome,
        SubmitOutcome::Failed(EditorError::Translate(TranslateError::Parse(_)))
    ));
    assert_eq!(session.layout(), &before);
    assert_eq!(session.history().len(), 1);

    let assistant: Vec<_> = session
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .collect();
    assert_eq!(assistant.len(), 1);
    assert!(assistant[0].patches.is_none());
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_unsafe_model_patch_is_rejected_whole() {
    let mut session = session_with(Arc::new(CannedReply(
        r#"[{"op":"replace","path":"/hero/cta","value":"x"},{"op":"add","path":"/__proto__/polluted","value":true}]"#,
    )));

    let report = session.submit("anything").await.unwrap();

    assert!(matches!(
        report.outcome,
        SubmitOutcome::Failed(EditorError::Validation(_))
    ));
    assert_eq!(session.layout().hero.cta, "Try it now");
}

#[tokio::test]
async fn test_model_patch_breaking_schema_is_rejected() {
    let mut session = session_with(Arc::new(CannedReply(
        r#"[{"op":"remove","path":"/hero/cta"}]"#,
    )));

    let report = session.submit("drop the button").await.unwrap();

    assert!(matches!(report.outcome, SubmitOutcome::Failed(EditorError::Schema(_))));
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_null_optional_field_keeps_history_replayable() {
    let mut session = session_with(Arc::new(CannedReply(
        r#"[{"op":"replace","path":"/hero/cta","value":"Shop"},{"op":"add","path":"/hero/ctaColor","value":null}]"#,
    )));
    let before = session.layout().clone();

    let report = session.submit("reset the button colour").await.unwrap();

    assert!(matches!(
        report.outcome,
        SubmitOutcome::Failed(EditorError::Schema(SchemaError::NotRepresentable { .. }))
    ));
    assert_eq!(session.layout(), &before);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_messages_with_patches_match_versions() {
    let mut session = session_with(Arc::new(RuleBasedTranslator::new()));

    for instruction in [
        "change the title",
        "add an eco selling point",
        "asdf1234",
        "add a faq question",
        "make the button say buy now",
    ] {
        session.submit(instruction).await.unwrap();
    }

    let with_patches: Vec<&Vec<PatchOperation>> = session
        .messages()
        .iter()
        .filter_map(|m| m.patches.as_ref())
        .collect();
    let versions = &session.history().history()[1..];

    assert_eq!(with_patches.len(), versions.len());
    for (patches, version) in with_patches.iter().zip(versions) {
        assert_eq!(*patches, &version.patches);
    }
    assert_eq!(session.layout().usps.last().unwrap().icon, "🌱");
    assert_eq!(session.layout().hero.cta, "Buy now");
}

#[tokio::test]
async fn test_optimized_batch_is_what_gets_recorded() {
    let mut session = session_with(Arc::new(CannedReply(
        r#"[{"op":"replace","path":"/hero/headline","value":"one"},{"op":"replace","path":"/hero/headline","value":"two"}]"#,
    )));

    let report = session.submit("rewrite the headline twice").await.unwrap();

    let SubmitOutcome::Applied { patches, .. } = report.outcome else {
        panic!("Expected applied outcome");
    };
    assert_eq!(patches, vec![PatchOperation::replace("/hero/headline", json!("two"))]);
    assert_eq!(session.history().current_version().patches, patches);
    assert_eq!(session.layout().hero.headline, "two");
}

#[tokio::test]
async fn test_handle_rejects_second_submit_while_busy() {
    let gate = Arc::new(Gate {
        release: Notify::new(),
    });
    let handle = SessionHandle::new(session_with(gate.clone()));

    let first = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.submit("change the title").await })
    };

    // wait for the first submit to reach the translator
    for _ in 0..100 {
        if handle.lock().await.is_busy() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(handle.lock().await.is_busy());

    let second = handle.submit("add a faq").await;
    assert!(matches!(second, Err(EditorError::Busy)));
    assert_eq!(handle.lock().await.messages().len(), 1);

    gate.release.notify_one();
    let report = first.await.unwrap().unwrap();

    assert!(matches!(report.outcome, SubmitOutcome::Applied { .. }));
    let session = handle.lock().await;
    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.history().len(), 2);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_timed_out_submit_leaves_session_usable() {
    let mut session = session_with(Arc::new(StallsOnce::default()));
    let before = session.layout().clone();

    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), session.submit("change the title")).await;
    assert!(timed_out.is_err());

    assert!(!session.is_busy());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(!session.rollback().unwrap());
    assert_eq!(session.layout(), &before);

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert!(messages[1].content.contains("cancelled"));

    let report = session.submit("change the title").await.unwrap();
    assert!(matches!(report.outcome, SubmitOutcome::Applied { .. }));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.messages().len(), 4);
}

#[tokio::test]
async fn test_aborted_handle_submit_releases_session() {
    let handle = SessionHandle::new(session_with(Arc::new(StallsOnce::default())));

    let first = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.submit("change the title").await })
    };
    for _ in 0..100 {
        if handle.lock().await.is_busy() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(handle.lock().await.is_busy());

    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());

    let report = handle.submit("change the title").await.unwrap();
    assert!(matches!(report.outcome, SubmitOutcome::Applied { .. }));

    let session = handle.lock().await;
    let contents: Vec<_> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        contents,
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert!(session.messages()[1].content.contains("cancelled"));
    assert_eq!(session.history().len(), 2);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_saved_snapshot_resumes_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut session = session_with(Arc::new(RuleBasedTranslator::new()));
    session.submit("change the title").await.unwrap();
    session.snapshot().save(&path).unwrap();

    let snapshot = pagesmith_editor::SessionSnapshot::load(&path).unwrap();
    let mut resumed = EditSession::restore(
        snapshot,
        Arc::new(RuleBasedTranslator::new()),
        BrandConfig::default(),
    )
    .unwrap();

    assert_eq!(resumed.layout(), session.layout());
    assert!(resumed.rollback().unwrap());
    assert_eq!(resumed.layout(), &PageLayout::default_template());
}
