use crate::{TranslateResult, TranslationOutcome, TranslationRequest, Translator};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Try `primary`; on any error, ask `fallback` instead
///
/// `NoChanges` from the primary is an answer, not a failure, and is returned
/// as is.
pub struct FallbackTranslator {
    primary: Arc<dyn Translator>,
    fallback: Arc<dyn Translator>,
}

impl FallbackTranslator {
    pub fn new(primary: Arc<dyn Translator>, fallback: Arc<dyn Translator>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Translator for FallbackTranslator {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationOutcome> {
        match self.primary.translate(request).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    kind = err.kind(),
                    error = %err,
                    "Primary translator failed, falling back"
                );
                self.fallback.translate(request).await
            }
        }
    }
}
