use crate::session::{EditSession, SubmitReport};
use crate::EditorResult;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Shared access to one [`EditSession`] from several tasks
///
/// The lock is held only around `begin_submit` and `finish_submit`, never
/// across the translator call, so other tasks can read the session (or be
/// told it is busy) while a translation is pending. Dropping or aborting a
/// `submit` future mid-translation leaves the session idle.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<EditSession>>,
}

impl SessionHandle {
    pub fn new(session: EditSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn submit(&self, text: &str) -> EditorResult<SubmitReport> {
        let pending = self.inner.lock().await.begin_submit(text)?;
        let completed = pending.run().await;
        self.inner.lock().await.finish_submit(completed)
    }

    /// Exclusive access for reads and synchronous operations
    pub async fn lock(&self) -> MutexGuard<'_, EditSession> {
        self.inner.lock().await
    }
}
