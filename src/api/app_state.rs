use crate::observability::AppMetrics;
use crate::services::session::DocumentationSession;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared by all handlers
///
/// The session sits behind one async mutex: every request that reads or
/// appends holds it for the whole extraction, embedding and append sequence.
#[derive(Clone)]
pub struct AppState {
    /// The single documentation session
    pub session: Arc<Mutex<DocumentationSession>>,
    /// Request and domain counters
    pub metrics: AppMetrics,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session", &"Arc<Mutex<DocumentationSession>>")
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(session: DocumentationSession, metrics: AppMetrics) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            metrics,
        }
    }
}
