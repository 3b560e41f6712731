//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::error::ApiError;
use drift_core::{
    ports::{EmotionClassifierService, InsightGenerationService, KeyValueStore},
    InsightBoard, JournalService, JournalStore,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// The journal service as the server holds it: any store, any classifier.
pub type SharedJournal = JournalService<Arc<dyn KeyValueStore>, dyn EmotionClassifierService>;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    /// Single writer: every store access goes through this lock, so submissions never overlap.
    pub journal: Mutex<SharedJournal>,
    pub insight_adapter: Arc<dyn InsightGenerationService>,
    pub insights: InsightBoard,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn KeyValueStore>,
        classifier: Arc<dyn EmotionClassifierService>,
        insight_adapter: Arc<dyn InsightGenerationService>,
    ) -> Self {
        Self {
            journal: Mutex::new(JournalService::new(JournalStore::new(store), classifier)),
            insight_adapter,
            insights: InsightBoard::new(),
            config,
        }
    }

    /// Loads the profile once before serving, which also writes the default
    /// profile on first run. A store that cannot be written stops startup here.
    pub async fn warm_up(&self) -> Result<(), ApiError> {
        let journal = self.journal.lock().await;
        let user = journal.store().get_user().await?;
        let entries = journal.store().get_entries().await;
        info!(
            user = %user.id,
            streak = user.streak,
            entries = entries.len(),
            "Journal store ready."
        );
        Ok(())
    }
}
