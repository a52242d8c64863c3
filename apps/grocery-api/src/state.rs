//! Shared application state handed to every handler.

use std::sync::Arc;

use grocery_db::{BillSequencer, Database};

use crate::config::ApiConfig;

/// Shared application state.
///
/// Cheap to clone: the database handle wraps a pooled connection set and the
/// config sits behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    /// Bill sequencer using the configured numbering date policy.
    pub fn sequencer(&self) -> BillSequencer {
        self.db.sequencer(self.config.bill_number_date)
    }
}
