use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::db::DatabaseProxy;
use crate::services::test_results::IngestionPolicy;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db_proxy: Arc<DatabaseProxy>,
    ingestion: IngestionPolicy,
    maintenance_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(db_proxy: Arc<DatabaseProxy>, ingestion: IngestionPolicy) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db_proxy,
            ingestion,
            maintenance_token: None,
        }
    }

    pub fn from_config(db_proxy: Arc<DatabaseProxy>, config: &Config) -> Self {
        Self::new(db_proxy, IngestionPolicy::from_scoring(config.scoring))
            .with_maintenance_token(config.maintenance_token.clone())
    }

    pub fn with_maintenance_token(mut self, token: Option<String>) -> Self {
        self.maintenance_token = token.map(Arc::from);
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db_proxy(&self) -> Arc<DatabaseProxy> {
        Arc::clone(&self.db_proxy)
    }

    pub fn ingestion(&self) -> &IngestionPolicy {
        &self.ingestion
    }

    pub fn maintenance_token(&self) -> Option<&str> {
        self.maintenance_token.as_deref()
    }
}
