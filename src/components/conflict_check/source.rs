use crate::config::{Config, ConflictSourceKind};
use crate::error::{config_error, SchedulerResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::http::HttpConflictSource;
use super::redis_counts::RedisConflictSource;

/// Number of existing appointments at one date and start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCount {
    pub date: NaiveDate,
    pub time: String,
    pub count: u32,
}

/// Backend that knows how many appointments already exist per slot
#[async_trait]
pub trait ConflictSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Counts for the cross product of `dates` and `times`.
    ///
    /// Pairs without appointments may be omitted.
    async fn existing_counts(
        &self,
        dates: &[NaiveDate],
        times: &[String],
    ) -> SchedulerResult<Vec<ConflictCount>>;
}

/// Source used when no backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConflictSource;

#[async_trait]
impl ConflictSource for NoopConflictSource {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn existing_counts(
        &self,
        _dates: &[NaiveDate],
        _times: &[String],
    ) -> SchedulerResult<Vec<ConflictCount>> {
        Ok(Vec::new())
    }
}

/// Build the source selected by the configuration
pub fn build_source(config: &Config) -> SchedulerResult<Arc<dyn ConflictSource>> {
    match config.conflict_source {
        ConflictSourceKind::Http => {
            let base_url = config
                .conflict_api_url
                .as_deref()
                .ok_or_else(|| config_error("CONFLICT_API_URL is required for the http source"))?;
            let source = HttpConflictSource::new(base_url, config.conflict_api_token.clone())?;
            Ok(Arc::new(source))
        }
        ConflictSourceKind::Redis => Ok(Arc::new(RedisConflictSource::new(&config.redis_url)?)),
        ConflictSourceKind::None => Ok(Arc::new(NoopConflictSource)),
    }
}
