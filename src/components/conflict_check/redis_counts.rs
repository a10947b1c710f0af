use super::source::{ConflictCount, ConflictSource};
use crate::error::{config_error, conflict_source_error, SchedulerResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use redis::Client as RedisClient;
use tracing::info;

// Redis key constants
pub mod keys {
    pub const APPOINTMENT_COUNT_PREFIX: &str = "appointments:count:";
}

/// Key holding the appointment counter for one date and start time
pub fn count_key(date: &NaiveDate, time: &str) -> String {
    format!(
        "{}{}:{}",
        keys::APPOINTMENT_COUNT_PREFIX,
        date.format("%Y-%m-%d"),
        time
    )
}

/// Reads appointment counters kept in Redis
pub struct RedisConflictSource {
    client: RedisClient,
}

impl RedisConflictSource {
    /// Create a new source; the connection is opened lazily per query
    pub fn new(redis_url: &str) -> SchedulerResult<Self> {
        info!("Using Redis conflict source at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| config_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get_connection(&self) -> SchedulerResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| conflict_source_error(&format!("Failed to connect to Redis: {}", e)))
    }
}

#[async_trait]
impl ConflictSource for RedisConflictSource {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn existing_counts(
        &self,
        dates: &[NaiveDate],
        times: &[String],
    ) -> SchedulerResult<Vec<ConflictCount>> {
        let pairs: Vec<(NaiveDate, &String)> = dates
            .iter()
            .flat_map(|date| times.iter().map(move |time| (*date, time)))
            .collect();
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let redis_keys: Vec<String> = pairs
            .iter()
            .map(|(date, time)| count_key(date, time))
            .collect();

        let mut conn = self.get_connection().await?;

        // Explicit MGET so a single key still comes back as an array
        let values: Vec<Option<u32>> = redis::cmd("MGET")
            .arg(&redis_keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| conflict_source_error(&format!("Redis MGET error: {}", e)))?;

        Ok(counts_from_replies(&pairs, values))
    }
}

/// Pair MGET replies with the keys they answer; missing and zero counters are dropped
fn counts_from_replies(
    pairs: &[(NaiveDate, &String)],
    values: Vec<Option<u32>>,
) -> Vec<ConflictCount> {
    pairs
        .iter()
        .zip(values)
        .filter_map(|((date, time), value)| {
            value.filter(|count| *count > 0).map(|count| ConflictCount {
                date: *date,
                time: time.to_string(),
                count,
            })
        })
        .collect()
}
