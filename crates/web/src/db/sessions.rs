//! Session store plumbing.
//!
//! [`MemorySessionStore`] keeps sessions in a bounded `moka` cache whose entries
//! expire at the record's own expiry date, so a stream of cookieless clients
//! cannot grow memory without limit. [`sweep_expired_sessions`] purges expired
//! rows from a persistent store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};

/// Bounded in-memory [`SessionStore`].
///
/// When full, the cache evicts entries by its admission policy. An evicted
/// session reads back as unknown and the client starts over anonymous.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    cache: Cache<Id, Record>,
}

impl MemorySessionStore {
    /// Create a store holding at most `capacity` sessions.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .expire_after(RecordExpiry)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .cache
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

/// Expires each cache entry at its record's expiry date.
struct RecordExpiry;

impl Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(
        &self,
        _id: &Id,
        record: &Record,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(time_left(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(time_left(record))
    }
}

fn time_left(record: &Record) -> Duration {
    Duration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO)
}

/// Delete expired sessions every `period`, forever.
///
/// A failed sweep is logged and retried on the next tick; the task never exits
/// on its own.
pub async fn sweep_expired_sessions<S>(store: S, period: Duration)
where
    S: ExpiredDeletion,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // first tick fires immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        match store.delete_expired().await {
            Ok(()) => tracing::debug!("expired sessions deleted"),
            Err(err) => tracing::error!(error = %err, "failed to delete expired sessions"),
        }
    }
}
