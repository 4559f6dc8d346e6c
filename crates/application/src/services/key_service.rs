//! Key service - Cached, self-healing access to the weekly access key
//!
//! Holds the current [`AccessKey`] in memory and keeps the persisted record in
//! step with the key derived for the current ISO week. The hot path
//! ([`KeyService::current_or_refresh`]) is a read lock and a timestamp
//! comparison; persistence is touched only when the cached key has expired.
//!
//! Refreshes are serialized by an async mutex so concurrent expirations never
//! interleave reads and writes of the persisted record.

use std::{fmt, sync::Arc};

use domain::{AccessKey, derive_access_key};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::ports::{ClockPort, KeyRecordStore};

/// Outcome of a load-or-refresh cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRefresh {
    /// The key now considered current
    pub key: AccessKey,
    /// `true` when a fresh key was derived and persisted
    pub refreshed: bool,
}

/// Service owning the current access key
pub struct KeyService {
    secret: SecretString,
    store: Arc<dyn KeyRecordStore>,
    clock: Arc<dyn ClockPort>,
    current: RwLock<Option<AccessKey>>,
    refresh_lock: Mutex<()>,
}

impl fmt::Debug for KeyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyService")
            .field("current", &*self.current.read())
            .finish_non_exhaustive()
    }
}

impl KeyService {
    /// Create a key service; nothing is loaded until first use
    pub fn new(
        secret: SecretString,
        store: Arc<dyn KeyRecordStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            secret,
            store,
            clock,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Load or refresh the key and seed the in-memory cache
    ///
    /// Called at startup so the persisted record converges before the first
    /// request arrives.
    pub async fn initialize(&self) -> KeyRefresh {
        let outcome = self.load_or_refresh().await;
        info!(
            expiry = %outcome.key.expiry(),
            refreshed = outcome.refreshed,
            "Access key initialized"
        );
        outcome
    }

    /// Reconcile the persisted record with the key derived for "now"
    ///
    /// The persisted key is kept only if it has not expired and its value
    /// equals the current week's derivation; anything else (missing,
    /// unreadable, stale, different secret) is replaced by a fresh
    /// derivation. Never fails: read errors count as "no record", write
    /// errors are logged and the fresh key is still returned.
    pub async fn load_or_refresh(&self) -> KeyRefresh {
        let _guard = self.refresh_lock.lock().await;
        let outcome = self.reconcile().await;
        *self.current.write() = Some(outcome.key.clone());
        outcome
    }

    /// Return the cached key, refreshing it first if it has expired
    ///
    /// No persistence I/O happens while the cached key is still valid.
    pub async fn current_or_refresh(&self) -> AccessKey {
        if let Some(key) = self.cached_valid_key() {
            return key;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(key) = self.cached_valid_key() {
            return key;
        }

        let outcome = self.reconcile().await;
        *self.current.write() = Some(outcome.key.clone());
        outcome.key
    }

    /// The cached key without any expiry check or refresh
    pub fn cached(&self) -> Option<AccessKey> {
        self.current.read().clone()
    }

    fn cached_valid_key(&self) -> Option<AccessKey> {
        let now = self.clock.now();
        self.current
            .read()
            .as_ref()
            .filter(|key| !key.is_expired_at(now))
            .cloned()
    }

    /// Core of the refresh; callers must hold `refresh_lock`
    #[instrument(skip(self))]
    async fn reconcile(&self) -> KeyRefresh {
        let now = self.clock.now();
        let candidate = derive_access_key(now, self.secret.expose_secret());

        match self.store.load().await {
            Ok(Some(stored)) if !stored.is_expired_at(now) && stored.value() == candidate.value() => {
                debug!(expiry = %stored.expiry(), "Persisted access key is current");
                return KeyRefresh {
                    key: stored,
                    refreshed: false,
                };
            },
            Ok(Some(stored)) => {
                debug!(
                    stored_expiry = %stored.expiry(),
                    expired = stored.is_expired_at(now),
                    "Persisted access key is stale, refreshing"
                );
            },
            Ok(None) => debug!("No persisted access key, deriving"),
            Err(e) => warn!(error = %e, "Persisted access key unreadable, deriving a new one"),
        }

        if let Err(e) = self.store.save(&candidate).await {
            warn!(error = %e, "Failed to persist access key, continuing with in-memory key");
        }

        info!(expiry = %candidate.expiry(), "Access key refreshed");

        KeyRefresh {
            key: candidate,
            refreshed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use mockall::predicate;

    use super::*;
    use crate::{
        error::ApplicationError,
        ports::{MockClockPort, MockKeyRecordStore},
    };

    const SECRET: &str = "test-admin-secret";

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    /// Clock that can be moved forward between calls
    struct SteppingClock(parking_lot::Mutex<DateTime<Utc>>);

    impl SteppingClock {
        fn new(start: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(parking_lot::Mutex::new(start)))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock() += by;
        }
    }

    impl ClockPort for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    fn fixed_clock(now: DateTime<Utc>) -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock.expect_now().return_const(now);
        Arc::new(clock)
    }

    fn service(store: MockKeyRecordStore, clock: Arc<dyn ClockPort>) -> KeyService {
        KeyService::new(SecretString::from(SECRET.to_string()), Arc::new(store), clock)
    }

    #[tokio::test]
    async fn missing_record_is_derived_and_persisted() {
        let now = at("2024-06-12T08:30:00Z");
        let expected = derive_access_key(now, SECRET);

        let mut store = MockKeyRecordStore::new();
        store.expect_load().times(1).returning(|| Ok(None));
        store
            .expect_save()
            .with(predicate::eq(expected.clone()))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = service(store, fixed_clock(now)).load_or_refresh().await;

        assert!(outcome.refreshed);
        assert_eq!(outcome.key, expected);
        assert_eq!(outcome.key.value(), "sk-fb0f11adde915bdc");
    }

    #[tokio::test]
    async fn matching_unexpired_record_is_returned_unchanged() {
        let now = at("2024-06-12T08:30:00Z");
        let earlier = derive_access_key(at("2024-06-10T09:00:00Z"), SECRET);
        let stored = earlier.clone();

        let mut store = MockKeyRecordStore::new();
        store
            .expect_load()
            .times(1)
            .returning(move || Ok(Some(stored.clone())));
        store.expect_save().never();

        let outcome = service(store, fixed_clock(now)).load_or_refresh().await;

        assert!(!outcome.refreshed);
        assert_eq!(outcome.key, earlier);
        assert_eq!(outcome.key.expiry(), at("2024-06-17T09:00:00Z"));
    }

    #[tokio::test]
    async fn unexpired_record_with_wrong_value_is_replaced() {
        let now = at("2024-06-12T08:30:00Z");
        let foreign = AccessKey::new("sk-0000000000000000", now + Duration::days(5)).unwrap();

        let mut store = MockKeyRecordStore::new();
        store
            .expect_load()
            .returning(move || Ok(Some(foreign.clone())));
        store.expect_save().times(1).returning(|_| Ok(()));

        let outcome = service(store, fixed_clock(now)).load_or_refresh().await;

        assert!(outcome.refreshed);
        assert_eq!(outcome.key, derive_access_key(now, SECRET));
    }

    #[tokio::test]
    async fn expired_record_with_matching_value_is_replaced() {
        let now = at("2024-06-12T08:30:00Z");
        let value = derive_access_key(now, SECRET).value().to_string();
        let expired = AccessKey::new(value, now - Duration::minutes(1)).unwrap();

        let mut store = MockKeyRecordStore::new();
        store
            .expect_load()
            .returning(move || Ok(Some(expired.clone())));
        store.expect_save().times(1).returning(|_| Ok(()));

        let outcome = service(store, fixed_clock(now)).load_or_refresh().await;

        assert!(outcome.refreshed);
        assert_eq!(outcome.key.expiry(), now + Duration::days(7));
    }

    #[tokio::test]
    async fn unreadable_record_is_recovered() {
        let now = at("2024-06-12T08:30:00Z");

        let mut store = MockKeyRecordStore::new();
        store
            .expect_load()
            .returning(|| Err(ApplicationError::Persistence("expected value at line 1".into())));
        store.expect_save().times(1).returning(|_| Ok(()));

        let outcome = service(store, fixed_clock(now)).load_or_refresh().await;

        assert!(outcome.refreshed);
        assert_eq!(outcome.key, derive_access_key(now, SECRET));
    }

    #[tokio::test]
    async fn write_failure_keeps_in_memory_key() {
        let now = at("2024-06-12T08:30:00Z");

        let mut store = MockKeyRecordStore::new();
        store.expect_load().returning(|| Ok(None));
        store
            .expect_save()
            .returning(|_| Err(ApplicationError::Persistence("read-only file system".into())));

        let service = service(store, fixed_clock(now));
        let outcome = service.load_or_refresh().await;

        assert!(outcome.refreshed);
        assert_eq!(service.cached(), Some(derive_access_key(now, SECRET)));
    }

    #[tokio::test]
    async fn hot_path_performs_no_io_while_key_is_valid() {
        let clock = SteppingClock::new(at("2024-06-12T08:30:00Z"));

        let mut store = MockKeyRecordStore::new();
        store.expect_load().times(1).returning(|| Ok(None));
        store.expect_save().times(1).returning(|_| Ok(()));

        let service = service(store, clock.clone());
        let first = service.current_or_refresh().await;

        for _ in 0..10 {
            clock.advance(Duration::hours(12));
            assert_eq!(service.current_or_refresh().await, first);
        }
    }

    #[tokio::test]
    async fn expiry_triggers_exactly_one_refresh() {
        let start = at("2024-06-12T08:30:00Z");
        let clock = SteppingClock::new(start);

        let mut store = MockKeyRecordStore::new();
        store.expect_load().times(2).returning(|| Ok(None));
        store.expect_save().times(2).returning(|_| Ok(()));

        let service = service(store, clock.clone());
        let first = service.current_or_refresh().await;

        clock.advance(Duration::days(7));
        let second = service.current_or_refresh().await;
        let third = service.current_or_refresh().await;

        assert_ne!(first.value(), second.value());
        assert_eq!(second, third);
        assert_eq!(second, derive_access_key(start + Duration::days(7), SECRET));
    }

    #[tokio::test]
    async fn initialize_seeds_cache() {
        let now = at("2024-06-12T08:30:00Z");

        let mut store = MockKeyRecordStore::new();
        store.expect_load().times(1).returning(|| Ok(None));
        store.expect_save().times(1).returning(|_| Ok(()));

        let service = service(store, fixed_clock(now));
        assert!(service.cached().is_none());

        let outcome = service.initialize().await;
        assert_eq!(service.cached(), Some(outcome.key.clone()));
        assert_eq!(service.current_or_refresh().await, outcome.key);
    }

    #[tokio::test]
    async fn concurrent_expirations_refresh_once() {
        let now = at("2024-06-12T08:30:00Z");

        let mut store = MockKeyRecordStore::new();
        store.expect_load().times(1).returning(|| Ok(None));
        store.expect_save().times(1).returning(|_| Ok(()));

        let service = Arc::new(service(store, fixed_clock(now)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.current_or_refresh().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), derive_access_key(now, SECRET));
        }
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let service = service(MockKeyRecordStore::new(), fixed_clock(Utc::now()));
        let debug = format!("{service:?}");
        assert!(debug.contains("KeyService"));
        assert!(!debug.contains(SECRET));
    }
}
