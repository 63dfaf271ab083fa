//! Tests for the roster cache primer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::OnCallRoster;
use crate::domain::ports::{MockOnCallSource, MockRosterCache};
use crate::domain::test_rosters::{key, roster_of};

#[fixture]
fn config() -> CachePrimerConfig {
    CachePrimerConfig {
        keys: vec![key("oncall"), key("oncall-db")],
        refresh_interval: Duration::from_secs(3600),
        ttl: Duration::from_secs(300),
        operation_timeout: Duration::from_millis(100),
    }
}

#[rstest]
#[tokio::test]
async fn prime_once_writes_every_key(config: CachePrimerConfig) {
    let mut source = MockOnCallSource::new();
    source
        .expect_fetch()
        .times(2)
        .returning(|_| Ok(roster_of(&["Ana"])));
    let mut cache = MockRosterCache::new();
    cache
        .expect_set()
        .withf(|_, _, ttl| *ttl == Duration::from_secs(300))
        .times(2)
        .returning(|_, _, _| Ok(()));
    cache.expect_get().never();
    let primer = CachePrimer::new(Arc::new(cache), Arc::new(source), config);

    let report = primer.prime_once().await;

    assert!(report.is_success());
    assert_eq!(report.primed, vec![key("oncall"), key("oncall-db")]);
    assert_eq!(primer.state(), PrimerState::Idle);
}

#[rstest]
#[tokio::test]
async fn failing_key_does_not_abort_cycle(config: CachePrimerConfig) {
    let mut source = MockOnCallSource::new();
    source
        .expect_fetch()
        .with(eq(key("oncall")))
        .return_once(|_| Err(OnCallSourceError::unavailable("directory down")));
    source
        .expect_fetch()
        .with(eq(key("oncall-db")))
        .return_once(|_| Ok(roster_of(&["Bo"])));
    let mut cache = MockRosterCache::new();
    cache
        .expect_set()
        .withf(|k, _, _| k.as_str() == "oncall-db")
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let primer = CachePrimer::new(Arc::new(cache), Arc::new(source), config);

    let report = primer.prime_once().await;

    assert_eq!(report.primed, vec![key("oncall-db")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, key("oncall"));
    assert!(report.failures[0].1.contains("directory down"));
    assert_eq!(primer.state(), PrimerState::Failed);
}

#[rstest]
#[tokio::test]
async fn cache_write_failure_counts_as_key_failure(config: CachePrimerConfig) {
    let mut source = MockOnCallSource::new();
    source.expect_fetch().returning(|_| Ok(roster_of(&["Ana"])));
    let mut cache = MockRosterCache::new();
    cache
        .expect_set()
        .returning(|_, _, _| Err(RosterCacheError::backend("redis gone")));
    let primer = CachePrimer::new(Arc::new(cache), Arc::new(source), config);

    let report = primer.prime_once().await;

    assert!(report.primed.is_empty());
    assert_eq!(report.failures.len(), 2);
    assert_eq!(primer.state(), PrimerState::Failed);
}

/// Source that counts fetches and fails every call when `fail` is set.
#[derive(Default)]
struct CountingSource {
    fetches: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl OnCallSource for CountingSource {
    async fn fetch(&self, _key: &CacheKey) -> Result<OnCallRoster, OnCallSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(OnCallSourceError::unavailable("directory down"))
        } else {
            Ok(roster_of(&["Ana"]))
        }
    }
}

fn accepting_cache() -> MockRosterCache {
    let mut cache = MockRosterCache::new();
    cache.expect_set().returning(|_, _, _| Ok(()));
    cache
}

async fn wait_for_fetches(source: &CountingSource, at_least: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while source.fetches.load(Ordering::SeqCst) < at_least {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("primer reached the expected fetch count");
}

#[tokio::test]
async fn spawned_primer_primes_at_start_and_on_request() {
    let source = Arc::new(CountingSource::default());
    let primer = Arc::new(CachePrimer::new(
        Arc::new(accepting_cache()),
        source.clone(),
        CachePrimerConfig {
            keys: vec![key("oncall")],
            ..config()
        },
    ));

    let handle = primer.spawn();
    wait_for_fetches(&source, 1).await;
    handle.trigger().request();
    wait_for_fetches(&source, 2).await;

    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("primer stops promptly");
}

#[tokio::test]
async fn failed_cycle_settles_back_to_idle() {
    let source = Arc::new(CountingSource {
        fail: true,
        ..CountingSource::default()
    });
    let primer = Arc::new(CachePrimer::new(
        Arc::new(accepting_cache()),
        source.clone(),
        CachePrimerConfig {
            keys: vec![key("oncall")],
            ..config()
        },
    ));

    let handle = Arc::clone(&primer).spawn();
    wait_for_fetches(&source, 1).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while primer.state() != PrimerState::Idle {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("state settles");

    assert_eq!(handle.state(), PrimerState::Idle);
    handle.shutdown().await;
}

#[tokio::test]
async fn interval_ticks_drive_further_cycles() {
    let source = Arc::new(CountingSource::default());
    let primer = Arc::new(CachePrimer::new(
        Arc::new(accepting_cache()),
        source.clone(),
        CachePrimerConfig {
            keys: vec![key("oncall")],
            refresh_interval: Duration::from_millis(20),
            ..config()
        },
    ));

    let handle = primer.spawn();
    wait_for_fetches(&source, 3).await;
    handle.shutdown().await;
}

#[tokio::test]
async fn failing_source_is_retried_on_the_next_tick() {
    let source = Arc::new(CountingSource {
        fail: true,
        ..CountingSource::default()
    });
    let primer = Arc::new(CachePrimer::new(
        Arc::new(accepting_cache()),
        source.clone(),
        CachePrimerConfig {
            keys: vec![key("oncall")],
            refresh_interval: Duration::from_millis(20),
            ..config()
        },
    ));

    let handle = primer.spawn();
    wait_for_fetches(&source, 2).await;
    handle.shutdown().await;
}

/// Source that takes `delay` to answer and records started and finished calls.
struct SlowSource {
    delay: Duration,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl SlowSource {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OnCallSource for SlowSource {
    async fn fetch(&self, _key: &CacheKey) -> Result<OnCallRoster, OnCallSourceError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(roster_of(&["Ana"]))
    }
}

#[tokio::test]
async fn shutdown_waits_for_the_running_cycle() {
    let source = Arc::new(SlowSource::new(Duration::from_millis(40)));
    let primer = Arc::new(CachePrimer::new(
        Arc::new(accepting_cache()),
        source.clone(),
        CachePrimerConfig {
            keys: vec![key("oncall"), key("oncall-db"), key("oncall-web")],
            operation_timeout: Duration::from_secs(1),
            ..config()
        },
    ));

    let handle = primer.spawn();
    tokio::time::timeout(Duration::from_secs(5), async {
        while source.started.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("first fetch starts");
    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("primer stops after its cycle");

    assert_eq!(source.finished.load(Ordering::SeqCst), 3);
}

#[rstest]
#[tokio::test]
async fn stalled_source_is_bounded_by_operation_timeout(config: CachePrimerConfig) {
    let primer = CachePrimer::new(
        Arc::new(accepting_cache()),
        Arc::new(SlowSource::new(Duration::from_secs(30))),
        config,
    );

    let report = tokio::time::timeout(Duration::from_secs(2), primer.prime_once())
        .await
        .expect("cycle finishes within the outer guard");

    assert!(report.primed.is_empty());
    assert_eq!(report.failures.len(), 2);
    for (_, reason) in &report.failures {
        assert!(reason.contains("no answer within 100ms"), "{reason}");
    }
    assert_eq!(primer.state(), PrimerState::Failed);
}
