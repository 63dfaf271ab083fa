//! Background task keeping the roster cache warm.
//!
//! The primer fetches every configured roster key from the on-call source and
//! writes the results straight into the cache, so request handlers rarely see
//! a miss. It runs one cycle at start-up, then one per refresh interval or
//! whenever a [`RefreshTrigger`] fires. Failures are reported and logged but
//! never stop later cycles.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::deadline::within;
use crate::domain::ports::{
    CacheKey, OnCallSource, OnCallSourceError, RosterCache, RosterCacheError,
};

/// Primer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePrimerConfig {
    /// Keys refreshed on every cycle.
    pub keys: Vec<CacheKey>,
    /// Delay between scheduled cycles.
    pub refresh_interval: Duration,
    /// Lifetime of entries written by the primer.
    pub ttl: Duration,
    /// Budget for each source fetch and cache write.
    pub operation_timeout: Duration,
}

/// Lifecycle state of the primer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimerState {
    /// Waiting for the next tick or refresh request.
    Idle,
    /// A cycle is in progress.
    Refreshing,
    /// The last cycle left at least one key unrefreshed.
    Failed,
}

/// Outcome of one priming cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimeCycleReport {
    /// Keys written to the cache, in configuration order.
    pub primed: Vec<CacheKey>,
    /// Keys that could not be refreshed, with the reason.
    pub failures: Vec<(CacheKey, String)>,
}

impl PrimeCycleReport {
    /// `true` when every key was primed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Cloneable request for an out-of-schedule refresh.
///
/// Requests made while a cycle is running are remembered and start another
/// cycle as soon as the current one ends. Several requests collapse into one.
#[derive(Debug, Clone, Default)]
pub struct RefreshTrigger(Arc<Notify>);

impl RefreshTrigger {
    /// Create a trigger not yet wired to any primer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the primer to refresh now.
    pub fn request(&self) {
        self.0.notify_one();
    }

    pub(crate) async fn requested(&self) {
        self.0.notified().await;
    }
}

/// Refreshes configured roster keys from the source into the cache.
pub struct CachePrimer {
    cache: Arc<dyn RosterCache>,
    source: Arc<dyn OnCallSource>,
    config: CachePrimerConfig,
    state: Mutex<PrimerState>,
    trigger: RefreshTrigger,
}

impl CachePrimer {
    /// Build an idle primer with its own refresh trigger.
    pub fn new(
        cache: Arc<dyn RosterCache>,
        source: Arc<dyn OnCallSource>,
        config: CachePrimerConfig,
    ) -> Self {
        Self {
            cache,
            source,
            config,
            state: Mutex::new(PrimerState::Idle),
            trigger: RefreshTrigger::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PrimerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Trigger wired to this primer's loop.
    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    fn set_state(&self, next: PrimerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Run a single cycle over every configured key.
    ///
    /// A failing key does not stop the others. The state ends as
    /// [`PrimerState::Failed`] when any key failed and
    /// [`PrimerState::Idle`] otherwise.
    pub async fn prime_once(&self) -> PrimeCycleReport {
        self.set_state(PrimerState::Refreshing);
        let mut report = PrimeCycleReport::default();
        for key in &self.config.keys {
            match self.prime_key(key).await {
                Ok(()) => report.primed.push(key.clone()),
                Err(reason) => {
                    warn!(%key, %reason, "failed to prime roster");
                    report.failures.push((key.clone(), reason));
                }
            }
        }
        self.set_state(if report.is_success() {
            PrimerState::Idle
        } else {
            PrimerState::Failed
        });
        report
    }

    async fn prime_key(&self, key: &CacheKey) -> Result<(), String> {
        let limit = self.config.operation_timeout;
        let roster = within(limit, self.source.fetch(key), || {
            OnCallSourceError::timeout(format!("no answer within {}ms", limit.as_millis()))
        })
        .await
        .map_err(|err| err.to_string())?;
        within(limit, self.cache.set(key, &roster, self.config.ttl), || {
            RosterCacheError::timeout("set")
        })
        .await
        .map_err(|err| err.to_string())?;
        debug!(%key, developers = roster.developers().len(), "primed roster");
        Ok(())
    }

    fn settle(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == PrimerState::Failed {
            *state = PrimerState::Idle;
        }
    }

    /// Prime immediately, then on every tick or refresh request until
    /// `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Shutdown is observed between cycles only.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            if *shutdown.borrow() {
                break;
            }
            let report = self.prime_once().await;
            info!(
                primed = report.primed.len(),
                failed = report.failures.len(),
                "roster priming cycle finished"
            );
            self.settle();

            tokio::select! {
                _ = ticker.tick() => {}
                () = self.trigger.requested() => {
                    debug!("roster refresh requested");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("roster primer stopped");
    }

    /// Start [`CachePrimer::run`] on the tokio runtime.
    pub fn spawn(self: Arc<Self>) -> CachePrimerHandle {
        let (shutdown, receiver) = watch::channel(false);
        let trigger = self.trigger();
        let task = tokio::spawn(Arc::clone(&self).run(receiver));
        CachePrimerHandle {
            primer: self,
            trigger,
            shutdown,
            task,
        }
    }
}

/// Control handle for a spawned primer.
pub struct CachePrimerHandle {
    primer: Arc<CachePrimer>,
    trigger: RefreshTrigger,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CachePrimerHandle {
    /// Trigger that wakes the running primer.
    pub fn trigger(&self) -> RefreshTrigger {
        self.trigger.clone()
    }

    /// Current state of the running primer.
    pub fn state(&self) -> PrimerState {
        self.primer.state()
    }

    /// Signal shutdown and wait for the in-flight cycle to finish.
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            debug!("roster primer already stopped");
        }
        if let Err(error) = self.task.await {
            warn!(%error, "roster primer task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests;
