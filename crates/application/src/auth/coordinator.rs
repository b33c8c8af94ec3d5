//! Single-flight token refresh.
//!
//! At most one refresh runs at a time. Callers arriving while a refresh is in
//! flight are queued and receive that refresh's outcome, in the order they
//! arrived. The `refreshing` flag is released exactly once per cycle on every
//! exit path, including when the leading future is dropped mid-flight.
//!
//! On exhaustion the store is cleared and every registered
//! [`SessionObserver`] is told before any caller sees the error.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use prepdesk_domain::{AuthEvent, RetryPolicy, token_preview};
use thiserror::Error;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info, warn};

use super::TokenStore;
use crate::ports::{SessionObserver, TokenRefresher};

const EVENT_CAPACITY: usize = 16;

/// Errors produced by a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// Every attempt failed; the session has been cleared.
    #[error("token refresh failed after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Message of the last failure.
        last_error: String,
    },

    /// The refresh was dropped before it settled.
    #[error("token refresh was abandoned before completing")]
    Abandoned,

    /// The refreshed tokens could not be persisted.
    #[error("failed to persist refreshed tokens: {0}")]
    Storage(String),
}

/// Outcome broadcast to every caller of a refresh cycle.
///
/// `Ok(None)` means no refresh token was stored.
pub type RefreshOutcome = Result<Option<String>, RefreshError>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Coordinates token refreshes for every request sharing a [`TokenStore`].
pub struct RefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    tokens: TokenStore,
    policy: RetryPolicy,
    state: Mutex<RefreshState>,
    observers: Mutex<Vec<Weak<dyn SessionObserver>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RefreshCoordinator")
            .field("policy", &self.policy)
            .field("refreshing", &state.refreshing)
            .field("waiters", &state.waiters.len())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Creates a coordinator.
    #[must_use]
    pub fn new(refresher: Arc<dyn TokenRefresher>, tokens: TokenStore, policy: RetryPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            refresher,
            tokens,
            policy,
            state: Mutex::new(RefreshState::default()),
            observers: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Returns true while a refresh is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Returns the number of callers waiting on the in-flight refresh.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Registers an observer told about invalidation before callers resume.
    pub fn observe(&self, observer: Weak<dyn SessionObserver>) {
        self.observers.lock().push(observer);
    }

    /// Subscribes to authentication events.
    ///
    /// Events are delivered asynchronously and may lag; use
    /// [`RefreshCoordinator::observe`] for anything that must happen before
    /// the failing request returns.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Publishes an event to subscribers. Having none is not an error.
    pub fn notify(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    /// Returns a fresh access token, refreshing at most once for all
    /// concurrent callers.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError::Exhausted` once every attempt has failed (the
    /// store is cleared and `SessionInvalidated` published before this
    /// returns), `Abandoned` if the leading caller was dropped, or `Storage`
    /// if the new tokens could not be saved.
    pub async fn ensure_fresh_token(&self) -> RefreshOutcome {
        let waiter = {
            let mut state = self.state.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                debug!(queued = state.waiters.len(), "refresh in flight, queueing caller");
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            return rx.await.unwrap_or(Err(RefreshError::Abandoned));
        }

        let mut cycle = RefreshCycle {
            coordinator: self,
            settled: false,
        };
        let outcome = self.refresh_with_retry().await;
        cycle.settle(&outcome);
        outcome
    }

    async fn refresh_with_retry(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            info!("no refresh token stored, skipping refresh");
            return Ok(None);
        };

        let max_attempts = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.refresher.refresh(&refresh_token).await {
                Ok(refreshed) => {
                    self.tokens
                        .store_refreshed(&refreshed)
                        .map_err(|e| RefreshError::Storage(e.to_string()))?;

                    let preview = token_preview(&refreshed.access_token);
                    info!(attempt, token = %preview, "access token refreshed");
                    self.notify(AuthEvent::TokenRefreshed {
                        token_preview: preview,
                    });
                    return Ok(Some(refreshed.access_token));
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "token refresh attempt failed");
                    last_error = e.to_string();
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        error!(attempts = max_attempts, "token refresh exhausted, invalidating session");
        self.invalidate_session(&last_error);

        Err(RefreshError::Exhausted {
            attempts: max_attempts,
            last_error,
        })
    }

    fn invalidate_session(&self, reason: &str) {
        if let Err(e) = self.tokens.clear() {
            error!(error = %e, "failed to clear session storage");
        }

        let observers: Vec<Arc<dyn SessionObserver>> = {
            let mut registered = self.observers.lock();
            registered.retain(|observer| observer.strong_count() > 0);
            registered.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in observers {
            observer.session_invalidated(reason);
        }

        self.notify(AuthEvent::SessionInvalidated {
            reason: reason.to_string(),
        });
    }
}

/// Releases the `refreshing` flag and drains the queue exactly once.
struct RefreshCycle<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshCycle<'_> {
    fn settle(&mut self, outcome: &RefreshOutcome) {
        if self.settled {
            return;
        }
        self.settled = true;

        let waiters = {
            let mut state = self.coordinator.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for RefreshCycle<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("token refresh dropped before settling, releasing waiters");
            self.settle(&Err(RefreshError::Abandoned));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ApiResult;
    use crate::ports::{HttpClientError, MemoryKeyValueStore};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use prepdesk_domain::{RefreshedTokens, TokenPair, User};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Refresher failing a fixed number of times before succeeding.
    struct FlakyRefresher {
        failures: u32,
        calls: AtomicU32,
        latency: Duration,
        attempt_times: parking_lot::Mutex<Vec<Instant>>,
    }

    impl FlakyRefresher {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
                latency: Duration::from_millis(50),
                attempt_times: parking_lot::Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for FlakyRefresher {
        async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshedTokens> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.attempt_times.lock().push(Instant::now());
            tokio::time::sleep(self.latency).await;
            if call <= self.failures {
                return Err(HttpClientError::ConnectionFailed("unreachable".to_string()).into());
            }
            Ok(RefreshedTokens {
                access_token: format!("access-{call}"),
                refresh_token: Some(format!("{refresh_token}-rotated")),
            })
        }
    }

    fn coordinator(refresher: Arc<FlakyRefresher>, logged_in: bool) -> (TokenStore, Arc<RefreshCoordinator>) {
        let tokens = TokenStore::new(Arc::new(MemoryKeyValueStore::new()));
        if logged_in {
            tokens
                .store_session(&TokenPair::new("expired", "refresh"), &User::new("u-1", "ada"))
                .unwrap();
        }
        let coordinator = Arc::new(RefreshCoordinator::new(
            refresher,
            tokens.clone(),
            RetryPolicy::default(),
        ));
        (tokens, coordinator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_refresh_persists_tokens() {
        let refresher = FlakyRefresher::new(0);
        let (tokens, coordinator) = coordinator(refresher.clone(), true);
        let mut events = coordinator.subscribe();

        let token = coordinator.ensure_fresh_token().await.unwrap();

        assert_eq!(token.as_deref(), Some("access-1"));
        assert_eq!(
            tokens.tokens(),
            Some(TokenPair::new("access-1", "refresh-rotated"))
        );
        assert!(!coordinator.is_refreshing());
        assert!(matches!(
            events.recv().await.unwrap(),
            AuthEvent::TokenRefreshed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_refresh_token_returns_none_without_calls() {
        let refresher = FlakyRefresher::new(0);
        let (_, coordinator) = coordinator(refresher.clone(), false);

        let token = coordinator.ensure_fresh_token().await.unwrap();

        assert!(token.is_none());
        assert_eq!(refresher.calls(), 0);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_refresh() {
        let refresher = FlakyRefresher::new(0);
        let (_, coordinator) = coordinator(refresher.clone(), true);

        let mut handles = Vec::new();
        for _ in 0..5 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator.ensure_fresh_token().await
            }));
        }

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token.as_deref(), Some("access-1"));
        }
        assert_eq!(refresher.calls(), 1);
        assert_eq!(coordinator.queued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_caller_only_enqueues() {
        let refresher = FlakyRefresher::new(0);
        let (_, coordinator) = coordinator(refresher.clone(), true);

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.ensure_fresh_token().await })
        };
        tokio::task::yield_now().await;
        assert!(coordinator.is_refreshing());

        let follower = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.ensure_fresh_token().await })
        };
        tokio::task::yield_now().await;
        assert_eq!(coordinator.queued(), 1);
        assert_eq!(refresher.calls(), 1);

        assert_eq!(leader.await.unwrap(), follower.await.unwrap());
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_with_linear_backoff() {
        let refresher = FlakyRefresher::new(2);
        let (_, coordinator) = coordinator(refresher.clone(), true);

        let token = coordinator.ensure_fresh_token().await.unwrap();

        assert_eq!(token.as_deref(), Some("access-3"));
        let times = refresher.attempt_times.lock().clone();
        assert_eq!(times.len(), 3);
        let gaps: Vec<Duration> = times.windows(2).map(|w| w[1] - w[0]).collect();
        // each gap is 50ms of call latency plus base_delay * attempt
        let expected = [Duration::from_millis(550), Duration::from_millis(1050)];
        for (gap, expected) in gaps.iter().zip(expected) {
            assert!(*gap >= expected, "gap {gap:?} shorter than {expected:?}");
            assert!(*gap < expected + Duration::from_millis(10));
        }
        assert!(gaps[0] <= gaps[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_clears_store_and_rejects_waiters() {
        let refresher = FlakyRefresher::new(u32::MAX);
        let (tokens, coordinator) = coordinator(refresher.clone(), true);
        let mut events = coordinator.subscribe();

        let follower = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                coordinator.ensure_fresh_token().await
            })
        };
        let outcome = coordinator.ensure_fresh_token().await;

        assert!(matches!(
            outcome,
            Err(RefreshError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(follower.await.unwrap(), outcome);
        assert_eq!(refresher.calls(), 3);
        assert!(!tokens.has_tokens());
        assert!(tokens.is_empty());
        assert!(matches!(
            events.recv().await.unwrap(),
            AuthEvent::SessionInvalidated { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_leader_releases_flag_and_waiters() {
        let refresher = FlakyRefresher::new(0);
        let (_, coordinator) = coordinator(refresher.clone(), true);

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.ensure_fresh_token().await })
        };
        tokio::task::yield_now().await;
        let follower = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.ensure_fresh_token().await })
        };
        tokio::task::yield_now().await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());

        assert_eq!(follower.await.unwrap(), Err(RefreshError::Abandoned));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_resume_in_enqueue_order() {
        let refresher = FlakyRefresher::new(0);
        let (_, coordinator) = coordinator(refresher.clone(), true);
        let woken = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.ensure_fresh_token().await })
        };
        tokio::task::yield_now().await;

        let mut followers = Vec::new();
        for index in 0..5 {
            let follower = coordinator.clone();
            let woken = woken.clone();
            followers.push(tokio::spawn(async move {
                let outcome = follower.ensure_fresh_token().await;
                woken.lock().push(index);
                outcome
            }));
            tokio::task::yield_now().await;
            assert_eq!(coordinator.queued(), index + 1);
        }

        leader.await.unwrap().unwrap();
        for follower in followers {
            follower.await.unwrap().unwrap();
        }
        assert_eq!(*woken.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[derive(Default)]
    struct RecordingObserver {
        reasons: parking_lot::Mutex<Vec<String>>,
    }

    impl SessionObserver for RecordingObserver {
        fn session_invalidated(&self, reason: &str) {
            self.reasons.lock().push(reason.to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_observers_run_before_error_returns() {
        let refresher = FlakyRefresher::new(u32::MAX);
        let (_, coordinator) = coordinator(refresher, true);
        let observer = Arc::new(RecordingObserver::default());
        let dropped = Arc::new(RecordingObserver::default());
        coordinator.observe(Arc::downgrade(&observer) as Weak<dyn SessionObserver>);
        coordinator.observe(Arc::downgrade(&dropped) as Weak<dyn SessionObserver>);
        drop(dropped);

        let outcome = coordinator.ensure_fresh_token().await;

        assert!(outcome.is_err());
        assert_eq!(observer.reasons.lock().len(), 1);
        assert_eq!(coordinator.observers.lock().len(), 1);
    }
}
