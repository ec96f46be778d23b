// ABOUTME: Background repair of sessions that failed with a network error
// ABOUTME: Retries reconnect at a fixed interval and checks the session back into its pool slot

use crate::client::error::S2aError;
use crate::client::traits::Reconnect;
use crate::client::types::Credentials;
use crate::pool::{Pool, Token};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Retry policy for the repair task.
///
/// Retries are spaced by a fixed interval with no backoff and no jitter.
///
/// # Example
///
/// ```rust
/// use s2a::client::RetryConfig;
/// use std::time::Duration;
///
/// // Default configuration (10s interval, retry forever)
/// let config = RetryConfig::default();
///
/// // Give up on a slot after an hour of failures
/// let config = RetryConfig::new(Duration::from_secs(10))
///     .with_max_attempts(360);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Wait between reconnect attempts (default: 10 seconds)
    pub interval: Duration,

    /// Attempts before the slot is abandoned (default: unlimited)
    ///
    /// An abandoned slot permanently reduces pool capacity by one.
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: None,
        }
    }
}

impl RetryConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Repair a broken session in the background and return it to `pool`.
///
/// The caller hands over the token together with the session and must not
/// touch either again. Until the task succeeds the slot is out of the pool,
/// so capacity is reduced by one for the task's lifetime. Nothing is
/// reported back; the handle only says when the task has ended.
///
/// Once the pool is closed the task stops retrying and shuts the session
/// down instead of returning it.
pub fn spawn_repair<S: Reconnect>(
    pool: Arc<Pool<S>>,
    token: Token,
    session: S,
    credentials: Arc<Credentials>,
    config: RetryConfig,
) -> JoinHandle<()> {
    tokio::spawn(repair(pool, token, session, credentials, config))
}

async fn repair<S: Reconnect>(
    pool: Arc<Pool<S>>,
    token: Token,
    mut session: S,
    credentials: Arc<Credentials>,
    config: RetryConfig,
) {
    let slot = token.index();
    let mut attempts = 0u32;

    loop {
        if pool.is_closed() {
            info!("Pool closed, abandoning repair of slot {slot}");
            session.shut_down().await;
            return;
        }

        attempts += 1;
        match session.reconnect(&credentials).await {
            Ok(()) => break,
            // A rejected login will keep failing until someone fixes the
            // account, make it stand out from network noise.
            Err(S2aError::Gateway(e)) => {
                error!("Reconnect of slot {slot} rejected by gateway (attempt {attempts}): {e}")
            }
            Err(e) => warn!("Reconnect of slot {slot} failed (attempt {attempts}): {e}"),
        }

        if config.exhausted(attempts) {
            error!("Giving up on slot {slot} after {attempts} attempts, pool capacity reduced");
            session.shut_down().await;
            return;
        }

        info!("Retry slot {slot} after {:?}", config.interval);
        tokio::time::sleep(config.interval).await;
    }

    info!("Slot {slot} reconnected after {attempts} attempt(s)");
    if let Err(mut session) = pool.checkin(token, session) {
        info!("Pool closed while repairing slot {slot}, closing the session");
        session.shut_down().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::S2aResult;
    use crate::datatypes::{AuthStatus, ResultError};
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Fails a fixed number of reconnects, then succeeds.
    struct FlakySession {
        failures_left: u32,
        reject_login: bool,
        attempts: Arc<AtomicU32>,
        attempt_times: Arc<std::sync::Mutex<Vec<Instant>>>,
        shut_down: Arc<AtomicBool>,
    }

    impl FlakySession {
        fn new(failures: u32) -> Self {
            Self {
                failures_left: failures,
                reject_login: false,
                attempts: Arc::new(AtomicU32::new(0)),
                attempt_times: Arc::new(std::sync::Mutex::new(Vec::new())),
                shut_down: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl Reconnect for FlakySession {
        async fn reconnect(&mut self, _credentials: &Credentials) -> S2aResult<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.attempt_times.lock().unwrap().push(Instant::now());
            if self.failures_left == 0 {
                return Ok(());
            }
            self.failures_left -= 1;
            if self.reject_login {
                Err(ResultError::Authenticate(AuthStatus::PasswordError).into())
            } else {
                Err(S2aError::Dial(io::Error::from(io::ErrorKind::ConnectionRefused)))
            }
        }

        async fn shut_down(&mut self) {
            self.shut_down.store(true, Ordering::SeqCst);
        }
    }

    fn credentials() -> Arc<Credentials> {
        Arc::new(Credentials::new("user", "pass"))
    }

    #[test]
    fn retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.max_attempts, None);
        assert!(!config.exhausted(u32::MAX));

        let config = RetryConfig::new(Duration::from_secs(1)).with_max_attempts(3);
        assert!(!config.exhausted(2));
        assert!(config.exhausted(3));
    }

    #[tokio::test(start_paused = true)]
    async fn repair_converges_and_restores_capacity() {
        let pool = Arc::new(Pool::new());
        pool.initialize(vec![FlakySession::new(3)]).unwrap();

        let (token, session) = pool.checkout().await.unwrap();
        let attempts = session.attempts.clone();
        let times = session.attempt_times.clone();
        assert_eq!(pool.status().available, 0);

        let interval = Duration::from_secs(10);
        spawn_repair(pool.clone(), token, session, credentials(), RetryConfig::new(interval))
            .await
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(pool.status().available, 1);

        let times = times.lock().unwrap();
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= interval && gap < interval + Duration::from_millis(5), "gap {gap:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn repaired_session_returns_to_its_slot() {
        let pool = Arc::new(Pool::new());
        pool.initialize(vec![FlakySession::new(0), FlakySession::new(1)])
            .unwrap();

        let (first, first_session) = pool.checkout().await.unwrap();
        let (second, second_session) = pool.checkout().await.unwrap();
        assert_eq!(second.index(), 1);
        assert!(pool.checkin(first, first_session).is_ok());

        spawn_repair(
            pool.clone(),
            second,
            second_session,
            credentials(),
            RetryConfig::new(Duration::from_secs(1)),
        )
        .await
        .unwrap();

        let mut indices = Vec::new();
        for _ in 0..2 {
            let (token, _session) = pool.checkout().await.unwrap();
            indices.push(token.index());
        }
        indices.sort();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn login_rejections_are_retried_like_network_faults() {
        let pool = Arc::new(Pool::new());
        let mut session = FlakySession::new(2);
        session.reject_login = true;
        pool.initialize(vec![session]).unwrap();

        let (token, session) = pool.checkout().await.unwrap();
        let attempts = session.attempts.clone();
        spawn_repair(pool.clone(), token, session, credentials(), RetryConfig::default())
            .await
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(pool.status().available, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_repair_abandons_slot() {
        let pool = Arc::new(Pool::new());
        pool.initialize(vec![FlakySession::new(u32::MAX)]).unwrap();

        let (token, session) = pool.checkout().await.unwrap();
        let attempts = session.attempts.clone();
        let shut_down = session.shut_down.clone();
        let config = RetryConfig::new(Duration::from_secs(5)).with_max_attempts(3);
        spawn_repair(pool.clone(), token, session, credentials(), config)
            .await
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(shut_down.load(Ordering::SeqCst));
        assert_eq!(pool.status(), crate::pool::PoolStatus { size: 1, available: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn closed_pool_stops_retrying() {
        let pool = Arc::new(Pool::new());
        pool.initialize(vec![FlakySession::new(u32::MAX)]).unwrap();

        let (token, session) = pool.checkout().await.unwrap();
        let attempts = session.attempts.clone();
        let shut_down = session.shut_down.clone();
        let handle = spawn_repair(
            pool.clone(),
            token,
            session,
            credentials(),
            RetryConfig::new(Duration::from_secs(10)),
        );

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(pool.close().is_empty());

        handle.await.unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(shut_down.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn repair_of_closed_pool_shuts_session_down() {
        let pool = Arc::new(Pool::new());
        pool.initialize(vec![FlakySession::new(0)]).unwrap();

        let (token, session) = pool.checkout().await.unwrap();
        let attempts = session.attempts.clone();
        let shut_down = session.shut_down.clone();

        let handle = spawn_repair(
            pool.clone(),
            token,
            session,
            credentials(),
            RetryConfig::default(),
        );
        pool.close();
        handle.await.unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 0);
        assert!(shut_down.load(Ordering::SeqCst));
        assert_eq!(pool.status().available, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repair_does_not_block_spawner() {
        let pool = Arc::new(Pool::new());
        pool.initialize(vec![FlakySession::new(5)]).unwrap();

        let (token, session) = pool.checkout().await.unwrap();
        let started = Instant::now();
        let handle = spawn_repair(
            pool.clone(),
            token,
            session,
            credentials(),
            RetryConfig::new(Duration::from_secs(10)),
        );
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(!handle.is_finished());

        handle.await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(50));
    }
}
