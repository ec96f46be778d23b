// ABOUTME: Bounded pool of pre-authenticated sessions handed out under a counting semaphore
// ABOUTME: A token names the slot a session belongs to and is the only proof of ownership

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Cannot re-initialize")]
    AlreadyInitialized,

    #[error("Not initialized")]
    NotInitialized,

    #[error("No session available within {0:?}")]
    Unavailable(Duration),

    #[error("Pool closed")]
    Closed,
}

/// Exclusive claim on one pool slot.
///
/// Minted only by `checkout` and consumed by `checkin`, so it can be neither
/// duplicated nor returned twice.
#[derive(PartialEq, Eq)]
pub struct Token(usize);

impl Token {
    /// The slot index this token names
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

/// Snapshot of pool capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of slots
    pub size: usize,
    /// Sessions ready for checkout
    pub available: usize,
}

impl PoolStatus {
    /// Sessions held by callers or under repair
    pub fn outstanding(&self) -> usize {
        self.size - self.available
    }
}

struct Slots<S> {
    initialized: bool,
    size: usize,
    // Idle sessions tagged with their slot index
    idle: VecDeque<(usize, S)>,
}

/// Fixed-size pool of sessions of type `S`.
///
/// The semaphore holds one permit per idle session and is the only thing a
/// caller waits on. The slot list sits behind a plain mutex that is only
/// held to push or pop a single entry, never across an await.
///
/// No fairness between waiters is promised.
pub struct Pool<S> {
    permits: Semaphore,
    slots: Mutex<Slots<S>>,
}

impl<S> Default for Pool<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Pool<S> {
    /// An empty pool. Nothing can be checked out until `initialize`.
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
            slots: Mutex::new(Slots {
                initialized: false,
                size: 0,
                idle: VecDeque::new(),
            }),
        }
    }

    /// Populate the pool, one slot per session, indices in order.
    pub fn initialize(&self, sessions: Vec<S>) -> Result<(), PoolError> {
        let mut slots = self.lock();
        if slots.initialized {
            return Err(PoolError::AlreadyInitialized);
        }

        let size = sessions.len();
        slots.idle.extend(sessions.into_iter().enumerate());
        slots.size = size;
        slots.initialized = true;
        drop(slots);

        self.permits.add_permits(size);
        debug!("Pool initialized, size {size}");
        Ok(())
    }

    /// Take a session, waiting as long as it takes for one to be returned.
    pub async fn checkout(&self) -> Result<(Token, S), PoolError> {
        self.ensure_initialized()?;
        let permit = self.permits.acquire().await.map_err(|_| PoolError::Closed)?;
        permit.forget();
        self.take_idle()
    }

    /// Take a session, giving up with `Unavailable` after `limit`.
    pub async fn checkout_timeout(&self, limit: Duration) -> Result<(Token, S), PoolError> {
        self.ensure_initialized()?;
        let permit = match tokio::time::timeout(limit, self.permits.acquire()).await {
            Ok(acquired) => acquired.map_err(|_| PoolError::Closed)?,
            Err(_) => {
                debug!("Pool checkout timed out after {limit:?}");
                return Err(PoolError::Unavailable(limit));
            }
        };
        permit.forget();
        self.take_idle()
    }

    /// Return a session to the slot named by `token`.
    ///
    /// Called exactly once per checkout, by whoever holds the token at that
    /// point: the caller, or the repair task after a successful reconnect.
    ///
    /// A closed pool takes nothing back; the session is returned as `Err`
    /// so the caller can shut it down.
    pub fn checkin(&self, token: Token, session: S) -> Result<(), S> {
        let mut slots = self.lock();
        debug_assert!(
            token.0 < slots.size,
            "token {} does not belong to a pool of size {}",
            token.0,
            slots.size
        );
        // Checked under the lock so a concurrent `close` either sees this
        // entry when draining or has already rejected it.
        if self.permits.is_closed() {
            debug!("Pool closed, rejecting checkin of token {}", token.0);
            return Err(session);
        }
        slots.idle.push_back((token.0, session));
        let available = slots.idle.len();
        drop(slots);

        self.permits.add_permits(1);
        debug!("Pool checkin token {}, available {available}", token.0);
        Ok(())
    }

    pub fn status(&self) -> PoolStatus {
        let slots = self.lock();
        PoolStatus {
            size: slots.size,
            available: slots.idle.len(),
        }
    }

    pub fn size(&self) -> usize {
        self.lock().size
    }

    /// Stop handing out sessions and drain the idle ones.
    ///
    /// Waiters and later checkouts fail with `Closed`. Sessions still out
    /// with callers or under repair are not returned here.
    pub fn close(&self) -> Vec<(Token, S)> {
        let mut slots = self.lock();
        self.permits.close();
        slots
            .idle
            .drain(..)
            .map(|(index, session)| (Token(index), session))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    fn ensure_initialized(&self) -> Result<(), PoolError> {
        if !self.lock().initialized {
            return Err(PoolError::NotInitialized);
        }
        Ok(())
    }

    fn take_idle(&self) -> Result<(Token, S), PoolError> {
        let mut slots = self.lock();
        // A held permit guarantees an idle entry unless the pool was drained
        let (index, session) = slots.idle.pop_front().ok_or(PoolError::Closed)?;
        let available = slots.idle.len();
        drop(slots);

        debug!("Pool checkout token {index}, available {available}");
        Ok((Token(index), session))
    }

    fn lock(&self) -> MutexGuard<'_, Slots<S>> {
        // Slot bookkeeping can't be left half-updated, a poisoned lock is
        // still consistent.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn pool_of(size: usize) -> Pool<String> {
        let pool = Pool::new();
        pool.initialize((0..size).map(|i| format!("session-{i}")).collect())
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn initialize_twice_fails() {
        let pool = pool_of(2);
        assert_eq!(
            pool.initialize(vec!["again".to_string()]),
            Err(PoolError::AlreadyInitialized)
        );
        assert_eq!(pool.size(), 2);
    }

    #[tokio::test]
    async fn checkout_before_initialize_fails() {
        let pool: Pool<String> = Pool::new();
        assert_eq!(pool.checkout().await.unwrap_err(), PoolError::NotInitialized);
        assert_eq!(
            pool.checkout_timeout(Duration::from_millis(1)).await.unwrap_err(),
            PoolError::NotInitialized
        );
    }

    #[tokio::test]
    async fn token_matches_session_slot() {
        let pool = pool_of(3);
        for _ in 0..3 {
            let (token, session) = pool.checkout().await.unwrap();
            assert_eq!(session, format!("session-{}", token.index()));
            pool.checkin(token, session).unwrap();
        }
    }

    #[tokio::test]
    async fn checkout_and_checkin_track_availability() {
        let pool = pool_of(2);
        assert_eq!(pool.status(), PoolStatus { size: 2, available: 2 });

        let (token, session) = pool.checkout().await.unwrap();
        assert_eq!(pool.status().available, 1);
        assert_eq!(pool.status().outstanding(), 1);

        pool.checkin(token, session).unwrap();
        assert_eq!(pool.status().available, 2);
    }

    #[tokio::test]
    async fn concurrent_checkouts_issue_distinct_tokens() {
        let size = 8;
        let pool = Arc::new(pool_of(size));

        let mut handles = Vec::new();
        for _ in 0..size {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move { pool.checkout().await.unwrap() }));
        }

        let mut held = Vec::new();
        let mut seen = HashSet::new();
        for handle in handles {
            let (token, session) = handle.await.unwrap();
            assert!(seen.insert(token.index()), "token issued twice");
            held.push((token, session));
        }
        assert_eq!(seen.len(), size);
        assert_eq!(pool.status().available, 0);

        for (token, session) in held {
            pool.checkin(token, session).unwrap();
        }
        assert_eq!(pool.status().available, size);
    }

    #[tokio::test]
    async fn exhausted_pool_times_out() {
        let pool = pool_of(1);
        let (token, session) = pool.checkout().await.unwrap();

        let limit = Duration::from_millis(50);
        let started = Instant::now();
        let result = pool.checkout_timeout(limit).await;
        assert_eq!(result.unwrap_err(), PoolError::Unavailable(limit));
        assert!(started.elapsed() >= limit);

        pool.checkin(token, session).unwrap();
        assert!(pool.checkout_timeout(limit).await.is_ok());
    }

    #[tokio::test]
    async fn waiter_is_woken_by_checkin() {
        let pool = Arc::new(pool_of(1));
        let (token, session) = pool.checkout().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.checkout().await.map(|(token, _)| token.index()) })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        pool.checkin(token, session).unwrap();
        assert_eq!(waiter.await.unwrap(), Ok(0));
    }

    #[tokio::test]
    async fn close_drains_idle_and_rejects_checkout() {
        let pool = pool_of(3);
        let (token, session) = pool.checkout().await.unwrap();

        let drained = pool.close();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_closed());
        assert_eq!(pool.checkout().await.unwrap_err(), PoolError::Closed);
        assert_eq!(
            pool.checkout_timeout(Duration::from_millis(10)).await.unwrap_err(),
            PoolError::Closed
        );

        // sessions still out are handed back rather than parked
        assert_eq!(pool.checkin(token, session), Err("session-0".to_string()));
        assert_eq!(pool.status().available, 0);
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    #[should_panic(expected = "does not belong to a pool of size 1")]
    async fn checkin_rejects_foreign_token() {
        let small = pool_of(1);
        let large = pool_of(2);

        let _first = large.checkout().await.unwrap();
        let (token, session) = large.checkout().await.unwrap();
        assert_eq!(token.index(), 1);

        let _ = small.checkin(token, session);
    }
}
