// ABOUTME: Pool-backed text messaging service exposing send and status operations to an RPC layer
// ABOUTME: Checked-out sessions that fail at the network level are handed to a repair task

use crate::client::error::{S2aError, S2aResult};
use crate::client::repair::{RetryConfig, spawn_repair};
use crate::client::session::ProtocolSession;
use crate::client::types::{Credentials, TextMessage, TextStatus};
use crate::config::ServiceConfig;
use crate::pool::{Pool, PoolStatus, Token};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Text messaging over a fixed pool of authenticated gateway sessions.
///
/// Every operation checks out one session, runs a single exchange on it and
/// gives it back. When the exchange fails at the network level the session
/// goes to a background repair task instead, and the error is returned to
/// the caller as one failed attempt. The pool runs one session short until
/// the repair succeeds.
///
/// All methods take `&self`; share the service behind an `Arc` to serve
/// concurrent callers.
///
/// Operations are cancel safe. Once a session is checked out the exchange
/// runs on its own task, so a caller that stops waiting does not take the
/// session with it: the exchange finishes and the session goes back to the
/// pool (or to repair) as usual.
pub struct SmsService {
    pool: Arc<Pool<ProtocolSession>>,
    credentials: Arc<Credentials>,
    config: ServiceConfig,
}

impl SmsService {
    /// Open and authenticate `pool_size` sessions.
    ///
    /// Startup is all or nothing: if any session fails to connect or
    /// authenticate, the ones already open are closed and the error returned.
    pub async fn connect(config: ServiceConfig) -> S2aResult<Self> {
        config.validate()?;

        let mut sessions: Vec<ProtocolSession> = Vec::with_capacity(config.pool_size);
        for _ in 0..config.pool_size {
            let mut session = ProtocolSession::new(config.address.clone())
                .with_connect_timeout(config.connect_timeout)
                .with_read_timeout(config.read_timeout);

            if let Err(e) = session.dial_and_authenticate(&config.credentials).await {
                error!("Initialization of {} failed: {e}", config.address);
                session.close().await;
                for mut opened in sessions {
                    opened.close().await;
                }
                return Err(e);
            }
            sessions.push(session);
        }

        let pool = Pool::new();
        pool.initialize(sessions)?;
        info!("Initialized with {} connections.", config.pool_size);

        Ok(Self {
            pool: Arc::new(pool),
            credentials: Arc::new(config.credentials.clone()),
            config,
        })
    }

    /// Send a domestic text with the configured expiry.
    pub async fn send_text(&self, recipient: &str, message: &str) -> S2aResult<String> {
        let text = TextMessage::new(recipient, message).with_expiry(self.config.message_expiry);
        self.submit(&text).await
    }

    /// Send an international text with the configured expiry.
    pub async fn send_international_text(
        &self,
        recipient: &str,
        message: &str,
    ) -> S2aResult<String> {
        let text =
            TextMessage::international(recipient, message).with_expiry(self.config.message_expiry);
        self.submit(&text).await
    }

    /// Send a fully specified text, returning the gateway's message id.
    pub async fn submit(&self, message: &TextMessage) -> S2aResult<String> {
        let message = message.clone();
        self.run("send_text", move |mut session| async move {
            let result = session.send_text(&message).await;
            (session, result)
        })
        .await
    }

    /// Query delivery status; `Ok` means delivered.
    pub async fn try_check_status(&self, message_id: &str) -> S2aResult<()> {
        let message_id = message_id.to_owned();
        self.run("check_status", move |mut session| async move {
            let result = session.check_status(&message_id).await;
            (session, result)
        })
        .await
    }

    /// Query delivery status, folding any failure into the reply.
    pub async fn check_status(&self, message_id: &str) -> TextStatus {
        match self.try_check_status(message_id).await {
            Ok(()) => TextStatus::delivered(),
            Err(e) => TextStatus::failed(e),
        }
    }

    pub fn status(&self) -> PoolStatus {
        self.pool.status()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Stop serving and close every idle session.
    ///
    /// Sessions checked out at this point are closed once their exchange
    /// finishes. Sessions under repair are closed at their next attempt.
    pub async fn shutdown(&self) {
        let idle = self.pool.close();
        info!("Shutting down, closing {} idle sessions", idle.len());
        for (_token, mut session) in idle {
            session.close().await;
        }
    }

    async fn checkout(&self) -> S2aResult<(Token, ProtocolSession)> {
        let checkout = match self.config.checkout_timeout {
            Some(limit) => self.pool.checkout_timeout(limit).await,
            None => self.pool.checkout().await,
        };
        checkout.map_err(S2aError::from)
    }

    /// Check out a session and run one exchange on it in a spawned task.
    ///
    /// Nothing is awaited between taking the session and spawning, so from
    /// checkout on the task alone owns the token.
    async fn run<T, F, Fut>(&self, operation: &'static str, exchange: F) -> S2aResult<T>
    where
        T: Send + 'static,
        F: FnOnce(ProtocolSession) -> Fut,
        Fut: Future<Output = (ProtocolSession, S2aResult<T>)> + Send + 'static,
    {
        let (token, session) = self.checkout().await?;
        let pending = exchange(session);

        let pool = self.pool.clone();
        let credentials = self.credentials.clone();
        let retry = self.config.retry.clone();
        let handle = tokio::spawn(async move {
            let (session, result) = pending.await;
            let failure = result.as_ref().err();
            release(operation, &pool, token, session, credentials, retry, failure).await;
            result
        });

        handle.await?
    }
}

/// Give a session back after one operation.
async fn release(
    operation: &str,
    pool: &Arc<Pool<ProtocolSession>>,
    token: Token,
    session: ProtocolSession,
    credentials: Arc<Credentials>,
    retry: RetryConfig,
    failure: Option<&S2aError>,
) {
    match failure {
        Some(e) if e.is_transient() || !session.is_authenticated() => {
            warn!("{operation} network error on slot {}: {e}", token.index());
            spawn_repair(pool.clone(), token, session, credentials, retry);
        }
        _ => {
            if let Err(mut rejected) = pool.checkin(token, session) {
                debug!("{operation} finished after shutdown, closing session");
                rejected.close().await;
            }
        }
    }
}
