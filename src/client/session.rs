// ABOUTME: Protocol session owning one gateway TCP connection: dial, authenticate, requests
// ABOUTME: Validates input, exchanges one frame pair per request and classifies the result code

use crate::client::error::{S2aError, S2aResult};
use crate::client::traits::Reconnect;
use crate::client::types::{Credentials, TextMessage};
use crate::connection::Connection;
use crate::datatypes::{Coding, ResultTable, classify_result};
use crate::frame::{InboundFrame, OutboundFrame};
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

/// Session lifecycle.
///
/// ```text
/// Disconnected --dial--> Connected --authenticate--> Authenticated
///       ^                                                  |
///       +------------- close / network failure ------------+
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Disconnected,
    Connected,
    Authenticated,
}

/// One connection to the gateway and its authentication state.
///
/// Requests are strictly sequential. Each operation writes one frame and
/// waits for the matching response before returning, so a session must never
/// be shared between callers; the pool hands it to one owner at a time.
///
/// A network failure during an exchange drops the connection and moves the
/// session back to `Disconnected`. Protocol failures leave it as it was.
#[derive(Debug)]
pub struct ProtocolSession {
    address: String,
    connection: Option<Connection>,
    state: SessionState,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl ProtocolSession {
    /// A disconnected session for the gateway at `address` (`host:port`)
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connection: None,
            state: SessionState::Disconnected,
            connect_timeout: None,
            read_timeout: None,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Bound the wait for each response. Applies to connections dialed
    /// afterwards.
    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Open the TCP connection. Any previous connection is closed first.
    pub async fn dial(&mut self) -> S2aResult<()> {
        if self.connection.is_some() {
            self.close().await;
        }

        let connect = TcpStream::connect(self.address.as_str());
        let socket = match self.connect_timeout {
            Some(limit) => match tokio::time::timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
            },
            None => connect.await,
        }
        .map_err(S2aError::Dial)?;

        if let Err(e) = socket.set_nodelay(true) {
            debug!("set_nodelay: {e}");
        }

        self.connection = Some(Connection::new(socket).with_read_timeout(self.read_timeout));
        self.state = SessionState::Connected;
        info!("Connected to {}", self.address);
        Ok(())
    }

    /// Authenticate the connection. Must be the first exchange after `dial`.
    ///
    /// A rejection leaves the session `Connected` and is not retried here.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> S2aResult<()> {
        self.require(SessionState::Connected)?;
        let credentials = Credentials::new(username, password);
        credentials.validate()?;

        let frame = OutboundFrame::authenticate(username, password)?;
        let response = self.exchange(&frame).await?;
        Self::classify(&response, ResultTable::Authenticate)?;

        self.state = SessionState::Authenticated;
        info!("{username} Authenticated");
        Ok(())
    }

    /// `dial` followed by `authenticate`
    pub async fn dial_and_authenticate(&mut self, credentials: &Credentials) -> S2aResult<()> {
        self.dial().await?;
        self.authenticate(&credentials.username, &credentials.password)
            .await
    }

    /// Submit a text message, returning the gateway's message id.
    pub async fn send_text(&mut self, message: &TextMessage) -> S2aResult<String> {
        self.require(SessionState::Authenticated)?;
        let expiry_minutes = message.validate()?;

        info!(
            "send_text to {} expire {:?}: {}",
            message.recipient, expiry_minutes, message.text
        );

        let frame = OutboundFrame::send_text(
            message.destination.operation(),
            Coding::Utf8,
            &message.recipient,
            &message.text,
            expiry_minutes,
        )?;
        let response = self.exchange(&frame).await?;
        Self::classify(&response, ResultTable::Send)?;

        // The gateway always assigns an id on success
        if response.result_content_len == 0 {
            error!("send_text to {} succeeded without a message id", message.recipient);
            return Err(S2aError::EmptyMessageId);
        }

        let message_id = response.content_text();
        info!(
            "send_text to {} succeeded with message id {}",
            message.recipient, message_id
        );
        Ok(message_id)
    }

    /// Query the delivery result of a previously sent message.
    ///
    /// `Ok` means delivered; anything still pending or failed comes back as
    /// a classified gateway error.
    pub async fn check_status(&mut self, message_id: &str) -> S2aResult<()> {
        self.require(SessionState::Authenticated)?;

        let frame = OutboundFrame::check_status(message_id)?;
        let response = self.exchange(&frame).await?;
        Self::classify(&response, ResultTable::Check)
    }

    /// Release the connection. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.shutdown().await;
            info!("Closed connection to {}", self.address);
        }
        self.state = SessionState::Disconnected;
    }

    fn require(&self, minimum: SessionState) -> S2aResult<()> {
        if self.state < minimum {
            return Err(S2aError::InvalidState(self.state));
        }
        Ok(())
    }

    async fn exchange(&mut self, frame: &OutboundFrame) -> S2aResult<InboundFrame> {
        let Some(connection) = self.connection.as_mut() else {
            return Err(S2aError::InvalidState(self.state));
        };

        match connection.exchange(frame).await {
            Ok(response) => Ok(response),
            Err(e) if e.is_transient() => {
                warn!("{} network error: {e}", self.address);
                self.connection = None;
                self.state = SessionState::Disconnected;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn classify(response: &InboundFrame, table: ResultTable) -> S2aResult<()> {
        if response.result_content_len > 0 {
            debug!("ret_content: {}", response.content_text());
        }

        match classify_result(response.result_code, table) {
            Ok(()) => Ok(()),
            Err(err) if err.is_unknown() => {
                error!("{:?}: {err}", table);
                Err(err.into())
            }
            Err(err) => {
                warn!("{:?} ret_code {}: {err}", table, err.code());
                Err(err.into())
            }
        }
    }
}

impl Reconnect for ProtocolSession {
    async fn reconnect(&mut self, credentials: &Credentials) -> S2aResult<()> {
        info!("Reconnecting to {}", self.address);
        self.close().await;
        self.dial_and_authenticate(credentials).await
    }

    async fn shut_down(&mut self) {
        self.close().await;
    }
}
