// ABOUTME: Socket-to-Air client module: protocol session, error types, supporting types and repair
// ABOUTME: Exports the pieces the pool and service are assembled from

//! Socket-to-Air Client Module
//!
//! * `ProtocolSession` - one TCP connection: dial, authenticate, send, query, close
//! * `S2aError` - errors split into transient network faults and protocol errors
//! * `Reconnect` - the seam the pool's repair task drives sessions through
//! * `spawn_repair` - background reconnect-with-retry for broken sessions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use s2a::client::{Credentials, ProtocolSession, TextMessage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ProtocolSession::new("api.example.net:8000");
//! session
//!     .dial_and_authenticate(&Credentials::new("account", "secret"))
//!     .await?;
//!
//! let message_id = session
//!     .send_text(&TextMessage::new("0912345678", "Hello!"))
//!     .await?;
//! session.check_status(&message_id).await?;
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod repair;
pub mod session;
pub mod traits;
pub mod types;

pub use error::{S2aError, S2aResult, ValidationError};
pub use repair::{RetryConfig, spawn_repair};
pub use session::{ProtocolSession, SessionState};
pub use traits::Reconnect;
pub use types::{Credentials, Destination, TextMessage, TextStatus};
