pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod datatypes;
pub mod frame;
pub mod pool;
pub mod service;


// Re-export codec types for direct access
pub use codec::{CodecError, Decodable, Encodable};
pub use frame::{InboundFrame, OutboundFrame};

// Re-export the main client API for easy access
pub use client::{
    Credentials, ProtocolSession, RetryConfig, S2aError, S2aResult, TextMessage, TextStatus,
};
pub use config::ServiceConfig;
pub use pool::{Pool, PoolError, PoolStatus, Token};
pub use service::SmsService;

/// Client for the Socket-to-Air text messaging gateway.
///
/// # Examples
///
/// ## Pooled service
///
/// ```rust,no_run
/// use s2a::{ServiceConfig, SmsService};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServiceConfig::new("api.example.net:8000", "account", "secret")
///         .with_pool_size(4);
///     let service = SmsService::connect(config).await?;
///
///     let message_id = service.send_text("0912345678", "Hello, World!").await?;
///     println!("Message sent with ID: {}", message_id);
///
///     let status = service.check_status(&message_id).await;
///     println!("Delivered: {} {}", status.success, status.error);
///
///     service.shutdown().await;
///     Ok(())
/// }
/// ```
pub type Result<T> = S2aResult<T>;
