// ABOUTME: Configuration for the pooled Socket-to-Air service
// ABOUTME: Gateway address, account credentials, pool size and timing knobs with builder setters

use crate::client::repair::RetryConfig;
use crate::client::types::Credentials;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("gateway address is empty")]
    EmptyAddress,

    #[error("pool size must be at least 1")]
    ZeroPoolSize,
}

/// Everything the service needs to open and maintain its sessions.
///
/// # Example
///
/// ```rust
/// use s2a::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::new("api.example.net:8000", "account", "secret")
///     .with_pool_size(4)
///     .with_checkout_timeout(Some(Duration::from_secs(5)));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Gateway `host:port`
    pub address: String,

    pub credentials: Credentials,

    /// Number of sessions opened at startup (default: 1)
    pub pool_size: usize,

    /// Reconnect policy for broken sessions
    pub retry: RetryConfig,

    /// Wait for a gateway response before treating the connection as dead
    /// (default: 30 seconds). `None` waits forever.
    pub read_timeout: Option<Duration>,

    /// Limit on establishing the TCP connection (default: 10 seconds)
    pub connect_timeout: Option<Duration>,

    /// Limit on waiting for a free session (default: wait forever)
    pub checkout_timeout: Option<Duration>,

    /// Expiry attached to every text sent through the service
    /// (default: 1 minute)
    pub message_expiry: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            credentials: Credentials::new("", ""),
            pool_size: 1,
            retry: RetryConfig::default(),
            read_timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            checkout_timeout: None,
            message_expiry: Some(Duration::from_secs(60)),
        }
    }
}

impl ServiceConfig {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            credentials: Credentials::new(username, password),
            ..Default::default()
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_checkout_timeout(mut self, checkout_timeout: Option<Duration>) -> Self {
        self.checkout_timeout = checkout_timeout;
        self
    }

    pub fn with_message_expiry(mut self, message_expiry: Option<Duration>) -> Self {
        self.message_expiry = message_expiry;
        self
    }

    /// Check the values that would otherwise only fail once connecting.
    pub fn validate(&self) -> crate::S2aResult<()> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::EmptyAddress.into());
        }
        if self.pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize.into());
        }
        self.credentials.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::S2aError;

    #[test]
    fn service_config_defaults() {
        let config = ServiceConfig::new("localhost:8000", "user", "pass");
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.retry.interval, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.checkout_timeout, None);
        assert_eq!(config.message_expiry, Some(Duration::from_secs(60)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn service_config_builder() {
        let config = ServiceConfig::new("localhost:8000", "user", "pass")
            .with_pool_size(5)
            .with_retry(RetryConfig::new(Duration::from_secs(2)))
            .with_read_timeout(None)
            .with_message_expiry(None);

        assert_eq!(config.pool_size, 5);
        assert_eq!(config.retry.interval, Duration::from_secs(2));
        assert_eq!(config.read_timeout, None);
        assert_eq!(config.message_expiry, None);
    }

    #[test]
    fn service_config_rejects_bad_values() {
        let err = ServiceConfig::new("", "user", "pass").validate().unwrap_err();
        assert!(matches!(err, S2aError::Config(ConfigError::EmptyAddress)));

        let err = ServiceConfig::new("localhost:8000", "user", "pass")
            .with_pool_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, S2aError::Config(ConfigError::ZeroPoolSize)));

        let err = ServiceConfig::new("localhost:8000", "username9", "pass")
            .validate()
            .unwrap_err();
        assert!(matches!(err, S2aError::Validation(_)));
    }
}
