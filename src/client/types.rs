// ABOUTME: Supporting types for Socket-to-Air operations including credentials and text messages
// ABOUTME: Validation limits live here so they are checked before any frame is encoded

use crate::client::error::ValidationError;
use crate::codec::CONTENT_CAPACITY;
use crate::datatypes::OperationType;
use std::fmt;
use std::time::Duration;

/// Longest username or password the gateway accepts
pub const MAX_CREDENTIAL_LEN: usize = 8;

/// Longest domestic mobile number
pub const MAX_DOMESTIC_RECIPIENT_LEN: usize = 10;

/// Longest international mobile number
pub const MAX_INTERNATIONAL_RECIPIENT_LEN: usize = 20;

/// Longest message body, one byte of the content block is the terminator
pub const MAX_MESSAGE_LEN: usize = CONTENT_CAPACITY - 1;

/// Longest expiry the gateway accepts, in minutes
pub const MAX_EXPIRY_MINUTES: u64 = 1440;

/// Gateway account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check both fields against the gateway's length limit
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.len() > MAX_CREDENTIAL_LEN {
            return Err(ValidationError::CredentialTooLong {
                field: "username",
                max: MAX_CREDENTIAL_LEN,
            });
        }
        if self.password.len() > MAX_CREDENTIAL_LEN {
            return Err(ValidationError::CredentialTooLong {
                field: "password",
                max: MAX_CREDENTIAL_LEN,
            });
        }
        Ok(())
    }
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Which numbering plan a recipient belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Destination {
    #[default]
    Domestic,
    International,
}

impl Destination {
    pub fn max_recipient_len(&self) -> usize {
        match self {
            Destination::Domestic => MAX_DOMESTIC_RECIPIENT_LEN,
            Destination::International => MAX_INTERNATIONAL_RECIPIENT_LEN,
        }
    }

    pub fn operation(&self) -> OperationType {
        match self {
            Destination::Domestic => OperationType::SendText,
            Destination::International => OperationType::SendInternationalText,
        }
    }
}

/// A text message to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub recipient: String,
    pub text: String,
    pub destination: Destination,
    /// How long the gateway keeps trying to deliver. `None` sends without an
    /// expiry.
    pub expiry: Option<Duration>,
}

impl TextMessage {
    /// A domestic message without expiry
    pub fn new(recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            text: text.into(),
            destination: Destination::Domestic,
            expiry: None,
        }
    }

    /// An international message without expiry
    pub fn international(recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            destination: Destination::International,
            ..Self::new(recipient, text)
        }
    }

    pub fn with_expiry(mut self, expiry: Option<Duration>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Validate all limits and return the expiry in whole minutes.
    pub fn validate(&self) -> Result<Option<u16>, ValidationError> {
        if self.recipient.is_empty() {
            return Err(ValidationError::EmptyRecipient);
        }
        let max = self.destination.max_recipient_len();
        if self.recipient.len() > max {
            return Err(ValidationError::RecipientTooLong { max });
        }
        if self.text.len() > MAX_MESSAGE_LEN {
            return Err(ValidationError::MessageTooLong {
                max: MAX_MESSAGE_LEN,
            });
        }

        let Some(expiry) = self.expiry else {
            return Ok(None);
        };
        let minutes = expiry.as_secs() / 60;
        if !(1..=MAX_EXPIRY_MINUTES).contains(&minutes) {
            return Err(ValidationError::ExpiryOutOfRange {
                minutes,
                max: MAX_EXPIRY_MINUTES,
            });
        }
        // Bounded by MAX_EXPIRY_MINUTES above
        Ok(Some(minutes as u16))
    }
}

/// Outcome of a status query, shaped for an RPC reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStatus {
    pub success: bool,
    pub error: String,
}

impl TextStatus {
    pub fn delivered() -> Self {
        Self {
            success: true,
            error: String::new(),
        }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_length_boundary() {
        assert!(Credentials::new("a".repeat(8), "b".repeat(8)).validate().is_ok());
        assert_eq!(
            Credentials::new("a".repeat(9), "b").validate(),
            Err(ValidationError::CredentialTooLong {
                field: "username",
                max: 8
            })
        );
        assert_eq!(
            Credentials::new("a", "b".repeat(9)).validate(),
            Err(ValidationError::CredentialTooLong {
                field: "password",
                max: 8
            })
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("user", "secret"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn recipient_limits_depend_on_destination() {
        assert!(TextMessage::new("0912345678", "hi").validate().is_ok());
        assert_eq!(
            TextMessage::new("09123456789", "hi").validate(),
            Err(ValidationError::RecipientTooLong { max: 10 })
        );
        assert!(TextMessage::international("8".repeat(20), "hi").validate().is_ok());
        assert_eq!(
            TextMessage::international("8".repeat(21), "hi").validate(),
            Err(ValidationError::RecipientTooLong { max: 20 })
        );
        assert_eq!(
            TextMessage::new("", "hi").validate(),
            Err(ValidationError::EmptyRecipient)
        );
    }

    #[test]
    fn message_length_boundary() {
        assert!(TextMessage::new("1", "a".repeat(159)).validate().is_ok());
        assert_eq!(
            TextMessage::new("1", "a".repeat(160)).validate(),
            Err(ValidationError::MessageTooLong { max: 159 })
        );
    }

    #[test]
    fn expiry_is_converted_to_minutes() {
        let msg = TextMessage::new("1", "a").with_expiry(Some(Duration::from_secs(90)));
        assert_eq!(msg.validate(), Ok(Some(1)));

        let msg = TextMessage::new("1", "a").with_expiry(Some(Duration::from_secs(1440 * 60)));
        assert_eq!(msg.validate(), Ok(Some(1440)));

        let msg = TextMessage::new("1", "a").with_expiry(Some(Duration::from_secs(1441 * 60)));
        assert_eq!(
            msg.validate(),
            Err(ValidationError::ExpiryOutOfRange {
                minutes: 1441,
                max: 1440
            })
        );

        let msg = TextMessage::new("1", "a").with_expiry(Some(Duration::from_secs(30)));
        assert!(matches!(
            msg.validate(),
            Err(ValidationError::ExpiryOutOfRange { minutes: 0, .. })
        ));
    }

    #[test]
    fn destination_selects_operation() {
        assert_eq!(Destination::Domestic.operation(), OperationType::SendText);
        assert_eq!(
            Destination::International.operation(),
            OperationType::SendInternationalText
        );
    }
}
