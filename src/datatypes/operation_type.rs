// ABOUTME: Defines the Socket-to-Air msg_type byte identifying the requested gateway operation
// ABOUTME: Includes operations the gateway restricts so inbound frames can still be decoded

use num_enum::TryFromPrimitive;

/// The `msg_type` field of an outbound frame.
///
/// Only `Authenticate`, `SendText`, `SendInternationalText` and `CheckStatus`
/// are issued by this crate. The remaining values are part of the protocol
/// and are kept so that frames carrying them decode cleanly.
///
/// International texts are queried with `CheckStatus`; the gateway has no
/// separate check operation for them.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Account/password check, must be the first exchange on a connection
    Authenticate = 0,
    /// Send a domestic text message
    SendText = 1,
    /// Query the delivery result of a text message
    CheckStatus = 2,
    /// Receive a text message (not open to regular accounts)
    ReceiveText = 3,
    /// Send a WAP push
    SendWapPush = 13,
    /// Query the delivery result of a WAP push
    CheckWapPush = 14,
    /// Send an international text message
    SendInternationalText = 15,
    /// Cancel a scheduled text message
    CancelScheduledText = 16,
}

impl OperationType {
    /// Returns true for the operations that submit a text message.
    pub fn is_send(&self) -> bool {
        matches!(self, OperationType::SendText | OperationType::SendInternationalText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_type_wire_values() {
        assert_eq!(OperationType::Authenticate as u8, 0);
        assert_eq!(OperationType::CheckStatus as u8, 2);
        assert_eq!(OperationType::SendInternationalText as u8, 15);
        assert_eq!(OperationType::CancelScheduledText as u8, 16);
    }

    #[test]
    fn operation_type_rejects_unassigned_values() {
        assert_eq!(OperationType::try_from(13), Ok(OperationType::SendWapPush));
        assert!(OperationType::try_from(4).is_err());
        assert!(OperationType::try_from(255).is_err());
    }
}
