// ABOUTME: Result-code registries for the ret_code byte of Socket-to-Air responses
// ABOUTME: Per-operation tables with a shared common table consulted as fallback

use num_enum::TryFromPrimitive;
use thiserror::Error;

/// Result codes returned for an `Authenticate` request.
#[derive(TryFromPrimitive, Error)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AuthStatus {
    #[error("Password error")]
    PasswordError = 1,
    #[error("The account not exist")]
    AccountNotExist = 2,
    #[error("Over the maximun allowed connection number")]
    TooManyConnections = 3,
    #[error("The account status not correct")]
    AccountStatusIncorrect = 4,
    #[error("get account data error")]
    AccountDataError = 5,
    #[error("get password data error")]
    PasswordDataError = 6,
    #[error("System error, try again later")]
    SystemError = 7,
}

/// Result codes returned for `SendText` and `SendInternationalText`.
#[derive(TryFromPrimitive, Error)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SendStatus {
    #[error("Country code format error")]
    CountryCodeFormat = 1,
    #[error("Coding format error")]
    CodingFormat = 2,
    #[error("Priority format error")]
    PriorityFormat = 3,
    #[error("Msg_content_len format error")]
    ContentLengthFormat = 4,
    #[error("Msg_content_len not the same with msg_content")]
    ContentLengthMismatch = 5,
    #[error("Telphone number format error")]
    TelephoneNumberFormat = 6,
    #[error("Transfer type format error")]
    TransferTypeFormat = 7,
    #[error("Limit time format error")]
    LimitTimeFormat = 8,
    #[error("Ordered time format error")]
    OrderedTimeFormat = 9,
    #[error("send to forign not allow now")]
    ForeignNotAllowed = 10,
    #[error("Message sending failure, try again")]
    SendFailure = 11,
    #[error("wappush url length is zero")]
    WapPushEmptyUrl = 13,
    #[error("wappush msg_content length bigger than 88")]
    WapPushContentTooLong = 14,
    #[error("message has 9-10 digits tel number")]
    ShortTelephoneNumber = 16,
}

/// Result codes returned for `CheckStatus`.
///
/// Several of these describe a message that is still in flight rather than a
/// failed one (`QueryIncomplete`, `SubmittedToSmsc`, `ReservedWaiting`).
/// Callers polling for a final state typically retry on those.
#[derive(TryFromPrimitive, Error)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    #[error("Mobile turn off/Mobile out of scope")]
    MobileUnreachable = 1,
    #[error("System contains no data")]
    NoData = 2,
    #[error("MessageID format error")]
    MessageIdFormat = 3,
    #[error("has send to SMC, query no complete")]
    QueryIncomplete = 4,
    #[error("Ordered time beyond xx hours")]
    OrderedTimeBeyondLimit = 5,
    #[error("Send binary data to pager")]
    BinaryToPager = 6,
    #[error("Code transfer fail")]
    CodeTransferFail = 7,
    #[error("telephone number or message content format error")]
    NumberOrContentFormat = 8,
    #[error("has expired at queue server")]
    ExpiredAtQueue = 9,
    #[error("SMC without the data OR over re-transmission time")]
    SmcWithoutData = 10,
    #[error("Message status unknown")]
    StatusUnknown = 15,
    #[error("Message sending failure")]
    SendFailure = 16,
    #[error("Message can not send to GSM/Pager")]
    Undeliverable = 17,
    #[error("other error")]
    Other = 18,
    #[error("Message is submitted to SMSC")]
    SubmittedToSmsc = 19,
    #[error("reserve message, waiting send")]
    ReservedWaiting = 20,
    #[error("reserve message, cancel send")]
    ReservedCancelled = 21,
    #[error("message content deny")]
    ContentDenied = 22,
    #[error("Message is barred by customer")]
    BarredByCustomer = 23,
}

impl CheckStatus {
    /// True when the message has not reached a final state yet.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            CheckStatus::MobileUnreachable
                | CheckStatus::NoData
                | CheckStatus::QueryIncomplete
                | CheckStatus::SubmittedToSmsc
                | CheckStatus::ReservedWaiting
        )
    }
}

/// Result codes any operation may return.
#[derive(TryFromPrimitive, Error)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommonStatus {
    #[error("Message length is smaller than definition")]
    MessageTooShort = 30,
    #[error("network error, try again")]
    NetworkError = 31,
    #[error("msg_type not know")]
    UnknownMessageType = 32,
    #[error("dataBase error")]
    DatabaseError = 40,
    #[error("System internal error, try again later")]
    InternalError = 41,
    #[error("ID/Password has not been checked")]
    NotAuthenticated = 50,
    #[error("ID/Password checking again")]
    AlreadyAuthenticated = 51,
    #[error("text Service not apply yet")]
    TextServiceNotApplied = 52,
    #[error("receive text service not apply yet")]
    ReceiveServiceNotApplied = 53,
    #[error("foreign message not apply yet")]
    ForeignServiceNotApplied = 58,
}

/// Selects the operation-specific table a response is classified against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResultTable {
    Authenticate,
    Send,
    Check,
}

/// A non-zero result code, resolved against the result tables.
///
/// `Display` is the gateway's own description of the code so it can be handed
/// straight to an outer caller.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum ResultError {
    #[error(transparent)]
    Authenticate(#[from] AuthStatus),

    #[error(transparent)]
    Send(#[from] SendStatus),

    #[error(transparent)]
    Check(#[from] CheckStatus),

    #[error(transparent)]
    Common(#[from] CommonStatus),

    /// The code is in neither the operation table nor the common table
    #[error("Unknown ret_code {0}")]
    UnknownCode(u8),
}

impl ResultError {
    /// The raw result code this error was classified from.
    pub fn code(&self) -> u8 {
        match self {
            ResultError::Authenticate(status) => *status as u8,
            ResultError::Send(status) => *status as u8,
            ResultError::Check(status) => *status as u8,
            ResultError::Common(status) => *status as u8,
            ResultError::UnknownCode(code) => *code,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ResultError::UnknownCode(_))
    }
}

/// Resolve a response's `ret_code`.
///
/// Zero is success and never looked up. Otherwise the operation table is
/// consulted first, then the common table.
pub fn classify_result(code: u8, table: ResultTable) -> Result<(), ResultError> {
    if code == 0 {
        return Ok(());
    }

    let specific = match table {
        ResultTable::Authenticate => AuthStatus::try_from(code).ok().map(ResultError::from),
        ResultTable::Send => SendStatus::try_from(code).ok().map(ResultError::from),
        ResultTable::Check => CheckStatus::try_from(code).ok().map(ResultError::from),
    };

    let error = specific
        .or_else(|| CommonStatus::try_from(code).ok().map(ResultError::from))
        .unwrap_or(ResultError::UnknownCode(code));

    Err(error)
}
