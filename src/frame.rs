//! Socket-to-Air frame layouts
//!
//! ```text
//! outbound (266 bytes)
//!   msg_type:1 msg_coding:1 msg_priority:1 msg_country_code:1
//!   msg_set_len:1 msg_content_len:1 msg_set:100 msg_content:160
//!
//! inbound (244 bytes)
//!   ret_code:1 ret_coding:1 ret_set_len:1 ret_content_len:1
//!   ret_set:80 ret_content:160
//! ```
//!
//! All fields are single bytes or byte blocks, so byte order never comes into
//! play beyond field order.

use crate::codec::{
    CONTENT_CAPACITY, CodecError, Decodable, Encodable, PARAMS_CAPACITY, RESULT_CONTENT_CAPACITY,
    RESULT_PARAMS_CAPACITY, block_prefix, check_length, fill_block, get_block, put_cstring,
};
use crate::datatypes::{Coding, OperationType};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use std::io::Cursor;

/// Transfer type marker for a text sent immediately without expiry
const TRANSFER_IMMEDIATE: &str = "01";

/// Transfer type marker for a text sent immediately with an expiry
const TRANSFER_WITH_EXPIRY: &str = "02";

/// A request frame.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub operation: OperationType,
    pub coding: Coding,
    /// Reserved by the gateway, always zero
    pub priority: u8,
    /// Reserved by the gateway, always zero
    pub country_code: u8,
    pub params_len: u8,
    pub content_len: u8,
    pub params: [u8; PARAMS_CAPACITY],
    pub content: [u8; CONTENT_CAPACITY],
}

impl OutboundFrame {
    pub const SIZE: usize = 6 + PARAMS_CAPACITY + CONTENT_CAPACITY;

    /// An empty frame for `operation`.
    pub fn new(operation: OperationType, coding: Coding) -> Self {
        Self {
            operation,
            coding,
            priority: 0,
            country_code: 0,
            params_len: 0,
            content_len: 0,
            params: [0; PARAMS_CAPACITY],
            content: [0; CONTENT_CAPACITY],
        }
    }

    /// Authentication request: `username\0password\0`, both terminators
    /// counted in `params_len`.
    pub fn authenticate(username: &str, password: &str) -> Result<Self, CodecError> {
        let mut packed = BytesMut::with_capacity(username.len() + password.len() + 2);
        put_cstring(&mut packed, username);
        put_cstring(&mut packed, password);

        let mut frame = Self::new(OperationType::Authenticate, Coding::Big5);
        frame.params_len = fill_block(&mut frame.params, &packed, "credentials")?;
        Ok(frame)
    }

    /// Text submission.
    ///
    /// `params` holds `recipient\0` followed by the transfer type, `01\0` for
    /// an immediate send or `02\0` plus the expiry minutes right-aligned in a
    /// four character field for a send with expiry. The message is written
    /// with its terminator, which `content_len` does not count.
    pub fn send_text(
        operation: OperationType,
        coding: Coding,
        recipient: &str,
        message: &str,
        expiry_minutes: Option<u16>,
    ) -> Result<Self, CodecError> {
        let mut packed = BytesMut::with_capacity(recipient.len() + 9);
        put_cstring(&mut packed, recipient);
        match expiry_minutes {
            None => put_cstring(&mut packed, TRANSFER_IMMEDIATE),
            Some(minutes) => {
                put_cstring(&mut packed, TRANSFER_WITH_EXPIRY);
                put_cstring(&mut packed, &format!("{minutes:4}"));
            }
        }

        let mut body = BytesMut::with_capacity(message.len() + 1);
        put_cstring(&mut body, message);

        let mut frame = Self::new(operation, coding);
        frame.params_len = fill_block(&mut frame.params, &packed, "recipient")?;
        frame.content_len = fill_block(&mut frame.content, &body, "message")? - 1;
        Ok(frame)
    }

    /// Status query: `message_id\0`, terminator counted.
    pub fn check_status(message_id: &str) -> Result<Self, CodecError> {
        let mut packed = BytesMut::with_capacity(message_id.len() + 1);
        put_cstring(&mut packed, message_id);

        let mut frame = Self::new(OperationType::CheckStatus, Coding::Big5);
        frame.params_len = fill_block(&mut frame.params, &packed, "message_id")?;
        Ok(frame)
    }

    /// The meaningful part of the params block
    pub fn params(&self) -> &[u8] {
        block_prefix(&self.params, self.params_len)
    }

    /// The meaningful part of the content block
    pub fn content(&self) -> &[u8] {
        block_prefix(&self.content, self.content_len)
    }

    /// Split the params block into its null-terminated sub-fields
    pub fn param_fields(&self) -> Vec<String> {
        let params = self.params();
        if params.is_empty() {
            return Vec::new();
        }
        params
            .strip_suffix(&[0])
            .unwrap_or(params)
            .split(|&b| b == 0)
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect()
    }
}

impl Encodable for OutboundFrame {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        check_length("msg_set_len", self.params_len, PARAMS_CAPACITY)?;
        check_length("msg_content_len", self.content_len, CONTENT_CAPACITY)?;

        buf.reserve(Self::SIZE);
        buf.put_u8(self.operation as u8);
        buf.put_u8(self.coding as u8);
        buf.put_u8(self.priority);
        buf.put_u8(self.country_code);
        buf.put_u8(self.params_len);
        buf.put_u8(self.content_len);
        buf.put_slice(&self.params);
        buf.put_slice(&self.content);
        Ok(())
    }

    fn encoded_size(&self) -> usize {
        Self::SIZE
    }
}

impl Decodable for OutboundFrame {
    const SIZE: usize = OutboundFrame::SIZE;

    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::check(buf)?;

        let operation_raw = buf.get_u8();
        let operation = OperationType::try_from(operation_raw)
            .map_err(|_| CodecError::UnknownOperation(operation_raw))?;
        let coding_raw = buf.get_u8();
        let coding =
            Coding::try_from(coding_raw).map_err(|_| CodecError::UnknownCoding(coding_raw))?;

        Ok(Self {
            operation,
            coding,
            priority: buf.get_u8(),
            country_code: buf.get_u8(),
            params_len: buf.get_u8(),
            content_len: buf.get_u8(),
            params: get_block(buf),
            content: get_block(buf),
        })
    }
}

impl fmt::Debug for OutboundFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundFrame")
            .field("operation", &self.operation)
            .field("coding", &self.coding)
            .field("params_len", &self.params_len)
            .field("content_len", &self.content_len)
            .field("params", &Bytes::copy_from_slice(self.params()))
            .field("content", &Bytes::copy_from_slice(self.content()))
            .finish()
    }
}

/// A response frame.
#[derive(Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Zero on success, otherwise looked up in the result tables
    pub result_code: u8,
    pub result_coding: u8,
    pub result_params_len: u8,
    pub result_content_len: u8,
    pub result_params: [u8; RESULT_PARAMS_CAPACITY],
    pub result_content: [u8; RESULT_CONTENT_CAPACITY],
}

impl InboundFrame {
    pub const SIZE: usize = 4 + RESULT_PARAMS_CAPACITY + RESULT_CONTENT_CAPACITY;

    pub fn new(result_code: u8) -> Self {
        Self {
            result_code,
            result_coding: 0,
            result_params_len: 0,
            result_content_len: 0,
            result_params: [0; RESULT_PARAMS_CAPACITY],
            result_content: [0; RESULT_CONTENT_CAPACITY],
        }
    }

    /// A response carrying `content`, as the gateway returns a message id.
    pub fn with_content(result_code: u8, content: &str) -> Result<Self, CodecError> {
        let mut frame = Self::new(result_code);
        frame.result_content_len =
            fill_block(&mut frame.result_content, content.as_bytes(), "ret_content")?;
        Ok(frame)
    }

    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// The meaningful part of the result params block
    pub fn result_params(&self) -> &[u8] {
        block_prefix(&self.result_params, self.result_params_len)
    }

    /// The meaningful part of the result content block
    pub fn result_content(&self) -> &[u8] {
        block_prefix(&self.result_content, self.result_content_len)
    }

    /// The result content as text, replacing invalid UTF-8
    pub fn content_text(&self) -> String {
        String::from_utf8_lossy(self.result_content()).into_owned()
    }
}

impl Encodable for InboundFrame {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        check_length("ret_set_len", self.result_params_len, RESULT_PARAMS_CAPACITY)?;
        check_length("ret_content_len", self.result_content_len, RESULT_CONTENT_CAPACITY)?;

        buf.reserve(Self::SIZE);
        buf.put_u8(self.result_code);
        buf.put_u8(self.result_coding);
        buf.put_u8(self.result_params_len);
        buf.put_u8(self.result_content_len);
        buf.put_slice(&self.result_params);
        buf.put_slice(&self.result_content);
        Ok(())
    }

    fn encoded_size(&self) -> usize {
        Self::SIZE
    }
}

impl Decodable for InboundFrame {
    const SIZE: usize = InboundFrame::SIZE;

    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::check(buf)?;

        Ok(Self {
            result_code: buf.get_u8(),
            result_coding: buf.get_u8(),
            result_params_len: buf.get_u8(),
            result_content_len: buf.get_u8(),
            result_params: get_block(buf),
            result_content: get_block(buf),
        })
    }
}

impl fmt::Debug for InboundFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundFrame")
            .field("result_code", &self.result_code)
            .field("result_coding", &self.result_coding)
            .field("result_params", &Bytes::copy_from_slice(self.result_params()))
            .field("result_content", &Bytes::copy_from_slice(self.result_content()))
            .finish()
    }
}
