// Socket-to-Air codec - fixed-layout frame encoding and decoding
//
// Every frame on the wire has a fixed size per direction. Variable-length
// strings are packed into fixed-capacity blocks and the unused tail is zero
// filled, so encoding never depends on payload length.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error;

/// Capacity of the `msg_set` block of an outbound frame
pub const PARAMS_CAPACITY: usize = 100;

/// Capacity of the `msg_content` block of an outbound frame
pub const CONTENT_CAPACITY: usize = 160;

/// Capacity of the `ret_set` block of an inbound frame
pub const RESULT_PARAMS_CAPACITY: usize = 80;

/// Capacity of the `ret_content` block of an inbound frame
pub const RESULT_CONTENT_CAPACITY: usize = 160;

/// Trait for frames that can be written to the wire
pub trait Encodable {
    /// Encode this frame to the buffer
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError>;

    /// Size of the encoded frame. Frames are fixed size, so this never
    /// depends on the payload.
    fn encoded_size(&self) -> usize;

    /// Convert this frame to bytes (convenience method)
    fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Trait for frames that can be read from the wire
pub trait Decodable: Sized {
    /// Exact number of bytes one frame occupies on the wire
    const SIZE: usize;

    /// Decode one frame from the buffer, advancing it by `SIZE` bytes
    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError>;

    /// Check that a whole frame is buffered without consuming anything
    fn check(buf: &Cursor<&[u8]>) -> Result<(), CodecError> {
        if buf.remaining() < Self::SIZE {
            return Err(CodecError::ShortFrame {
                expected: Self::SIZE,
                actual: buf.remaining(),
            });
        }
        Ok(())
    }

    /// Decode a frame from the start of a byte slice
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut cursor = Cursor::new(bytes);
        Self::decode(&mut cursor)
    }
}

/// Codec errors with detailed context for debugging
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Short frame: need {expected} bytes, have {actual}")]
    ShortFrame { expected: usize, actual: usize },

    #[error("Field '{field}' too long: {len} bytes, capacity {capacity}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("Unknown msg_type: {0}")]
    UnknownOperation(u8),

    #[error("Unknown msg_coding: {0}")]
    UnknownCoding(u8),
}

/// Copy `src` into the start of a fixed-capacity block.
///
/// Returns the number of bytes written. The rest of the block is left as is,
/// callers start from a zeroed block.
pub fn fill_block(block: &mut [u8], src: &[u8], field: &'static str) -> Result<u8, CodecError> {
    if src.len() > block.len() {
        return Err(CodecError::FieldTooLong {
            field,
            len: src.len(),
            capacity: block.len(),
        });
    }
    block[..src.len()].copy_from_slice(src);
    // Block capacities are all below 256
    Ok(src.len() as u8)
}

/// Append a null-terminated sub-field to a packed parameter buffer
pub fn put_cstring(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
}

/// Validate a recorded length byte against its block capacity
pub fn check_length(field: &'static str, len: u8, capacity: usize) -> Result<(), CodecError> {
    if len as usize > capacity {
        return Err(CodecError::FieldTooLong {
            field,
            len: len as usize,
            capacity,
        });
    }
    Ok(())
}

/// Read a fixed-capacity block. The caller must have checked the frame size.
pub fn get_block<const N: usize>(buf: &mut Cursor<&[u8]>) -> [u8; N] {
    let mut block = [0u8; N];
    buf.copy_to_slice(&mut block);
    block
}

/// The meaningful prefix of a block, clamped to its capacity
pub fn block_prefix(block: &[u8], len: u8) -> &[u8] {
    &block[..(len as usize).min(block.len())]
}
