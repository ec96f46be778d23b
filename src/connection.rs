// ABOUTME: Provides TCP connection management for Socket-to-Air frame exchange
// ABOUTME: Implements fixed-size frame I/O with buffering and an optional response deadline

use crate::client::error::{S2aError, S2aResult};
use crate::codec::{Decodable, Encodable};
use crate::frame::{InboundFrame, OutboundFrame};
use bytes::{Buf, BytesMut};
use std::io::Cursor;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::debug;

/// Frame-level transport for one gateway connection.
///
/// The protocol carries no correlation identifier, so the connection is
/// strictly request/response: one frame written, one frame read. It does not
/// track authentication state, that is the session's job.
#[derive(Debug)]
pub struct Connection {
    // Write-buffered so a 266 byte frame goes out in a single flush.
    stream: BufWriter<TcpStream>,

    // The buffer for reading frames.
    buffer: BytesMut,

    read_timeout: Option<Duration>,
}

impl Connection {
    /// Create a new `Connection`, backed by `socket`.
    pub fn new(socket: TcpStream) -> Connection {
        Connection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(InboundFrame::SIZE * 2),
            read_timeout: None,
        }
    }

    /// Bound how long `read_frame` waits for a response. `None` waits forever.
    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Connection {
        self.read_timeout = read_timeout;
        self
    }

    /// Send one request and wait for its response.
    pub async fn exchange(&mut self, frame: &OutboundFrame) -> S2aResult<InboundFrame> {
        self.write_frame(frame).await?;
        self.read_frame().await
    }

    /// Write a single frame and flush it to the socket.
    pub async fn write_frame(&mut self, frame: &OutboundFrame) -> S2aResult<()> {
        debug!("-> {:?}", frame);
        let bytes = frame.to_bytes()?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read a single response frame, honouring the read timeout.
    pub async fn read_frame(&mut self) -> S2aResult<InboundFrame> {
        let frame = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_frame_unbounded())
                .await
                .map_err(|_| S2aError::Timeout)??,
            None => self.read_frame_unbounded().await?,
        };
        debug!("<- {:?}", frame);
        Ok(frame)
    }

    async fn read_frame_unbounded(&mut self) -> S2aResult<InboundFrame> {
        loop {
            if let Some(frame) = self.parse_frame()? {
                return Ok(frame);
            }

            // `0` indicates "end of stream". A response is always expected
            // here, so any close is premature whether or not part of a frame
            // was buffered.
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if !self.buffer.is_empty() {
                    debug!(
                        "peer closed with {} of {} response bytes buffered",
                        self.buffer.len(),
                        InboundFrame::SIZE
                    );
                }
                return Err(S2aError::ConnectionClosed);
            }
        }
    }

    /// Parse a frame out of the buffer if a whole one has arrived.
    fn parse_frame(&mut self) -> S2aResult<Option<InboundFrame>> {
        let mut buf = Cursor::new(&self.buffer[..]);
        if InboundFrame::check(&buf).is_err() {
            return Ok(None);
        }

        // Frames are fixed size, a malformed one is skipped whole
        let frame = InboundFrame::decode(&mut buf);
        self.buffer.advance(InboundFrame::SIZE);
        Ok(Some(frame?))
    }

    /// Shut down the write half. Errors are irrelevant since the connection
    /// is discarded afterwards.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("shutdown: {e}");
        }
    }
}
