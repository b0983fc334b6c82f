//! Response body transfer into memory or into a persistent-storage sink.

use super::error::{Capacity, Error};
use crate::network::Read;
use crate::network::error::Error as NetworkError;
use crate::storage::error::Error as StorageError;

/// Destination for a streamed body, typically a flash image slot.
///
/// The sink sees every non-empty chunk in order and exactly one
/// [`finalize`](Sink::finalize) at the clean end of the whole logical body.
/// Nothing written before `finalize` may read back as a complete image.
pub trait Sink {
    /// Accept the next chunk of the body.
    fn write(&mut self, chunk: &[u8]) -> Result<(), StorageError>;

    /// Flush buffered data and commit the body.
    fn finalize(&mut self) -> Result<(), StorageError>;

    /// Discard everything written so far; the body starts again at offset 0.
    fn rewind(&mut self) -> Result<(), StorageError>;
}

/// Where received body bytes go. Fixed for one fetch.
pub enum TransferMode<'a> {
    /// Collect the body in a caller buffer, NUL-terminated.
    InMemory(&'a mut [u8]),
    /// Forward the body chunk by chunk through `scratch` into `sink`.
    Streaming {
        sink: &'a mut dyn Sink,
        scratch: &'a mut [u8],
    },
}

impl core::fmt::Debug for TransferMode<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransferMode::InMemory(buf) => f
                .debug_struct("InMemory")
                .field("capacity", &buf.len())
                .finish(),
            TransferMode::Streaming { scratch, .. } => f
                .debug_struct("Streaming")
                .field("scratch", &scratch.len())
                .finish(),
        }
    }
}

/// How a body transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOutcome {
    /// The peer closed the connection; the value is the body length.
    ///
    /// In memory this is the position of the terminating NUL. When streaming
    /// it is the total offset including any resumed prefix.
    Complete(u64),
    /// The modem's secure-socket buffer limit was hit after this many bytes
    /// of the logical body. The sink has not been finalized.
    Interrupted(u64),
}

/// Read the rest of the response from `conn` according to `mode`.
///
/// `offset` is where this transfer starts within the logical body: zero on a
/// fresh request, the range start on a resumed one.
pub fn receive_body<R: Read>(
    conn: &mut R,
    mode: &mut TransferMode<'_>,
    offset: u64,
) -> Result<BodyOutcome, Error> {
    match mode {
        TransferMode::InMemory(buf) => receive_in_memory(conn, buf),
        TransferMode::Streaming { sink, scratch } => {
            stream_to_sink(conn, &mut **sink, scratch, offset)
        }
    }
}

fn receive_in_memory<R: Read>(conn: &mut R, buf: &mut [u8]) -> Result<BodyOutcome, Error> {
    if buf.is_empty() {
        return Err(Capacity::Body.into());
    }

    let mut offset = 0;
    while offset < buf.len() {
        match conn.read(&mut buf[offset..]) {
            Ok(0) => break,
            Ok(n) => {
                offset += n;
                trace!("recv bytes: {}, total: {}", n, offset);
            }
            Err(e) => {
                let err: NetworkError = e.into();
                error!("recv() body failed: {:?}", err);
                return Err(Error::Transport(err));
            }
        }
    }

    let end = if offset < buf.len() {
        offset
    } else {
        warn!("Body filled the {} byte buffer; truncating", buf.len());
        buf.len() - 1
    };
    buf[end] = 0;
    info!("Received body. Size: {} bytes", end);
    Ok(BodyOutcome::Complete(end as u64))
}

fn stream_to_sink<R: Read>(
    conn: &mut R,
    sink: &mut dyn Sink,
    scratch: &mut [u8],
    mut offset: u64,
) -> Result<BodyOutcome, Error> {
    if scratch.is_empty() {
        return Err(Capacity::Scratch.into());
    }

    loop {
        let n = match conn.read(scratch) {
            Ok(n) => n,
            Err(e) => {
                let err: NetworkError = e.into();
                if err == NetworkError::MessageTooLarge {
                    warn!(
                        "Modem secure socket buffer limit reached; resuming at byte {}",
                        offset
                    );
                    return Ok(BodyOutcome::Interrupted(offset));
                }
                error!("recv() body failed: {:?}", err);
                return Err(Error::Transport(err));
            }
        };
        if n == 0 {
            break;
        }
        sink.write(&scratch[..n]).map_err(|e| {
            error!("Sink rejected {} bytes at offset {}: {:?}", n, offset, e);
            Error::Storage(e)
        })?;
        offset += n as u64;
        debug!("recv bytes: {}, total: {}", n, offset);
    }

    sink.finalize().map_err(|e| {
        error!("Sink finalize failed: {:?}", e);
        Error::Storage(e)
    })?;
    info!("Received body. Size: {} bytes", offset);
    Ok(BodyOutcome::Complete(offset))
}
