//! Byte-at-a-time response header reader.

use super::error::{Capacity, Error, ProtocolError};
use super::status::Status;
use crate::network::Read;

/// Blank-line scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Inside a line.
    Line,
    /// Seen `\r`.
    Cr,
    /// Seen `\r\n`.
    CrLf,
    /// Seen `\r\n\r`.
    CrLfCr,
    /// Seen `\r\n\r\n`.
    End,
}

impl Scan {
    fn next(self, byte: u8) -> Scan {
        match (self, byte) {
            (Scan::CrLf, b'\r') => Scan::CrLfCr,
            (_, b'\r') => Scan::Cr,
            (Scan::Cr, b'\n') => Scan::CrLf,
            (Scan::CrLfCr, b'\n') => Scan::End,
            _ => Scan::Line,
        }
    }
}

const TERMINATOR_LEN: usize = 4;

/// Caller-supplied buffer holding the raw header text of one attempt.
///
/// The same buffer carries the outgoing request head before it is
/// overwritten by the response headers. After a successful
/// [`receive`](HeaderBlock::receive) the text is followed by the
/// `\r\n\r\n` terminator and a NUL byte.
#[derive(Debug)]
pub struct HeaderBlock<'b> {
    buf: &'b mut [u8],
    len: usize,
}

impl<'b> HeaderBlock<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// The whole buffer, for assembling a request head.
    pub fn as_mut_buf(&mut self) -> &mut [u8] {
        self.len = 0;
        self.buf
    }

    /// The whole buffer, read-only.
    pub fn as_buf(&self) -> &[u8] {
        self.buf
    }

    /// Header text before the terminator.
    pub fn text(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Length of the header text before the terminator.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read headers from `conn` one byte at a time and classify the status line.
    ///
    /// Stops at the first `\r\n\r\n` so no body byte is consumed.
    pub fn receive<R: Read>(&mut self, conn: &mut R) -> Result<Status, Error> {
        self.len = 0;
        let mut scan = Scan::Line;
        let mut pos = 0;

        while scan != Scan::End {
            if pos >= self.buf.len() {
                error!("Response headers exceed {} byte buffer", self.buf.len());
                return Err(Capacity::Headers.into());
            }
            let n = conn
                .read(&mut self.buf[pos..pos + 1])
                .map_err(|e| Error::Transport(e.into()))?;
            if n == 0 {
                error!("Connection closed after {} header bytes", pos);
                return Err(ProtocolError::IncompleteHeaders.into());
            }
            scan = scan.next(self.buf[pos]);
            pos += 1;
        }

        // Room for the sentinel is part of the buffer contract.
        if pos >= self.buf.len() {
            return Err(Capacity::Headers.into());
        }
        self.buf[pos] = 0;
        self.len = pos - TERMINATOR_LEN;
        info!("Received headers. Size: {} bytes", self.len);

        let status = Status::parse(self.text());
        debug!("Status {} ({:?})", status.code, status.class);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::super::status::StatusClass;
    use super::*;
    use crate::network::error::Error as NetworkError;

    struct Bytes<'a> {
        data: &'a [u8],
        pos: usize,
    }

    impl Read for Bytes<'_> {
        type Error = NetworkError;
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_stops_at_first_blank_line() {
        let data = b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\n\r\nbody\r\n\r\nx";
        let mut conn = Bytes { data, pos: 0 };
        let mut buf = [0xAAu8; 128];
        let mut block = HeaderBlock::new(&mut buf);

        let status = block.receive(&mut conn).unwrap();
        assert_eq!(status.class, StatusClass::Success);
        assert_eq!(block.text(), b"HTTP/1.1 200 OK\r\nContent-Length: 9");
        assert_eq!(&data[conn.pos..], b"body\r\n\r\nx");
        let end = block.len() + TERMINATOR_LEN;
        assert_eq!(&block.as_buf()[end - 4..=end], b"\r\n\r\n\0");
    }

    #[test]
    fn test_bare_cr_does_not_terminate() {
        let data = b"HTTP/1.1 204 No Content\r\nX: a\r\r\n\r\n";
        let mut conn = Bytes { data, pos: 0 };
        let mut buf = [0u8; 64];
        let mut block = HeaderBlock::new(&mut buf);
        block.receive(&mut conn).unwrap();
        assert_eq!(block.text(), b"HTTP/1.1 204 No Content\r\nX: a\r");
    }

    #[test]
    fn test_peer_close_mid_headers() {
        let mut conn = Bytes {
            data: b"HTTP/1.1 200 OK\r\nX: 1\r\n",
            pos: 0,
        };
        let mut buf = [0u8; 64];
        let mut block = HeaderBlock::new(&mut buf);
        assert_eq!(
            block.receive(&mut conn),
            Err(Error::Protocol(ProtocolError::IncompleteHeaders))
        );
    }

    #[test]
    fn test_headers_larger_than_buffer() {
        let mut conn = Bytes {
            data: b"HTTP/1.1 200 OK\r\nServer: something-long\r\n\r\n",
            pos: 0,
        };
        let mut buf = [0u8; 16];
        let mut block = HeaderBlock::new(&mut buf);
        assert_eq!(
            block.receive(&mut conn),
            Err(Error::Capacity(Capacity::Headers))
        );
    }

    #[test]
    fn test_no_room_for_sentinel() {
        let data = b"HTTP/1.1 200 OK\r\n\r\n";
        let mut conn = Bytes { data, pos: 0 };
        let mut buf = [0u8; 19];
        let mut block = HeaderBlock::new(&mut buf);
        assert_eq!(
            block.receive(&mut conn),
            Err(Error::Capacity(Capacity::Headers))
        );
    }

    #[test]
    fn test_random_bodies_never_consumed() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let head = b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\r\n";
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut data = head.to_vec();
            let body_len = rng.gen_range(0..64);
            // Bias towards CR and LF so the body holds terminator-like runs.
            data.extend((0..body_len).map(|_| match rng.gen_range(0..4) {
                0 => b'\r',
                1 => b'\n',
                _ => rng.r#gen::<u8>(),
            }));

            let mut conn = Bytes { data: &data, pos: 0 };
            let mut buf = [0u8; 128];
            let mut block = HeaderBlock::new(&mut buf);
            block.receive(&mut conn).unwrap();
            assert_eq!(conn.pos, head.len());
            assert_eq!(block.len(), head.len() - TERMINATOR_LEN);
        }
    }
}
