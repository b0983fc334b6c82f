//! Request target and request-head assembly.

use core::fmt::Write;

use heapless::String;

use super::error::Capacity;
use crate::network::Security;

/// Longest hostname a target can hold, redirects included.
pub const MAX_HOSTNAME_LEN: usize = 255;
/// Longest path a target can hold, redirects included.
pub const MAX_PATH_LEN: usize = 255;

/// Where a request goes.
///
/// The hostname and path live in fixed arenas so a redirect can rewrite them
/// in place; every rewrite checks the arena's capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    pub hostname: String<MAX_HOSTNAME_LEN>,
    pub port: u16,
    pub path: String<MAX_PATH_LEN>,
    pub security: Security,
    /// Media type sent in `Accept`.
    pub accept: &'a str,
}

impl<'a> RequestTarget<'a> {
    /// Build a target on the default port for `security`.
    pub fn new(
        hostname: &str,
        path: &str,
        security: Security,
        accept: &'a str,
    ) -> Result<Self, Capacity> {
        Ok(Self {
            hostname: String::try_from(hostname).map_err(|_| Capacity::Hostname)?,
            port: security.default_port(),
            path: String::try_from(path).map_err(|_| Capacity::Path)?,
            security,
            accept,
        })
    }
}

/// Values sent in the `User-Agent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAgent<'a> {
    /// Product token, e.g. `EDB`.
    pub product: &'a str,
    pub firmware_version: &'a str,
    /// Identifier of the stop this sign serves.
    pub device_id: &'a str,
}

/// `core::fmt::Write` over a fixed slice that fails instead of truncating.
struct SliceWriter<'b> {
    buf: &'b mut [u8],
    len: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            return Err(core::fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Assemble a GET request head for `target` into `buf` and return its length.
///
/// A `Range: bytes=<range_start>-` header is added only when `range_start`
/// is non-zero. Fails with [`Capacity::Request`] when the head does not fit.
pub fn build_request(
    target: &RequestTarget<'_>,
    agent: &UserAgent<'_>,
    range_start: u64,
    buf: &mut [u8],
) -> Result<usize, Capacity> {
    let mut w = SliceWriter { buf, len: 0 };
    write_head(&mut w, target, agent, range_start).map_err(|_| Capacity::Request)?;
    Ok(w.len)
}

fn write_head(
    w: &mut SliceWriter<'_>,
    target: &RequestTarget<'_>,
    agent: &UserAgent<'_>,
    range_start: u64,
) -> core::fmt::Result {
    write!(w, "GET {} HTTP/1.1\r\n", target.path)?;
    write!(w, "Host: {}:{}\r\n", target.hostname, target.port)?;
    write!(
        w,
        "User-Agent: {}/{} Stop-ID/{}\r\n",
        agent.product, agent.firmware_version, agent.device_id
    )?;
    if range_start > 0 {
        write!(w, "Range: bytes={}-\r\n", range_start)?;
    }
    write!(w, "Accept: {}\r\n", target.accept)?;
    w.write_str("Connection: close\r\n\r\n")
}
