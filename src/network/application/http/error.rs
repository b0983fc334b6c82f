//! Error taxonomy of the HTTP client.

use crate::network::error::Error as NetworkError;
use crate::storage::error::Error as StorageError;

/// Why a fetch failed.
///
/// Transport errors end the current attempt, protocol errors end the whole
/// fetch, capacity errors mean a caller-supplied buffer is too small for the
/// real payload. None of them are retried.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// Resolve, connect, send or receive failed.
    Transport(NetworkError),
    /// The server's response could not be followed.
    Protocol(ProtocolError),
    /// A buffer was too small.
    Capacity(Capacity),
    /// The persistent-storage sink rejected a chunk or the final commit.
    Storage(StorageError),
    /// The redirect or resume budget was exhausted.
    Limit(Limit),
    /// The connectivity gate was not acquired in time.
    Unavailable,
}

/// A response the client refuses to follow.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProtocolError {
    /// The status line is missing or its code is outside 100-599.
    MalformedStatus,
    /// 4xx response.
    ClientError(u16),
    /// 5xx response.
    ServerError(u16),
    /// The peer closed before the blank line ending the headers.
    IncompleteHeaders,
    /// A redirect carried no `Location` header.
    MissingLocation,
    /// The `Location` value is neither a path nor an http(s) URL.
    BadLocation,
    /// A TLS request was redirected to plain `http`.
    InsecureRedirect,
    /// A plain request was redirected to `https` with no credential to verify it.
    RedirectRequiresTls,
    /// A ranged request was answered with something other than 206.
    RangeIgnored(u16),
}

/// The buffer that was too small.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Capacity {
    /// The assembled request does not fit the header buffer.
    Request,
    /// The response headers do not fit the header buffer.
    Headers,
    /// A redirect hostname is longer than the hostname arena.
    Hostname,
    /// A redirect path is longer than the path arena.
    Path,
    /// The in-memory body buffer has no room for the terminator.
    Body,
    /// The streaming scratch buffer is empty.
    Scratch,
}

/// The loop bound that was hit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Limit {
    Redirects,
    Resumes,
}

impl From<NetworkError> for Error {
    fn from(err: NetworkError) -> Self {
        Error::Transport(err)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<Capacity> for Error {
    fn from(err: Capacity) -> Self {
        Error::Capacity(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Transport(e) => defmt::write!(f, "Transport({})", e),
            Error::Protocol(e) => defmt::write!(f, "Protocol({})", e),
            Error::Capacity(e) => defmt::write!(f, "Capacity({})", e),
            Error::Storage(e) => defmt::write!(f, "Storage({})", e),
            Error::Limit(e) => defmt::write!(f, "Limit({})", e),
            Error::Unavailable => defmt::write!(f, "Unavailable"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ProtocolError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ProtocolError::MalformedStatus => defmt::write!(f, "MalformedStatus"),
            ProtocolError::ClientError(code) => defmt::write!(f, "ClientError({})", code),
            ProtocolError::ServerError(code) => defmt::write!(f, "ServerError({})", code),
            ProtocolError::IncompleteHeaders => defmt::write!(f, "IncompleteHeaders"),
            ProtocolError::MissingLocation => defmt::write!(f, "MissingLocation"),
            ProtocolError::BadLocation => defmt::write!(f, "BadLocation"),
            ProtocolError::InsecureRedirect => defmt::write!(f, "InsecureRedirect"),
            ProtocolError::RedirectRequiresTls => defmt::write!(f, "RedirectRequiresTls"),
            ProtocolError::RangeIgnored(code) => defmt::write!(f, "RangeIgnored({})", code),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Capacity {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Capacity::Request => defmt::write!(f, "Request"),
            Capacity::Headers => defmt::write!(f, "Headers"),
            Capacity::Hostname => defmt::write!(f, "Hostname"),
            Capacity::Path => defmt::write!(f, "Path"),
            Capacity::Body => defmt::write!(f, "Body"),
            Capacity::Scratch => defmt::write!(f, "Scratch"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Limit {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Limit::Redirects => defmt::write!(f, "Redirects"),
            Limit::Resumes => defmt::write!(f, "Resumes"),
        }
    }
}
