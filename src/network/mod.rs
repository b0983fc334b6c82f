//! A network abstraction layer for the sign's modem stack
//!
//! The HTTP core never touches a concrete socket API. It talks to the modem
//! through the traits in this module: a [`Stack`] that resolves hostnames and
//! opens sockets, and a [`Socket`] that can be configured for TLS, connected,
//! and then used as a plain byte [`Connection`].
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Connectivity gate shared by every network consumer
pub mod gate;

/// Protocol-specific client implementations
pub mod application;

use error::Error;

/// Re-exports of common traits
pub mod prelude {
    pub use super::gate::Gate;
    pub use super::{Close, Connection, Read, Socket, Stack, Write};
}

// Core synchronous traits
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug + Into<Error>;
    /// Read data from the connection
    ///
    /// `Ok(0)` means the peer closed the connection.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug + Into<Error>;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug + Into<Error>;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// Opaque identifier of a provisioned TLS credential set.
///
/// The core never looks inside the credential store; it only forwards the
/// tag to the socket's TLS configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecTag(pub u32);

#[cfg(feature = "defmt")]
impl defmt::Format for SecTag {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SecTag({})", self.0)
    }
}

/// Transport security for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// Plain TCP.
    Plain,
    /// TLS with peer verification against the given credential set.
    Tls(SecTag),
}

impl Security {
    /// Port used when a target does not name one.
    pub fn default_port(&self) -> u16 {
        match self {
            Security::Plain => 80,
            Security::Tls(_) => 443,
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Security::Tls(_))
    }
}

/// Peer certificate verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerVerify {
    None,
    Optional,
    Required,
}

/// A TLS option applied to an opened socket before it connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsOption<'a> {
    /// Peer certificate verification mode.
    PeerVerify(PeerVerify),
    /// Credential sets the handshake may use.
    SecTagList(&'a [SecTag]),
    /// Server name sent in SNI and checked against the peer certificate.
    Hostname(&'a str),
}

/// A socket opened by a [`Stack`], not yet connected.
pub trait Socket: Connection {
    /// Resolved peer address type of the owning stack.
    type Address;

    /// Apply a TLS option. Only valid on sockets opened with [`Security::Tls`].
    fn set_tls_option(&mut self, option: TlsOption<'_>) -> Result<(), Error>;

    /// Connect to a resolved peer.
    fn connect(&mut self, address: &Self::Address) -> Result<(), Error>;
}

/// The modem's socket API: name resolution and socket creation.
pub trait Stack {
    /// Resolved peer address.
    type Address;
    /// Socket type produced by [`Stack::open`].
    type Socket: Socket<Address = Self::Address>;
    /// Associated error type
    type Error: core::fmt::Debug + Into<Error>;

    /// Resolve `hostname` for a stream connection to `port`.
    fn resolve(&mut self, hostname: &str, port: u16) -> Result<Self::Address, Self::Error>;

    /// Open a stream socket for `address`, TLS-capable when `security` asks for it.
    fn open(
        &mut self,
        address: &Self::Address,
        security: Security,
    ) -> Result<Self::Socket, Self::Error>;
}
