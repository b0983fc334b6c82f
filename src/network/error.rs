//! Common error types for network operations

/// A common error type for network operations.
///
/// This enum defines the transport failures a socket stack can report. It is
/// designed to be simple and portable for `no_std` environments; every
/// socket trait's associated error converts into it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// The hostname could not be resolved to an address.
    ResolveFailed,
    /// The stack could not open a socket.
    SocketOpen,
    /// A TLS socket option was rejected.
    TlsSetup,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// A connection attempt was refused.
    ConnectionRefused,
    /// A timeout occurred.
    Timeout,
    /// The connection was closed.
    ConnectionClosed,
    /// An invalid address was provided.
    InvalidAddress,
    /// The modem's secure-socket receive buffer limit was exceeded.
    ///
    /// The bytes received so far are valid; the transfer can continue on a
    /// new connection with a byte-range request.
    MessageTooLarge,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::ResolveFailed => defmt::write!(f, "ResolveFailed"),
            Error::SocketOpen => defmt::write!(f, "SocketOpen"),
            Error::TlsSetup => defmt::write!(f, "TlsSetup"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::MessageTooLarge => defmt::write!(f, "MessageTooLarge"),
        }
    }
}
