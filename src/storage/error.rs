//! Common error types for storage operations

/// A common error type for storage operations.
///
/// This enum defines a set of common errors that can occur when writing a
/// downloaded image to persistent storage. It is designed to be simple and
/// portable for `no_std` environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on an address that is out of bounds.
    OutOfBounds,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// An error occurred during an erase operation.
    EraseError,
    /// An operation was attempted on a device that was not initialized.
    NotInitialized,
    /// The underlying storage is bad/unusable at a specific location
    StorageFault,
    /// A write arrived after the image was committed.
    AlreadyFinalized,
    /// The slot holds no committed image.
    NoImage,
    /// The committed image does not match its recorded checksum.
    ChecksumMismatch,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfBounds => defmt::write!(f, "OutOfBounds"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::EraseError => defmt::write!(f, "EraseError"),
            Error::NotInitialized => defmt::write!(f, "NotInitialized"),
            Error::StorageFault => defmt::write!(f, "StorageFault"),
            Error::AlreadyFinalized => defmt::write!(f, "AlreadyFinalized"),
            Error::NoImage => defmt::write!(f, "NoImage"),
            Error::ChecksumMismatch => defmt::write!(f, "ChecksumMismatch"),
        }
    }
}
