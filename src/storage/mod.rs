//! # Storage abstraction layer for the sign's firmware slot
//!
//! Downloaded firmware images are streamed into persistent storage, usually
//! the secondary image slot in internal or external NOR flash. This module
//! provides the traits the image writer in [`crate::ota`] is written against,
//! so the same code runs on a flash driver or on a RAM mock in tests.
//!
//! # Core Traits
//!
//! - [`ReadStorage`]: Read data from storage
//! - [`Storage`]: Read and write operations
//! - [`BlockingErase`]: Synchronous erase operations
//! - [`Region`]: Memory region management
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use transit_sign::storage::{Storage, BlockingErase};
//!
//! fn update_firmware_block<S: Storage + BlockingErase>(
//!     storage: &mut S,
//!     start_addr: u32,
//!     end_addr: u32,
//!     new_data: &[u8]
//! ) -> Result<(), S::Error> {
//!     // Erase the region first
//!     storage.erase(start_addr, end_addr)?;
//!     // Write new data
//!     storage.write(start_addr, new_data)?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for storage operations
pub mod error;


/// Re-exports of common traits for convenient importing
pub mod prelude {
    pub use super::{BlockingErase, ReadStorage, Region, Storage};
}

/// A contiguous memory region with start and end boundaries.
///
/// # Examples
///
/// ```rust
/// use transit_sign::storage::Region;
///
/// struct FlashRegion {
///     start: u32,
///     size: u32,
/// }
///
/// impl Region for FlashRegion {
///     fn start(&self) -> u32 {
///         self.start
///     }
///
///     fn end(&self) -> u32 {
///         self.start + self.size
///     }
/// }
///
/// let bootloader = FlashRegion { start: 0x0000, size: 0x4000 };
/// let application = FlashRegion { start: 0x4000, size: 0x1C000 };
///
/// assert!(bootloader.contains(0x2000));
/// assert!(!bootloader.contains(0x5000));
/// assert!(application.contains(0x5000));
/// ```
pub trait Region {
    /// Start address of the region (inclusive).
    fn start(&self) -> u32;

    /// End address of the region (exclusive).
    fn end(&self) -> u32;

    /// Check if an address is contained within this region.
    fn contains(&self, address: u32) -> bool {
        (address >= self.start()) && (address < self.end())
    }

    /// Size of the region in bytes.
    fn size(&self) -> u32 {
        self.end().saturating_sub(self.start())
    }
}

/// Read-only storage.
pub trait ReadStorage {
    /// An enumeration of storage errors
    type Error: core::fmt::Debug + Into<error::Error>;

    /// Read a slice of data from the storage peripheral, starting the read
    /// operation at the given address offset, and reading `bytes.len()` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are not aligned or out of bounds.
    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error>;

    /// The capacity of the peripheral in bytes.
    fn capacity(&self) -> usize;
}

/// Read and write storage.
pub trait Storage: ReadStorage {
    /// Write a slice of data to the storage peripheral, starting the write
    /// operation at the given address offset (between 0 and `self.capacity()`).
    ///
    /// Storage that needs erasing first also implements [`BlockingErase`];
    /// callers erase before writing.
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Storage that must be erased before it is written, such as NOR flash.
pub trait BlockingErase: Storage {
    /// Erase the given storage range, clearing all data within `[from..to]`.
    /// The given range will contain all 1s afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are not aligned or out of bounds, or
    /// if `from` is greater than `to`.
    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error>;
}
