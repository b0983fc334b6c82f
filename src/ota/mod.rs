//! # Firmware image download into a storage slot
//!
//! The firmware fetch streams the image body straight into persistent
//! storage through [`ImageWriter`], a [`Sink`] over any [`BlockingErase`]
//! device. The slot layout is:
//!
//! ```text
//! slot.start                      slot.start + HEADER_SIZE           slot.end
//! | magic | len | crc32 | 0xFF.. | image bytes ...................... |
//! ```
//!
//! The header record is erased when a download starts and written only by
//! [`Sink::finalize`], so an interrupted download never reads back as a
//! complete image. [`verify_image`] re-reads a committed image and checks
//! its CRC-32 before the bootloader is asked to swap to it.

#![deny(unsafe_code)]

use core::fmt;

use heapless::Vec;

use crate::network::Stack;
use crate::network::application::http::{Client, Error as HttpError, Sink};
use crate::network::gate::Gate;
use crate::storage::error::Error;
use crate::storage::{BlockingErase, ReadStorage, Region};

/// Bytes reserved for the header record at the start of a slot.
pub const HEADER_SIZE: u32 = 16;

const MAGIC: u32 = 0x4544_4231;
const ERASED_WORD: u32 = 0xFFFF_FFFF;

/// Chunk size used when reading an image back for verification.
const VERIFY_CHUNK: usize = 256;

/// A storage region holding one firmware image and its header record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    pub start: u32,
    pub end: u32,
}

impl Region for Slot {
    fn start(&self) -> u32 {
        self.start
    }

    fn end(&self) -> u32 {
        self.end
    }
}

impl Slot {
    fn data_start(&self) -> u32 {
        self.start + HEADER_SIZE
    }

    /// Largest image the slot can hold.
    pub fn image_capacity(&self) -> u32 {
        self.size().saturating_sub(HEADER_SIZE)
    }
}

/// Length and checksum of a committed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageInfo {
    pub len: u32,
    pub crc32: u32,
}

impl ImageInfo {
    fn to_bytes(self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0xFF; HEADER_SIZE as usize];
        out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        out[4..8].copy_from_slice(&self.len.to_le_bytes());
        out[8..12].copy_from_slice(&self.crc32.to_le_bytes());
        out
    }

    fn from_bytes(bytes: &[u8; HEADER_SIZE as usize]) -> Option<Self> {
        let word = |i: usize| {
            u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        };
        if word(0) != MAGIC || word(4) == ERASED_WORD {
            return None;
        }
        Some(Self {
            len: word(4),
            crc32: word(8),
        })
    }
}

/// Page-buffered image writer for one slot.
///
/// `PAGE` is the write granularity handed to the storage driver; chunks from
/// the network are coalesced into full pages, and the final partial page is
/// written by `finalize`.
pub struct ImageWriter<'s, S: BlockingErase, const PAGE: usize> {
    storage: &'s mut S,
    slot: Slot,
    page: Vec<u8, PAGE>,
    written: u32,
    hasher: crc32fast::Hasher,
    finalized: bool,
}

impl<'s, S: BlockingErase, const PAGE: usize> ImageWriter<'s, S, PAGE> {
    /// Erase `slot` and start a new image in it.
    pub fn new(storage: &'s mut S, slot: Slot) -> Result<Self, Error> {
        const { assert!(PAGE > 0, "page buffer must not be empty") };

        if slot.end as usize > storage.capacity() || slot.image_capacity() == 0 {
            return Err(Error::OutOfBounds);
        }
        let mut writer = Self {
            storage,
            slot,
            page: Vec::new(),
            written: 0,
            hasher: crc32fast::Hasher::new(),
            finalized: false,
        };
        writer.erase()?;
        Ok(writer)
    }

    /// Bytes accepted so far, buffered or written.
    pub fn received(&self) -> u32 {
        self.written + self.page.len() as u32
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn erase(&mut self) -> Result<(), Error> {
        debug!("Erasing slot {:x}..{:x}", self.slot.start, self.slot.end);
        self.storage
            .erase(self.slot.start, self.slot.end)
            .map_err(Into::into)
    }

    fn flush_page(&mut self) -> Result<(), Error> {
        if self.page.is_empty() {
            return Ok(());
        }
        let offset = self.slot.data_start() + self.written;
        self.storage
            .write(offset, &self.page)
            .map_err(Into::<Error>::into)?;
        self.written += self.page.len() as u32;
        self.page.clear();
        Ok(())
    }
}

impl<S: BlockingErase, const PAGE: usize> Sink for ImageWriter<'_, S, PAGE> {
    fn write(&mut self, chunk: &[u8]) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        if self.received() as u64 + chunk.len() as u64 > self.slot.image_capacity() as u64 {
            error!(
                "Image exceeds slot: {} + {} > {}",
                self.received(),
                chunk.len(),
                self.slot.image_capacity()
            );
            return Err(Error::OutOfBounds);
        }

        self.hasher.update(chunk);
        let mut rest = chunk;
        while !rest.is_empty() {
            let take = (PAGE - self.page.len()).min(rest.len());
            self.page
                .extend_from_slice(&rest[..take])
                .map_err(|_| Error::OutOfBounds)?;
            rest = &rest[take..];
            if self.page.is_full() {
                self.flush_page()?;
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        self.flush_page()?;
        let info = ImageInfo {
            len: self.written,
            crc32: self.hasher.clone().finalize(),
        };
        self.storage
            .write(self.slot.start, &info.to_bytes())
            .map_err(Into::<Error>::into)?;
        self.finalized = true;
        info!("Image committed: {} bytes, crc32 {:x}", info.len, info.crc32);
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), Error> {
        self.erase()?;
        self.page.clear();
        self.written = 0;
        self.hasher = crc32fast::Hasher::new();
        self.finalized = false;
        Ok(())
    }
}

impl<S: BlockingErase, const PAGE: usize> fmt::Debug for ImageWriter<'_, S, PAGE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageWriter")
            .field("slot", &self.slot)
            .field("written", &self.written)
            .field("buffered", &self.page.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}

/// Read the committed image in `slot` back and check it against its header.
pub fn verify_image<S: ReadStorage>(storage: &mut S, slot: Slot) -> Result<ImageInfo, Error> {
    let mut header = [0u8; HEADER_SIZE as usize];
    storage.read(slot.start, &mut header).map_err(Into::<Error>::into)?;
    let info = ImageInfo::from_bytes(&header).ok_or(Error::NoImage)?;
    if info.len > slot.image_capacity() {
        return Err(Error::NoImage);
    }

    let mut hasher = crc32fast::Hasher::new();
    let mut buf = [0u8; VERIFY_CHUNK];
    let mut verified = 0u32;
    while verified < info.len {
        let n = (info.len - verified).min(VERIFY_CHUNK as u32) as usize;
        storage
            .read(slot.data_start() + verified, &mut buf[..n])
            .map_err(Into::<Error>::into)?;
        hasher.update(&buf[..n]);
        verified += n as u32;
    }

    let crc32 = hasher.finalize();
    if crc32 != info.crc32 {
        error!("Image checksum mismatch: {:x} != {:x}", crc32, info.crc32);
        return Err(Error::ChecksumMismatch);
    }
    Ok(info)
}

/// Download the configured firmware image into `slot` and verify it.
///
/// The slot is erased first; on any failure it is left without a committed
/// header.
pub fn download_update<N, G, S, const PAGE: usize>(
    client: &mut Client<'_, N>,
    gate: &G,
    storage: &mut S,
    slot: Slot,
    headers: &mut [u8],
    scratch: &mut [u8],
) -> Result<ImageInfo, HttpError>
where
    N: Stack,
    G: Gate + ?Sized,
    S: BlockingErase,
{
    let len = {
        let mut writer = ImageWriter::<'_, S, PAGE>::new(storage, slot)?;
        client.fetch_firmware(gate, headers, scratch, &mut writer)?
    };
    info!("Firmware download complete: {} bytes", len);
    verify_image(storage, slot).map_err(HttpError::Storage)
}
