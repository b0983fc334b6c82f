//! Connectivity gate.
//!
//! The cellular link is a shared resource: the LTE manager makes the gate
//! available once the modem is registered, and every network consumer holds
//! it for the duration of one fetch. Holding the gate also serialises fetches,
//! which is what keeps a single writer on the firmware slot.

use core::time::Duration;

/// How long to wait for the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Give up after the duration elapses.
    Bounded(Duration),
    /// Block until the gate is available.
    Forever,
}

/// The gate could not be acquired within the requested wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unavailable;

/// A binary gate signalling that the cellular link is usable.
///
/// Implementations wrap the platform's semaphore; both methods take `&self`
/// because the gate is shared between tasks.
pub trait Gate {
    /// Block until the gate is taken or `wait` elapses.
    fn acquire(&self, wait: Wait) -> Result<(), Unavailable>;

    /// Give the gate back.
    fn release(&self);
}

/// A held gate. Dropping the permit releases the gate.
#[derive(Debug)]
pub struct Permit<'g, G: Gate + ?Sized> {
    gate: &'g G,
}

impl<'g, G: Gate + ?Sized> Permit<'g, G> {
    /// Acquire `gate`, returning a permit that releases it on drop.
    pub fn acquire(gate: &'g G, wait: Wait) -> Result<Self, Unavailable> {
        gate.acquire(wait)?;
        Ok(Self { gate })
    }
}

impl<G: Gate + ?Sized> Drop for Permit<'_, G> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
