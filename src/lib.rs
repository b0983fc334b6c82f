//! # transit-sign - HTTP fetch core for a cellular departure sign
//!
//! A `no_std` HTTP/1.1 client for a sign that sits at a transit stop and
//! talks to its backend over a cellular modem. It fetches two things:
//!
//! - the stop's departure schedule, a small JSON document received into a
//!   caller-supplied buffer, and
//! - firmware images, streamed in chunks into persistent storage with
//!   byte-range resume when the modem's receive buffer overflows.
//!
//! Both fetches follow redirects (never from TLS down to plain HTTP), share
//! one connectivity gate with the rest of the firmware, and run without any
//! heap allocation.
//!
//! ## Layout
//!
//! - [`network`]: socket and stack traits, the connectivity gate, and the
//!   HTTP client in [`network::application::http`]
//! - [`storage`]: storage traits for the firmware slot
//! - [`ota`]: image writer and verification on top of the storage traits
//! - [`schedule`]: the departure schedule model
//! - [`config`]: build-time device configuration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use transit_sign::config::{Config, Endpoint, FirmwareEndpoint};
//! use transit_sign::network::SecTag;
//! use transit_sign::schedule;
//!
//! const CONFIG: Config = Config::new(
//!     "73",
//!     Endpoint::plain("stops.example.com", "/api/stops/73"),
//!     FirmwareEndpoint {
//!         hostname: "fw.example.com",
//!         path: "/edb/latest.bin",
//!         tag: SecTag(42),
//!     },
//! );
//!
//! # fn run<S: transit_sign::network::Stack, G: transit_sign::network::gate::Gate>(
//! #     stack: S,
//! #     gate: &G,
//! # ) -> Result<(), transit_sign::network::application::http::Error> {
//! use transit_sign::network::application::http::Client;
//!
//! let mut client = Client::new(stack, &CONFIG);
//! let mut headers = [0u8; 1024];
//! let mut body = [0u8; 4096];
//! let len = client.fetch_schedule(gate, &mut headers, &mut body)?;
//! if let Ok(stop) = schedule::parse(&body[..len]) {
//!     for route in &stop.route_directions {
//!         let _next = route.upcoming().next();
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Log through `defmt` and derive `defmt::Format` on public types
//! - `log`: Log through the `log` facade

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

/// Build-time device configuration.
#[allow(missing_docs)]
pub mod config;

/// Network abstraction layer: stack and socket traits, the connectivity gate,
/// and the HTTP client.
pub mod network;

/// Storage abstraction layer for the firmware image slot.
pub mod storage;

/// Firmware image download into a storage slot.
#[allow(missing_docs)]
pub mod ota;

/// Departure schedule model.
#[allow(missing_docs)]
pub mod schedule;
