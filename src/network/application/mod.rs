//! # Application Layer Network Protocols
//!
//! This module contains the application layer (OSI Layer 7) protocol the
//! sign speaks. It is designed to work with the core network traits and keep
//! every buffer in the caller's hands.
//!
//! ## Available Protocols
//!
//! - **[`http`]**: HTTP/1.1 GET client for the schedule and firmware endpoints
//!
//! ## Design Principles
//!
//! - **Stack Agnostic**: Works with any type implementing [`Stack`](crate::network::Stack)
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Caller-supplied buffers with explicit sizes
//! - **Error Handling**: Transport, protocol and capacity failures are kept apart

/// HTTP client implementation.
///
/// Provides a minimal HTTP/1.1 client for a cellular modem: GET only,
/// `Connection: close`, redirects, and byte-range resume of firmware downloads.
pub mod http;
