//! Device configuration.
//!
//! Everything the firmware decides at build time: who the sign is, where it
//! fetches from, and how long it is willing to wait or loop. Values are
//! `&'static str` based so a whole [`Config`] can be a `const`.
//!
//! ```rust
//! use transit_sign::config::{Config, Endpoint, FirmwareEndpoint};
//! use transit_sign::network::SecTag;
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
//! assert_eq!(CONFIG.user_agent().device_id, "73");
//! ```

use core::time::Duration;

use crate::network::application::http::error::Capacity;
use crate::network::application::http::request::{RequestTarget, UserAgent};
use crate::network::gate::Wait;
use crate::network::{SecTag, Security};

/// Product token sent in `User-Agent`.
pub const PRODUCT: &str = "EDB";

/// Firmware version sent in `User-Agent`.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Media type requested for the schedule.
pub const JSON: &str = "application/json";

/// Media type requested for firmware images.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Schedule endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub hostname: &'static str,
    pub path: &'static str,
    pub security: Security,
    pub accept: &'static str,
}

impl Endpoint {
    /// JSON endpoint over plain HTTP.
    pub const fn plain(hostname: &'static str, path: &'static str) -> Self {
        Self {
            hostname,
            path,
            security: Security::Plain,
            accept: JSON,
        }
    }

    /// JSON endpoint over TLS verified against `tag`.
    pub const fn tls(hostname: &'static str, path: &'static str, tag: SecTag) -> Self {
        Self {
            hostname,
            path,
            security: Security::Tls(tag),
            accept: JSON,
        }
    }

    pub fn target(&self) -> Result<RequestTarget<'static>, Capacity> {
        RequestTarget::new(self.hostname, self.path, self.security, self.accept)
    }
}

/// Firmware image endpoint. Always fetched over TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareEndpoint {
    pub hostname: &'static str,
    pub path: &'static str,
    pub tag: SecTag,
}

impl FirmwareEndpoint {
    pub fn target(&self) -> Result<RequestTarget<'static>, Capacity> {
        RequestTarget::new(
            self.hostname,
            self.path,
            Security::Tls(self.tag),
            OCTET_STREAM,
        )
    }
}

/// Bounds on the redirect and resume loops of a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Redirects followed before giving up.
    pub max_redirects: u8,
    /// Consecutive byte-range resumes that deliver no new bytes before
    /// giving up. Resumes that make progress are not limited.
    pub max_resumes: u8,
}

impl Limits {
    pub const DEFAULT: Limits = Limits {
        max_redirects: 5,
        max_resumes: 16,
    };
}

impl Default for Limits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Build-time configuration of one sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub product: &'static str,
    pub firmware_version: &'static str,
    /// Stop this sign serves; sent as `Stop-ID` in `User-Agent`.
    pub device_id: &'static str,
    pub schedule: Endpoint,
    pub firmware: FirmwareEndpoint,
    pub limits: Limits,
    /// Gate wait for the interactive schedule fetch.
    pub schedule_wait: Wait,
    /// Gate wait for the background firmware fetch.
    pub firmware_wait: Wait,
}

impl Config {
    pub const fn new(
        device_id: &'static str,
        schedule: Endpoint,
        firmware: FirmwareEndpoint,
    ) -> Self {
        Self {
            product: PRODUCT,
            firmware_version: FIRMWARE_VERSION,
            device_id,
            schedule,
            firmware,
            limits: Limits::DEFAULT,
            schedule_wait: Wait::Bounded(Duration::from_secs(30)),
            firmware_wait: Wait::Forever,
        }
    }

    pub fn user_agent(&self) -> UserAgent<'static> {
        UserAgent {
            product: self.product,
            firmware_version: self.firmware_version,
            device_id: self.device_id,
        }
    }
}
