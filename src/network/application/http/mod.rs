//! HTTP/1.1 client for the sign's modem stack.
//!
//! This module implements the one protocol the sign speaks to its backend: a
//! GET with `Connection: close`, over plain TCP or a TLS socket configured
//! from a provisioned credential tag. Responses are read straight off the
//! socket without a parser library; only the status line and the `Location`
//! header are interpreted.
//!
//! # Features
//!
//! - Caller-supplied buffers with explicit sizes, no allocation
//! - Redirects, refusing a downgrade from TLS to plain HTTP
//! - In-memory bodies (schedule JSON) and streamed bodies (firmware images)
//! - Byte-range resume when the modem's secure-socket buffer limit is hit
//!
//! # Usage
//!
//! ```rust,no_run
//! use transit_sign::config::{Config, Endpoint, FirmwareEndpoint};
//! use transit_sign::network::application::http::Client;
//! use transit_sign::network::SecTag;
//! # use transit_sign::network::{error::Error, *};
//! # use transit_sign::network::gate::{Gate, Unavailable, Wait};
//! # struct Modem;
//! # struct Sock;
//! # impl Read for Sock { type Error = Error; fn read(&mut self, _: &mut [u8]) -> Result<usize, Error> { Ok(0) } }
//! # impl Write for Sock {
//! #     type Error = Error;
//! #     fn write(&mut self, b: &[u8]) -> Result<usize, Error> { Ok(b.len()) }
//! #     fn flush(&mut self) -> Result<(), Error> { Ok(()) }
//! # }
//! # impl Close for Sock { type Error = Error; fn close(self) -> Result<(), Error> { Ok(()) } }
//! # impl Connection for Sock {}
//! # impl Socket for Sock {
//! #     type Address = ();
//! #     fn set_tls_option(&mut self, _: TlsOption<'_>) -> Result<(), Error> { Ok(()) }
//! #     fn connect(&mut self, _: &()) -> Result<(), Error> { Ok(()) }
//! # }
//! # impl Stack for Modem {
//! #     type Address = ();
//! #     type Socket = Sock;
//! #     type Error = Error;
//! #     fn resolve(&mut self, _: &str, _: u16) -> Result<(), Error> { Ok(()) }
//! #     fn open(&mut self, _: &(), _: Security) -> Result<Sock, Error> { Ok(Sock) }
//! # }
//! # struct Lte;
//! # impl Gate for Lte { fn acquire(&self, _: Wait) -> Result<(), Unavailable> { Ok(()) } fn release(&self) {} }
//!
//! const CONFIG: Config = Config::new(
//!     "73",
//!     Endpoint::plain("stops.example.com", "/api/stops/73"),
//!     FirmwareEndpoint { hostname: "fw.example.com", path: "/edb.bin", tag: SecTag(42) },
//! );
//!
//! let mut client = Client::new(Modem, &CONFIG);
//! let mut headers = [0u8; 1024];
//! let mut body = [0u8; 8192];
//! let len = client.fetch_schedule(&Lte, &mut headers, &mut body)?;
//! # Ok::<(), transit_sign::network::application::http::Error>(())
//! ```

/// Response body transfer and the persistent-storage sink trait.
pub mod body;

/// Retry/redirect orchestration and the public fetches.
pub mod client;

/// Socket setup for one attempt.
pub mod connect;

/// Error taxonomy.
pub mod error;

/// Response header reader.
pub mod header;

/// `Location` handling.
pub mod redirect;

/// Request target and request-head builder.
pub mod request;

/// Status-line classification.
pub mod status;

pub use body::{BodyOutcome, Sink, TransferMode};
pub use client::{Client, State, TransferProgress};
pub use error::{Capacity, Error, Limit, ProtocolError};
pub use header::HeaderBlock;
pub use request::{RequestTarget, UserAgent};
pub use status::{Status, StatusClass};
