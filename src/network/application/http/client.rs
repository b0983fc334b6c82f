//! Request orchestration: the retry/redirect loop and the two public fetches.
//!
//! One fetch is a sequence of attempts. Each attempt builds a request, opens
//! a fresh connection, reads the headers and then the body. An attempt ends
//! in one of three ways:
//!
//! ```text
//! Sending -> AwaitingHeaders -> StreamingBody -> Done
//!                  |                  |
//!                  v                  v
//!             Redirecting         Resuming      (both loop back to Sending)
//! ```
//!
//! Any error moves the client to `Failed` and ends the fetch. Redirects and
//! resumes that make no progress are bounded by [`Limits`].

use super::body::{BodyOutcome, Sink, TransferMode, receive_body};
use super::connect::{close, establish, send_all};
use super::error::{Error, Limit, ProtocolError};
use super::header::HeaderBlock;
use super::redirect;
use super::request::{RequestTarget, build_request};
use super::status::StatusClass;
use crate::config::{Config, Limits};
use crate::network::Stack;
use crate::network::gate::{Gate, Permit};

/// HTTP status for a satisfied byte-range request.
const PARTIAL_CONTENT: u16 = 206;

/// Where the client is in the current fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Sending,
    AwaitingHeaders,
    StreamingBody,
    Redirecting,
    Resuming,
    Done,
    Failed,
}

/// Progress through the logical body of one fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes of the logical body received so far.
    pub offset: u64,
    /// Where the current request starts; non-zero only on a resumed request.
    pub range_start: u64,
}

/// How one attempt ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done(u64),
    Redirect,
    Resume(u64),
}

/// HTTP client bound to a socket stack and a device configuration.
///
/// The client keeps no state between fetches beyond the last [`State`]; each
/// fetch owns its [`RequestTarget`] and the caller owns every buffer.
pub struct Client<'c, S: Stack> {
    stack: S,
    config: &'c Config,
    state: State,
}

impl<'c, S: Stack> Client<'c, S> {
    pub fn new(stack: S, config: &'c Config) -> Self {
        Self {
            stack,
            config,
            state: State::Done,
        }
    }

    /// State reached by the last fetch.
    pub fn state(&self) -> State {
        self.state
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn into_stack(self) -> S {
        self.stack
    }

    /// Fetch the stop schedule into `body`.
    ///
    /// Waits a bounded time for the connectivity gate and releases it when
    /// the fetch ends. Returns the body length; `body[len]` is NUL.
    pub fn fetch_schedule<G: Gate + ?Sized>(
        &mut self,
        gate: &G,
        headers: &mut [u8],
        body: &mut [u8],
    ) -> Result<usize, Error> {
        let _permit = Permit::acquire(gate, self.config.schedule_wait).map_err(|_| {
            error!("Failed to take connectivity gate");
            Error::Unavailable
        })?;
        let target = self.config.schedule.target()?;
        let len = self.fetch(target, headers, TransferMode::InMemory(body))?;
        Ok(len as usize)
    }

    /// Stream the firmware image into `sink` over TLS.
    ///
    /// Waits as long as it takes for the connectivity gate. Returns the image
    /// length; `sink` has been finalized exactly once on success.
    pub fn fetch_firmware<G: Gate + ?Sized>(
        &mut self,
        gate: &G,
        headers: &mut [u8],
        scratch: &mut [u8],
        sink: &mut dyn Sink,
    ) -> Result<u64, Error> {
        let _permit = Permit::acquire(gate, self.config.firmware_wait).map_err(|_| {
            error!("Failed to take connectivity gate");
            Error::Unavailable
        })?;
        let target = self.config.firmware.target()?;
        self.fetch(target, headers, TransferMode::Streaming { sink, scratch })
    }

    /// Run one logical fetch of `target`, following redirects and resuming
    /// after the modem buffer limit.
    ///
    /// `headers` carries the request head and then the response headers of
    /// every attempt. Returns the body length.
    pub fn fetch(
        &mut self,
        mut target: RequestTarget<'_>,
        headers: &mut [u8],
        mut mode: TransferMode<'_>,
    ) -> Result<u64, Error> {
        debug!(
            "Fetch {}:{}{} accept {}",
            target.hostname.as_str(),
            target.port,
            target.path.as_str(),
            target.accept
        );
        let mut block = HeaderBlock::new(headers);
        match self.run(&mut target, &mut block, &mut mode) {
            Ok(len) => {
                self.enter(State::Done);
                Ok(len)
            }
            Err(err) => {
                error!("Fetch failed: {:?}", err);
                self.enter(State::Failed);
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        target: &mut RequestTarget<'_>,
        block: &mut HeaderBlock<'_>,
        mode: &mut TransferMode<'_>,
    ) -> Result<u64, Error> {
        let limits: Limits = self.config.limits;
        let mut progress = TransferProgress::default();
        let mut redirects = 0u8;
        let mut stalled = 0u8;

        loop {
            match self.attempt(target, block, mode, progress.range_start)? {
                Outcome::Done(len) => return Ok(len),
                Outcome::Redirect => {
                    self.enter(State::Redirecting);
                    if redirects >= limits.max_redirects {
                        error!("Giving up after {} redirects", redirects);
                        return Err(Error::Limit(Limit::Redirects));
                    }
                    redirects += 1;
                    redirect::follow(target, block.text())?;
                    // A redirect names a fresh resource; start its body over.
                    if progress.range_start > 0 {
                        if let TransferMode::Streaming { sink, .. } = mode {
                            sink.rewind()?;
                        }
                    }
                    progress = TransferProgress::default();
                }
                Outcome::Resume(offset) => {
                    self.enter(State::Resuming);
                    // Only resumes that delivered nothing count towards the limit.
                    if offset > progress.range_start {
                        stalled = 0;
                    } else {
                        if stalled >= limits.max_resumes {
                            error!(
                                "Giving up after {} resumes stalled at byte {}",
                                stalled,
                                offset
                            );
                            return Err(Error::Limit(Limit::Resumes));
                        }
                        stalled += 1;
                    }
                    progress.offset = offset;
                    progress.range_start = offset;
                    info!(
                        "Resuming: Range: bytes={}- ({} stalled of {})",
                        progress.range_start,
                        stalled,
                        limits.max_resumes
                    );
                }
            }
        }
    }

    /// One request/response exchange on a fresh connection.
    fn attempt(
        &mut self,
        target: &RequestTarget<'_>,
        block: &mut HeaderBlock<'_>,
        mode: &mut TransferMode<'_>,
        range_start: u64,
    ) -> Result<Outcome, Error> {
        self.enter(State::Sending);
        let agent = self.config.user_agent();
        let len = build_request(target, &agent, range_start, block.as_mut_buf())?;
        debug!("Request head is {} bytes, range start {}", len, range_start);

        let mut socket = establish(&mut self.stack, target)?;
        let result = self.exchange(&mut socket, block, len, mode, range_start);
        debug!("Closing socket");
        close(socket);
        result
    }

    fn exchange(
        &mut self,
        socket: &mut S::Socket,
        block: &mut HeaderBlock<'_>,
        request_len: usize,
        mode: &mut TransferMode<'_>,
        range_start: u64,
    ) -> Result<Outcome, Error> {
        send_all(socket, &block.as_buf()[..request_len])?;

        self.enter(State::AwaitingHeaders);
        let status = block.receive(socket)?;
        match status.class {
            StatusClass::Informational | StatusClass::Success => {}
            StatusClass::Redirect => return Ok(Outcome::Redirect),
            StatusClass::ClientError => {
                return Err(ProtocolError::ClientError(status.code).into());
            }
            StatusClass::ServerError => {
                return Err(ProtocolError::ServerError(status.code).into());
            }
            StatusClass::Malformed => return Err(ProtocolError::MalformedStatus.into()),
        }
        if range_start > 0 && status.code != PARTIAL_CONTENT {
            error!("Range request answered with {}", status.code);
            return Err(ProtocolError::RangeIgnored(status.code).into());
        }

        self.enter(State::StreamingBody);
        Ok(match receive_body(socket, mode, range_start)? {
            BodyOutcome::Complete(len) => Outcome::Done(len),
            BodyOutcome::Interrupted(offset) => Outcome::Resume(offset),
        })
    }

    fn enter(&mut self, state: State) {
        trace!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

impl<S: Stack + core::fmt::Debug> core::fmt::Debug for Client<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("stack", &self.stack)
            .field("state", &self.state)
            .finish()
    }
}
