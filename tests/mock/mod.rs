#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use transit_sign::config::{Config, Endpoint, FirmwareEndpoint};
use transit_sign::network::application::http::Sink;
use transit_sign::network::error::Error;
use transit_sign::network::gate::{Gate, Unavailable, Wait};
use transit_sign::network::{
    Close, Connection, PeerVerify, Read, SecTag, Security, Socket, Stack, TlsOption, Write,
};
use transit_sign::storage::error::Error as StorageError;

pub const SCHEDULE_HOST: &str = "stops.example.com";
pub const FIRMWARE_HOST: &str = "fw.example.com";
pub const FIRMWARE_TAG: SecTag = SecTag(42);

pub const CONFIG: Config = Config::new(
    "73",
    Endpoint::plain(SCHEDULE_HOST, "/api/stops/73"),
    FirmwareEndpoint {
        hostname: FIRMWARE_HOST,
        path: "/edb/latest.bin",
        tag: FIRMWARE_TAG,
    },
);

// -------------------------
// Scripted modem stack
// -------------------------

/// One read result handed to the client.
#[derive(Debug, Clone)]
pub enum Event {
    Data(Vec<u8>),
    Fail(Error),
}

/// What one connection does, in order.
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    pub events: Vec<Event>,
    pub connect_error: Option<Error>,
}

impl Exchange {
    /// A response delivered in one read, then a clean close.
    pub fn reply(head: &str, body: &[u8]) -> Self {
        let mut bytes = head.as_bytes().to_vec();
        bytes.extend_from_slice(body);
        Self {
            events: vec![Event::Data(bytes)],
            connect_error: None,
        }
    }

    /// A response whose bytes arrive in reads of the given sizes.
    pub fn chunked(head: &str, body: &[u8], sizes: &[usize]) -> Self {
        let mut bytes = head.as_bytes().to_vec();
        bytes.extend_from_slice(body);
        let mut events = Vec::new();
        let mut rest = &bytes[..];
        let mut sizes = sizes.iter().cycle();
        while !rest.is_empty() {
            let n = (*sizes.next().unwrap_or(&1)).max(1).min(rest.len());
            events.push(Event::Data(rest[..n].to_vec()));
            rest = &rest[n..];
        }
        Self {
            events,
            connect_error: None,
        }
    }

    /// Append a read failure after the scripted bytes.
    pub fn then_fail(mut self, error: Error) -> Self {
        self.events.push(Event::Fail(error));
        self
    }

    pub fn refused() -> Self {
        Self {
            events: Vec::new(),
            connect_error: Some(Error::ConnectionRefused),
        }
    }
}

/// TLS option as recorded by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsRecord {
    PeerVerify(PeerVerify),
    SecTags(Vec<SecTag>),
    Hostname(String),
}

/// Everything the client did to the stack.
#[derive(Debug, Default)]
pub struct Log {
    pub resolves: Vec<(String, u16)>,
    pub opens: Vec<Security>,
    pub tls: Vec<TlsRecord>,
    pub requests: Vec<String>,
    pub closes: usize,
}

#[derive(Debug, Clone)]
pub struct MockStack {
    script: Rc<RefCell<VecDeque<Exchange>>>,
    pub log: Rc<RefCell<Log>>,
    pub resolve_error: Option<Error>,
}

impl MockStack {
    pub fn new(script: Vec<Exchange>) -> Self {
        Self {
            script: Rc::new(RefCell::new(script.into())),
            log: Rc::new(RefCell::new(Log::default())),
            resolve_error: None,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.log.borrow().requests.clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }
}

impl Stack for MockStack {
    type Address = (String, u16);
    type Socket = MockSocket;
    type Error = Error;

    fn resolve(&mut self, hostname: &str, port: u16) -> Result<Self::Address, Self::Error> {
        self.log
            .borrow_mut()
            .resolves
            .push((hostname.to_string(), port));
        match self.resolve_error {
            Some(err) => Err(err),
            None => Ok((hostname.to_string(), port)),
        }
    }

    fn open(
        &mut self,
        _address: &Self::Address,
        security: Security,
    ) -> Result<Self::Socket, Self::Error> {
        let exchange = self
            .script
            .borrow_mut()
            .pop_front()
            .ok_or(Error::SocketOpen)?;
        self.log.borrow_mut().opens.push(security);
        Ok(MockSocket {
            events: exchange.events.into(),
            connect_error: exchange.connect_error,
            written: Vec::new(),
            security,
            log: self.log.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MockSocket {
    events: VecDeque<Event>,
    connect_error: Option<Error>,
    written: Vec<u8>,
    security: Security,
    log: Rc<RefCell<Log>>,
}

impl Read for MockSocket {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.events.pop_front() {
            None => Ok(0),
            Some(Event::Fail(err)) => Err(err),
            Some(Event::Data(data)) => {
                let n = buf.len().min(data.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.events.push_front(Event::Data(data[n..].to_vec()));
                }
                Ok(n)
            }
        }
    }
}

impl Write for MockSocket {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        // Short writes exercise the send loop.
        let n = buf.len().min(64);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockSocket {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        log.closes += 1;
        if !self.written.is_empty() {
            log.requests
                .push(String::from_utf8_lossy(&self.written).into_owned());
        }
        Ok(())
    }
}

impl Connection for MockSocket {}

impl Socket for MockSocket {
    type Address = (String, u16);

    fn set_tls_option(&mut self, option: TlsOption<'_>) -> Result<(), Error> {
        if !self.security.is_tls() {
            return Err(Error::TlsSetup);
        }
        let record = match option {
            TlsOption::PeerVerify(mode) => TlsRecord::PeerVerify(mode),
            TlsOption::SecTagList(tags) => TlsRecord::SecTags(tags.to_vec()),
            TlsOption::Hostname(name) => TlsRecord::Hostname(name.to_string()),
        };
        self.log.borrow_mut().tls.push(record);
        Ok(())
    }

    fn connect(&mut self, _address: &Self::Address) -> Result<(), Error> {
        match self.connect_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// -------------------------
// Connectivity gate
// -------------------------

#[derive(Debug, Default)]
pub struct Lte {
    pub offline: bool,
    pub held: Cell<bool>,
    pub acquires: Cell<u32>,
    pub releases: Cell<u32>,
    pub last_wait: Cell<Option<Wait>>,
}

impl Lte {
    pub fn online() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

impl Gate for Lte {
    fn acquire(&self, wait: Wait) -> Result<(), Unavailable> {
        self.last_wait.set(Some(wait));
        if self.offline || self.held.get() {
            return Err(Unavailable);
        }
        self.held.set(true);
        self.acquires.set(self.acquires.get() + 1);
        Ok(())
    }

    fn release(&self) {
        self.held.set(false);
        self.releases.set(self.releases.get() + 1);
    }
}

// -------------------------
// Recording sink
// -------------------------

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub data: Vec<u8>,
    pub chunks: usize,
    pub finalized: u32,
    pub rewinds: u32,
}

impl Sink for RecordingSink {
    fn write(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        if self.finalized > 0 {
            return Err(StorageError::AlreadyFinalized);
        }
        self.data.extend_from_slice(chunk);
        self.chunks += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), StorageError> {
        self.finalized += 1;
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), StorageError> {
        self.data.clear();
        self.rewinds += 1;
        Ok(())
    }
}

/// Deterministic test image.
pub fn image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + i / 251) as u8).collect()
}
