use criterion::{Criterion, Throughput};
use std::hint::black_box;
use transit_sign::network::application::http::body::{TransferMode, receive_body};
use transit_sign::network::application::http::request::build_request;
use transit_sign::network::application::http::{HeaderBlock, RequestTarget, Sink, UserAgent};
use transit_sign::network::error::Error;
use transit_sign::network::{Read, SecTag, Security};
use transit_sign::storage::error::Error as StorageError;

const RESPONSE_HEAD: &[u8] = b"HTTP/1.1 200 OK\r\n\
Date: Sat, 18 Oct 2026 12:00:00 GMT\r\n\
Content-Type: application/octet-stream\r\n\
Content-Length: 65536\r\n\
Connection: close\r\n\r\n";

/// Replays a fixed byte string in reads of at most `chunk` bytes.
struct Replay<'a> {
    data: &'a [u8],
    pos: usize,
    chunk: usize,
}

impl<'a> Replay<'a> {
    fn new(data: &'a [u8], chunk: usize) -> Self {
        Self { data, pos: 0, chunk }
    }
}

impl Read for Replay<'_> {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

struct Discard(u64);

impl Sink for Discard {
    fn write(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        self.0 += chunk.len() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), StorageError> {
        self.0 = 0;
        Ok(())
    }
}

pub fn bench_build_request(c: &mut Criterion) {
    let target = RequestTarget::new(
        "fw.example.com",
        "/edb/latest.bin",
        Security::Tls(SecTag(42)),
        "application/octet-stream",
    )
    .unwrap();
    let agent = UserAgent {
        product: "EDB",
        firmware_version: "0.1.0",
        device_id: "73",
    };
    let mut buf = [0u8; 512];

    c.bench_function("http_build_request_with_range", |b| {
        b.iter(|| build_request(black_box(&target), &agent, black_box(123_456), &mut buf).unwrap())
    });
}

pub fn bench_receive_headers(c: &mut Criterion) {
    let mut buf = [0u8; 512];
    let mut group = c.benchmark_group("http_headers");
    group.throughput(Throughput::Bytes(RESPONSE_HEAD.len() as u64));
    group.bench_function("receive", |b| {
        b.iter(|| {
            let mut conn = Replay::new(RESPONSE_HEAD, 1);
            let mut block = HeaderBlock::new(&mut buf);
            black_box(block.receive(&mut conn).unwrap())
        })
    });
    group.finish();
}

pub fn bench_stream_body(c: &mut Criterion) {
    let body: Vec<u8> = (0..65536u32).map(|i| i as u8).collect();
    let mut scratch = [0u8; 1024];
    let mut group = c.benchmark_group("http_body");
    group.throughput(Throughput::Bytes(body.len() as u64));
    for chunk in [256usize, 1024] {
        group.bench_function(format!("stream_{chunk}"), |b| {
            b.iter(|| {
                let mut sink = Discard(0);
                let mut conn = Replay::new(&body, chunk);
                let mut mode = TransferMode::Streaming {
                    sink: &mut sink,
                    scratch: &mut scratch,
                };
                black_box(receive_body(&mut conn, &mut mode, 0).unwrap())
            })
        });
    }
    group.finish();
}
