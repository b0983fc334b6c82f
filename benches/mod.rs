use criterion::{criterion_group, criterion_main};

mod http;

criterion_group!(
    benches,
    http::bench_build_request,
    http::bench_receive_headers,
    http::bench_stream_body
);
criterion_main!(benches);
