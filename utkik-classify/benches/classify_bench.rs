use chrono::DateTime;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use utkik_capture::{DissectedPacket, DnsLayer, HttpLayer, TlsLayer};
use utkik_classify::{classify, extract_domain};
use utkik_core::TransportProtocol;
use utkik_detection::HeuristicEngine;

fn sample_packets() -> Vec<DissectedPacket> {
    let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    vec![
        DissectedPacket::new(ts)
            .with_network("10.0.0.2".parse().unwrap(), "203.0.113.9".parse().unwrap())
            .with_transport(TransportProtocol::Tcp, 49152, 80)
            .with_http(HttpLayer {
                request_full_uri: Some("http://example.com/index.html".into()),
                host: Some("example.com".into()),
                request_uri: Some("/index.html".into()),
            }),
        DissectedPacket::new(ts)
            .with_network("10.0.0.2".parse().unwrap(), "151.101.1.140".parse().unwrap())
            .with_transport(TransportProtocol::Tcp, 49153, 443)
            .with_tls(TlsLayer {
                server_name: Some("bank.example".into()),
            }),
        DissectedPacket::new(ts)
            .with_network("10.0.0.2".parse().unwrap(), "10.0.0.1".parse().unwrap())
            .with_transport(TransportProtocol::Udp, 53444, 53)
            .with_dns(DnsLayer {
                query_name: Some("cdn.example.net".into()),
            }),
        DissectedPacket::new(ts)
            .with_network("10.0.0.2".parse().unwrap(), "198.51.100.7".parse().unwrap())
            .with_transport(TransportProtocol::Tcp, 49154, 4444)
            .with_tls(TlsLayer { server_name: None }),
    ]
}

fn bench_classify(c: &mut Criterion) {
    let heuristics = HeuristicEngine::new();
    let packets = sample_packets();

    c.bench_function("classify_mixed_batch", |b| {
        b.iter(|| {
            for packet in &packets {
                black_box(classify(black_box(packet), &heuristics));
            }
        })
    });

    c.bench_function("extract_domain", |b| {
        b.iter(|| black_box(extract_domain(black_box("https://Sub.Example.com/a/b/c"))))
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
