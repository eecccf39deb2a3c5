//! Performance benchmarks for the relay's per-frame work
//!
//! Run with: cargo bench
//! Or for specific benchmarks: cargo bench -- <filter>

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::time::Duration;

use convai_relay::core::transform::{downstream_to_upstream, observe_ping, upstream_to_downstream};

/// Base64 audio payload of roughly `bytes` characters
fn audio_payload(bytes: usize) -> String {
    "UklGRiQAAABXQVZFZm10IBAAAAABAAEA".repeat(bytes / 32 + 1)
}

/// Upstream → downstream normalization across the common event types
fn bench_upstream_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("upstream_transform");
    group.measurement_time(Duration::from_secs(5));

    for size in [1_024usize, 16_384, 131_072] {
        let frame = format!(
            r#"{{"type":"audio","audio_event":{{"audio_base_64":"{}","event_id":12}}}}"#,
            audio_payload(size)
        );
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::new("audio", size), &frame, |b, frame| {
            b.iter(|| upstream_to_downstream(black_box(frame)));
        });
    }

    let ping = r#"{"type":"ping","ping_event":{"event_id":42,"ping_ms":120}}"#;
    group.bench_function("ping", |b| {
        b.iter(|| {
            let _ = observe_ping(black_box(ping));
            upstream_to_downstream(black_box(ping))
        });
    });

    let transcript = r#"{"type":"user_transcript","user_transcription_event":{"user_transcript":"hello there, how are you today?"}}"#;
    group.bench_function("passthrough", |b| {
        b.iter(|| upstream_to_downstream(black_box(transcript)));
    });

    group.finish();
}

/// Downstream → upstream handling, dominated by microphone chunks
fn bench_downstream_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("downstream_transform");
    group.measurement_time(Duration::from_secs(5));

    for size in [1_024usize, 16_384] {
        let frame = format!(r#"{{"user_audio_chunk":"{}"}}"#, audio_payload(size));
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::new("user_audio_chunk", size), &frame, |b, frame| {
            b.iter(|| downstream_to_upstream(black_box(frame), Some(7)));
        });
    }

    let pong = r#"{"type":"pong","event_id":"ping"}"#;
    group.bench_function("pong_repair", |b| {
        b.iter(|| downstream_to_upstream(black_box(pong), black_box(Some(7))));
    });

    group.finish();
}

criterion_group!(benches, bench_upstream_transform, bench_downstream_transform);
criterion_main!(benches);
