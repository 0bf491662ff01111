//! Pipeline and authorization benchmarks
//!
//! These benchmarks measure:
//! - Formatting cost of a node info message in JSON and CBOR
//! - Signed pipelines under HMAC and Ed25519
//! - Cached authorization lookups through the permission manager

use std::sync::Arc;

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

use nodeguard_crypto::ids;
use nodeguard_perms::ManifestSecurity;
use nodeguard_pipeline::{
    message_pipeline, CborFormat, FormattingOperation, JsonFormat, Pipeline, PipelineBuilder,
    SignatureOperation, SignedMessage,
};
use nodeguard_testkit::fixtures::{GuardFixture, MAC_KEY, SIGNER_KEY};
use nodeguard_testkit::NodeInfoMessage;

fn sample_message() -> NodeInfoMessage {
    NodeInfoMessage::new(
        "/intel/node/bench",
        "ndn:/intel/node/bench",
        &["publish", "subscribe", "mesh"],
        &["ndn:/intel/node/bench/info", "ndn:/intel/node/bench/events"],
    )
    .with_mesh("udp://10.0.0.1:6363", false)
    .with_mesh("unix:///run/nfd.sock", true)
}

fn signed_pipeline(fx: &GuardFixture, scheme: &str, key: &str) -> Pipeline<NodeInfoMessage, Bytes> {
    let signer = SignatureOperation::new(Arc::clone(&fx.registry), scheme, fx.resolver(), key)
        .expect("built-in scheme");
    PipelineBuilder::<NodeInfoMessage, NodeInfoMessage>::new()
        .add_operation(FormattingOperation::<NodeInfoMessage, JsonFormat>::json())
        .add_operation(signer)
        .add_operation(FormattingOperation::<SignedMessage, JsonFormat>::json())
        .build()
}

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    let message = sample_message();

    let json = message_pipeline::<NodeInfoMessage, _>(JsonFormat::new());
    let cbor = message_pipeline::<NodeInfoMessage, _>(CborFormat);

    for (name, pipeline) in [("json", &json), ("cbor", &cbor)] {
        let encoded = pipeline.execute(message.clone()).expect("encode");
        group.bench_with_input(BenchmarkId::new("encode", name), pipeline, |b, p| {
            b.iter(|| p.execute(black_box(message.clone())).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decode", name), pipeline, |b, p| {
            b.iter(|| p.execute_backward(black_box(encoded.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_signed(c: &mut Criterion) {
    let mut group = c.benchmark_group("signed_pipeline");
    let fx = GuardFixture::new();
    let message = sample_message();

    for (scheme, key) in [(ids::HMAC_SHA256, MAC_KEY), (ids::HMAC_SHA512, MAC_KEY), (ids::ED25519, SIGNER_KEY)] {
        let pipeline = signed_pipeline(&fx, scheme, key);
        let encoded = pipeline.execute(message.clone()).expect("sign");

        group.bench_function(BenchmarkId::new("sign", scheme), |b| {
            b.iter(|| pipeline.execute(black_box(message.clone())).unwrap())
        });
        group.bench_function(BenchmarkId::new("verify", scheme), |b| {
            b.iter(|| pipeline.execute_backward(black_box(encoded.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_authorization(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let fx = GuardFixture::new();

    let mut group = c.benchmark_group("authorization");
    for (label, security) in [("unsigned", ManifestSecurity::Unsigned), ("signed", GuardFixture::signed())] {
        let manager = fx.manager(&GuardFixture::config(security));
        let manifest = fx.manifest(
            "/bench/module",
            b"artifact",
            &[("publish", "ndn:/intel/*"), ("subscribe", "ndn:/intel/node/events")],
        );
        fx.install(&manager, &manifest, b"artifact");
        rt.block_on(manager.retrieve_permissions("/bench/module")).expect("loads");

        group.bench_function(BenchmarkId::new("cached", label), |b| {
            b.iter(|| {
                rt.block_on(manager.is_authorized(
                    black_box("/bench/module"),
                    "publish",
                    "ndn:/intel/node/1/info",
                ))
                .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_formatting, bench_signed, bench_authorization);
criterion_main!(benches);
