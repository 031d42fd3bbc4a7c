use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gabbygrove::{BinaryRef, Encoder, Keypair, Transfer};
use gabbygrove_testkit::vectors::{DEAD_AUTHOR_URI, DEAD_SEED};
use serde_json::json;

fn fake_previous() -> BinaryRef {
    BinaryRef::Message(*b"prevprevprevprevprevprevprevprev")
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let encoder = Encoder::new(Keypair::from_seed(&DEAD_SEED));
    let previous = fake_previous();
    let msg = json!({
        "type": "contact",
        "contact": DEAD_AUTHOR_URI,
        "spectating": true,
    });

    for count in [5u64, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                for k in (1..=count).rev() {
                    let entry = encoder.encode(k + 1, Some(&previous), msg.clone()).unwrap();
                    black_box(entry);
                }
            })
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    let encoder = Encoder::new(Keypair::from_seed(&DEAD_SEED));
    let previous = fake_previous();

    for count in [5u64, 500] {
        let wire: Vec<Vec<u8>> = (1..=count)
            .rev()
            .map(|k| {
                let (tr, _) = encoder.encode(k + 1, Some(&previous), json!(true)).unwrap();
                tr.to_cbor()
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &wire, |b, wire| {
            b.iter(|| {
                for bytes in wire {
                    let tr = Transfer::from_cbor(bytes).unwrap();
                    assert!(tr.verify(None));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_verify);
criterion_main!(benches);
