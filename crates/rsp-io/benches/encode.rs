use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rsp_core::silent_sink;
use rsp_io::{decode, encode_general, ReadOptions, WriteOptions};
use rsp_matrix::GeneralMatrix;

fn populated(fill: f64) -> GeneralMatrix {
    let mut rng = StdRng::seed_from_u64(11);
    let mut matrix = GeneralMatrix::new("bench").with_sink(silent_sink());
    matrix.add_axis_logarithmic("Energy", 40, 10.0, 10_000.0, None, None).unwrap();
    matrix.add_axis_fisbel("Phi", "Theta", 500, 0.0).unwrap();
    for value in matrix.values_mut() {
        if rng.gen_bool(fill) {
            *value = rng.gen_range(0.0..100.0);
        }
    }
    matrix
}

fn encode_bench(c: &mut Criterion) {
    let write = WriteOptions::default().with_sink(silent_sink());
    let read = ReadOptions::default().with_sink(silent_sink());
    let mut group = c.benchmark_group("encode");
    for (label, fill) in [("dense", 0.8), ("sparse", 0.02)] {
        let matrix = populated(fill);
        let encoded = encode_general(&matrix, &write).unwrap();
        group.bench_function(format!("{label}_encode"), |b| {
            b.iter(|| black_box(encode_general(&matrix, &write).unwrap()))
        });
        group.bench_function(format!("{label}_decode"), |b| {
            b.iter(|| black_box(decode(&encoded.bytes, &read).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, encode_bench);
criterion_main!(benches);
