use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lib_proofs::*;

fn benchmark_zk_proof_generation(c: &mut Criterion) {
    c.bench_function("zk_proof_generation", |b| {
        b.iter(|| {
            // Add actual benchmark code here when the ZK proof system is implemented
            black_box(42)
        })
    });
}

fn benchmark_zk_proof_verification(c: &mut Criterion) {
    c.bench_function("zk_proof_verification", |b| {
        b.iter(|| {
            // Add actual benchmark code here when the ZK proof system is implemented
            black_box(42)
        })
    });
}

criterion_group!(benches, benchmark_zk_proof_generation, benchmark_zk_proof_verification);
criterion_main!(benches);
