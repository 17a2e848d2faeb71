use ballot_core::{mine::mine_parallel, Block, Payload};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn vote_block(rng: &mut StdRng) -> Block {
    Block::new(
        1,
        1_700_000_000.0,
        Payload::Vote {
            voter_id: format!("V{:05}", rng.gen_range(0..100_000)),
            candidate: "Alice Johnson".into(),
            timestamp: 1_700_000_000.0,
        },
        "0",
        0,
    )
}

fn bench_pow(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let block = vote_block(&mut rng);

    c.bench_function("content_hash", |b| b.iter(|| block.content_hash()));

    c.bench_function("mine_difficulty_3", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            candidate.mine(3);
            candidate
        });
    });

    c.bench_function("mine_parallel_difficulty_3", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            mine_parallel(&mut candidate, 3);
            candidate
        });
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
