use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use expectimax_2048::engine::{Board, Move};
use expectimax_2048::expectimax::heuristic::evaluate;
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = Vec::new();
    // Empty and two-tile starts
    boards.push(Board::empty(4).unwrap());
    let mut b = Board::new(4, &mut rng).unwrap();
    boards.push(b.clone());
    // Derive a variety of densities deterministically
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..40 {
        if b.apply_move(seq[i % seq.len()]).changed {
            b.spawn_random_tile(&mut rng);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_moves(c: &mut Criterion) {
    let boards = corpus();
    for dir in Move::ALL {
        c.bench_function(&format!("apply_move/{dir}"), |bch| {
            bch.iter_batched(
                || boards.clone(),
                |mut bs| {
                    let mut acc = 0u64;
                    for b in bs.iter_mut() {
                        acc += b.apply_move(dir).points;
                    }
                    black_box(acc)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_queries(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("legal_moves", |bch| {
        bch.iter(|| {
            let mut acc = 0usize;
            for b in &boards {
                acc += b.legal_moves().len();
            }
            black_box(acc)
        })
    });
    c.bench_function("spawn_random_tile", |bch| {
        let mut rng = StdRng::seed_from_u64(7);
        bch.iter_batched(
            || boards.clone(),
            |mut bs| {
                for b in bs.iter_mut() {
                    b.spawn_random_tile(&mut rng);
                }
                black_box(bs)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("evaluate/phase_adaptive", |bch| {
        bch.iter(|| {
            let mut acc = 0.0;
            for b in &boards {
                acc += evaluate(b, None);
            }
            black_box(acc)
        })
    });
}

criterion_group!(engine_ops, bench_moves, bench_queries);
criterion_main!(engine_ops);
