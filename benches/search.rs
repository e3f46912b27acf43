use criterion::{criterion_group, criterion_main, Criterion};
use expectimax_2048::engine::{Board, Move};
use expectimax_2048::expectimax::{Expectimax, ExpectimaxConfig, SamplingConfig};
use expectimax_2048::game::Game;
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(7777);
    let mut boards = Vec::new();
    let mut b = Board::new(4, &mut rng).unwrap();
    boards.push(b.clone());
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..32 {
        if b.apply_move(seq[i % seq.len()]).changed {
            b.spawn_random_tile(&mut rng);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_best_move(c: &mut Criterion) {
    let boards = corpus();
    for depth in [2, 3] {
        let mut sampled = Expectimax::seeded(ExpectimaxConfig::default().with_depth(depth), 1).unwrap();
        c.bench_function(&format!("best_move/sampled/depth{depth}"), |bch| {
            bch.iter(|| {
                for b in &boards {
                    black_box(sampled.best_move(b));
                }
            })
        });
        let exact_cfg = ExpectimaxConfig::default().with_depth(depth).with_sampling(SamplingConfig::EXACT);
        let mut exact = Expectimax::seeded(exact_cfg, 1).unwrap();
        c.bench_function(&format!("best_move/exact/depth{depth}"), |bch| {
            bch.iter(|| {
                for b in &boards {
                    black_box(exact.best_move(b));
                }
            })
        });
    }
}

fn bench_e2e(c: &mut Criterion) {
    let mut group = c.benchmark_group("game");
    group.sample_size(10);
    group.bench_function("depth2/100_moves", |bch| {
        bch.iter(|| {
            let mut game = Game::seeded(4, 3).unwrap();
            let mut ex = Expectimax::seeded(ExpectimaxConfig::default().with_depth(2), 3).unwrap();
            black_box(game.run(&mut ex, Some(100)))
        })
    });
    group.finish();
}

criterion_group!(search, bench_best_move, bench_e2e);
criterion_main!(search);
