use chess_rival::{
    greedy_move, AiMoveMemory, ChessRules, GamePosition, MoveHistory, MoveScorer, OpeningBook,
    PlayoutSearch, PositionEvaluator, RulesEngine, StaticEvaluator,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

const TEST_POSITIONS: [&str; 4] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", // Starting position
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4", // Two knights
    "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R w KQ - 0 8", // Middle game
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",                        // Endgame position
];

fn positions(rules: &ChessRules) -> Vec<GamePosition> {
    TEST_POSITIONS
        .iter()
        .map(|fen| rules.position_from_fen(fen).expect("Valid FEN"))
        .collect()
}

fn benchmark_static_evaluation(c: &mut Criterion) {
    let rules = ChessRules::new();
    let positions = positions(&rules);
    let evaluator = StaticEvaluator::default();

    c.bench_function("static_evaluation", |b| {
        b.iter(|| {
            for position in &positions {
                black_box(evaluator.evaluate(&rules, position));
            }
        })
    });
}

fn benchmark_move_scoring(c: &mut Criterion) {
    let rules = ChessRules::new();
    let positions = positions(&rules);
    let scorer = MoveScorer::new(StaticEvaluator::default());
    let history = MoveHistory::new();
    let memory = AiMoveMemory::new();

    c.bench_function("score_all_legal_moves", |b| {
        b.iter(|| {
            for position in &positions {
                let mut scratch = position.clone();
                for chess_move in rules.legal_moves(position) {
                    black_box(scorer.score(&rules, &mut scratch, chess_move, &history, &memory));
                }
            }
        })
    });
}

fn benchmark_strategies(c: &mut Criterion) {
    let rules = ChessRules::new();
    let positions = positions(&rules);
    let evaluator = StaticEvaluator::default();
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("greedy_move", |b| {
        b.iter(|| {
            for position in &positions {
                black_box(greedy_move(&rules, &evaluator, position, &mut rng).ok());
            }
        })
    });

    let book_rules = ChessRules::new();
    c.bench_function("opening_book_build", |b| {
        b.iter(|| black_box(OpeningBook::with_standard_openings(&book_rules).ok()))
    });
}

fn benchmark_playout_sweep(c: &mut Criterion) {
    let rules = ChessRules::new();
    let start = rules.initial_position();
    let mut group = c.benchmark_group("playout_sweep");
    group.sample_size(10);

    let sequential = PlayoutSearch::new(Duration::ZERO);
    let mut rng = StdRng::seed_from_u64(2);
    group.bench_function("sequential", |b| {
        b.iter(|| black_box(sequential.search(&rules, &start, &mut rng).ok()))
    });

    let parallel = PlayoutSearch::new(Duration::ZERO).with_parallel(true);
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(parallel.search_parallel(&rules, &start, &mut rng).ok()))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_static_evaluation,
    benchmark_move_scoring,
    benchmark_strategies,
    benchmark_playout_sweep
);
criterion_main!(benches);
