use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_session::game_state::chess_types::Square;
use chess_session::registry::registry_config::RegistryConfig;
use chess_session::registry::session_registry::{SessionId, SessionRegistry};
use chess_session::session::game_session::GameSession;
use chess_session::session::opponent::{Opponent, RandomOpponent};

#[derive(Clone, Copy)]
struct SessionCase {
    name: &'static str,
    fen: &'static str,
    source: &'static str,
    target: &'static str,
}

const CASES: &[SessionCase] = &[
    SessionCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        source: "e2",
        target: "e4",
    },
    SessionCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        source: "e1",
        target: "g1",
    },
    SessionCase {
        name: "end_kpk",
        fen: "8/8/8/8/8/4k3/4P3/4K3 w - - 0 1",
        source: "e1",
        target: "d1",
    },
];

fn square(name: &str) -> Square {
    name.parse().expect("benchmark square should parse")
}

fn bench_select_and_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_requests");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(30);

    for case in CASES {
        let session = GameSession::from_fen(case.fen).expect("benchmark FEN should load");
        let source = square(case.source);
        let target = square(case.target);

        group.bench_with_input(BenchmarkId::new("select", case.name), &session, |b, session| {
            b.iter(|| {
                let moves = session
                    .select_and_query(black_box(source))
                    .expect("selection should succeed");
                black_box(moves.len())
            });
        });

        group.bench_with_input(
            BenchmarkId::new("move_and_undo", case.name),
            &session,
            |b, session| {
                let mut session = session.clone();
                b.iter(|| {
                    session
                        .attempt_move(black_box(source), black_box(target), None)
                        .expect("benchmark move should be legal");
                    session.undo_last_move().expect("undo should succeed");
                });
            },
        );
    }

    group.finish();
}

fn bench_random_playout(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_playout");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(4));
    group.sample_size(10);

    group.bench_function("random_100_plies", |b| {
        b.iter(|| {
            let mut session = GameSession::new();
            let mut opponent = RandomOpponent::with_seed(7);
            for _ in 0..100 {
                if !session.is_active() {
                    break;
                }
                let Some(mv) = opponent
                    .choose_move(session.position())
                    .expect("move generation should succeed")
                else {
                    break;
                };
                session
                    .attempt_move(mv.source, mv.target, mv.promotion)
                    .expect("generated move should be legal");
            }
            black_box(session.history().len())
        });
    });

    group.bench_function("registry_lookup_and_query", |b| {
        let registry = SessionRegistry::new(RegistryConfig::default());
        let ids: Vec<SessionId> = (0..64).map(|i| SessionId::new(format!("game-{i}"))).collect();
        for id in &ids {
            registry.new_game(id).expect("session should be created");
        }
        let e2 = square("e2");
        b.iter(|| {
            for id in &ids {
                let moves = registry
                    .with_session(id, |session| session.select_and_query(e2))
                    .expect("query should succeed");
                black_box(moves.len());
            }
        });
    });

    group.finish();
}

criterion_group!(session_benches, bench_select_and_move, bench_random_playout);
criterion_main!(session_benches);
