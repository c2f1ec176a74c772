//! Performance benchmarks for the codec and session hot paths

use client::session::Session;
use shared::packet::{Introduction, Setup, SyncEntry, SyncUpdate};
use shared::{
    GameMode, InboundPacket, Leaderboard, OutboundPacket, PhysicalState, ScoreEntry, Standings,
    Vector2, CLIENT_VERSION,
};
use std::time::Instant;

fn active_session(player_id: u32) -> Session {
    let mut session = Session::new(GameMode::FreeForAll);
    let setup = InboundPacket::Setup(Setup {
        version: CLIENT_VERSION.to_string(),
        syncer: 0,
        mode: GameMode::FreeForAll,
        current_player_id: player_id,
        dimensions: Vector2::new(5000.0, 5000.0),
        target_dimensions: Vector2::new(5000.0, 5000.0),
    });
    session.apply(setup).unwrap();
    session
}

fn sync_frame(first_id: u32, count: u32, introduce: bool) -> Vec<u8> {
    let entries = (first_id..first_id + count)
        .map(|id| SyncEntry {
            player_id: id,
            introduction: introduce.then(|| Introduction {
                name: Some(format!("player{}", id)),
                shield: 0.5,
                team_or_skin: (id % 3) as u8,
            }),
            player_state: PhysicalState {
                position: Vector2::new(id as f32 * 10.0, 100.0),
                velocity: Vector2::new(1.0, -1.0),
            },
            mace_state: PhysicalState::AT_REST,
            mace_radius: 12.0,
        })
        .collect();

    InboundPacket::Sync(SyncUpdate {
        timestamp: 1,
        removals: vec![],
        entries,
    })
    .encode()
}

/// Benchmarks decoding sync frames for an already known crowd
#[test]
fn benchmark_sync_decoding() {
    let mut session = active_session(1);
    let introduced = session.decode(&sync_frame(100, 50, true)).unwrap();
    session.apply(introduced.packet).unwrap();

    let frame = sync_frame(100, 50, false);
    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let decoded = session.decode(&frame).unwrap();
        assert!(decoded.is_exact());
    }

    let duration = start.elapsed();
    println!(
        "Sync decoding (50 entries): {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds even in debug builds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks decode plus apply, the per-frame cost of a live session
#[test]
fn benchmark_sync_application() {
    let mut session = active_session(1);
    let introduced = session.decode(&sync_frame(100, 100, true)).unwrap();
    session.apply(introduced.packet).unwrap();

    let frame = sync_frame(100, 100, false);
    let iterations = 5_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let decoded = session.decode(&frame).unwrap();
        session.apply(decoded.packet).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Sync application (100 entries): {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(session.arena().unwrap().player_count(), 101);
    assert!(duration.as_millis() < 5000);
}

/// Stress test: players joining and leaving every frame
#[test]
fn stress_test_player_churn() {
    let mut session = active_session(1);
    let iterations = 2_000;
    let start = Instant::now();

    for i in 0..iterations {
        let first_id = 10 + i * 10;
        let removals = if i == 0 {
            vec![]
        } else {
            (first_id - 10..first_id).collect()
        };
        let entries = (first_id..first_id + 10)
            .map(|id| SyncEntry {
                player_id: id,
                introduction: Some(Introduction {
                    name: Some(format!("p{}", id)),
                    shield: 0.0,
                    team_or_skin: 0,
                }),
                player_state: PhysicalState::AT_REST,
                mace_state: PhysicalState::AT_REST,
                mace_radius: 8.0,
            })
            .collect();

        let frame = InboundPacket::Sync(SyncUpdate {
            timestamp: i,
            removals,
            entries,
        })
        .encode();
        let decoded = session.decode(&frame).unwrap();
        session.apply(decoded.packet).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Player churn: {} frames in {:?} ({:.2} μs/frame)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Only the last wave and the local player remain
    assert_eq!(session.arena().unwrap().player_count(), 11);
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks leaderboard decoding with a full ranking
#[test]
fn benchmark_leaderboard_decoding() {
    let session = active_session(1);
    let entries: Vec<ScoreEntry> = (0..10)
        .map(|i| ScoreEntry {
            name: format!("leader{}", i),
            score: 1000 - i * 50,
        })
        .collect();
    let frame = InboundPacket::SetLeaderboard(Leaderboard {
        player_count: 40,
        total: 40,
        standings: Standings::FreeForAll {
            first_entry_id: 1,
            king: entries[0].clone(),
            entries,
            place: 12,
            score: 300,
        },
    })
    .encode();

    let iterations = 20_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let decoded = session.decode(&frame).unwrap();
        assert!(decoded.is_exact());
    }

    let duration = start.elapsed();
    println!(
        "Leaderboard decoding: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks encoding the one outbound request the client sends
#[test]
fn benchmark_play_encoding() {
    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let frame = OutboundPacket::Play.encode().unwrap();
        assert_eq!(frame.len(), 1);
    }

    let duration = start.elapsed();
    println!(
        "Play encoding: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 1000);
}
