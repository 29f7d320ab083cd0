//! Tests for the score aggregation merge.

use chrono::{Duration, TimeZone, Utc};

use rps_arena::{
    GameRecord, HISTORY_LIMIT, Move, Outcome, SessionBatch, StatsSnapshot, apply_batch, win_rate,
};

fn record(n: i64) -> GameRecord {
    GameRecord {
        user_choice: Move::Rock,
        comp_choice: Move::Scissors,
        result: Outcome::Win,
        timestamp: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap() + Duration::seconds(n),
    }
}

fn seeded_snapshot() -> StatsSnapshot {
    StatsSnapshot {
        total_games: 10,
        total_wins: 6,
        current_streak: 2,
        max_streak: 4,
        best_score: 7,
        history: (0..3).map(record).collect(),
        last_played: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn test_apply_batch_merges_totals_and_peaks() {
    let current = seeded_snapshot();
    let batch = SessionBatch {
        games_played: 5,
        games_won: 3,
        ending_streak: 1,
        peak_streak: 3,
        peak_score: 9,
        history: (3..5).map(record).collect(),
    };
    let now = Utc.with_ymd_and_hms(2026, 8, 2, 9, 0, 0).unwrap();

    let merged = apply_batch(&current, &batch, now);

    assert_eq!(merged.total_games, 15);
    assert_eq!(merged.total_wins, 9);
    // Ending streak replaces; it does not accumulate.
    assert_eq!(merged.current_streak, 1);
    // Peaks only ever ratchet upward.
    assert_eq!(merged.max_streak, 4);
    assert_eq!(merged.best_score, 9);
    assert_eq!(merged.history.len(), 5);
    assert_eq!(merged.last_played, now);
}

#[test]
fn test_apply_batch_empty_batch_only_touches_last_played() {
    let current = seeded_snapshot();
    let now = Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap();

    let merged = apply_batch(&current, &SessionBatch::default(), now);

    assert_eq!(merged.total_games, current.total_games);
    assert_eq!(merged.total_wins, current.total_wins);
    assert_eq!(merged.max_streak, current.max_streak);
    assert_eq!(merged.best_score, current.best_score);
    assert_eq!(merged.history, current.history);
    assert_eq!(merged.last_played, now);
    // The empty batch ends on a run of zero wins.
    assert_eq!(merged.current_streak, 0);
}

#[test]
fn test_apply_batch_invariants_hold_for_adversarial_batch() {
    let current = seeded_snapshot();
    // A batch claiming an ending run longer than its own reported peak.
    let batch = SessionBatch {
        games_played: 1,
        games_won: 1,
        ending_streak: 40,
        peak_streak: 2,
        peak_score: 0,
        history: Vec::new(),
    };

    let merged = apply_batch(&current, &batch, Utc::now());

    assert!(merged.max_streak >= merged.current_streak);
    assert!(merged.best_score >= current.best_score);
}

#[test]
fn test_history_retention_keeps_most_recent_in_order() {
    let mut snapshot = StatsSnapshot::zeroed(Utc::now());

    // Three batches totaling 90 records, timestamps strictly increasing.
    for chunk in 0..3 {
        let batch = SessionBatch {
            games_played: 0,
            games_won: 0,
            ending_streak: 0,
            peak_streak: 0,
            peak_score: 0,
            history: (chunk * 30..chunk * 30 + 30).map(|n| record(i64::from(n))).collect(),
        };
        snapshot = apply_batch(&snapshot, &batch, Utc::now());
    }

    assert_eq!(snapshot.history.len(), HISTORY_LIMIT);
    // The oldest 40 of the 90 appended records were evicted.
    let timestamps: Vec<_> = snapshot.history.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps.first(), Some(&record(40).timestamp));
    assert_eq!(timestamps.last(), Some(&record(89).timestamp));
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_win_rate_derivation() {
    assert_eq!(win_rate(0, 0), 0);
    assert_eq!(win_rate(3, 4), 75);
    assert_eq!(win_rate(1, 3), 33);
    assert_eq!(win_rate(2, 3), 67);
    assert_eq!(win_rate(5, 5), 100);
}

#[test]
fn test_counters_saturate_instead_of_wrapping() {
    let mut current = seeded_snapshot();
    current.total_games = u32::MAX - 1;

    let batch = SessionBatch {
        games_played: 10,
        ..SessionBatch::default()
    };

    let merged = apply_batch(&current, &batch, Utc::now());
    assert_eq!(merged.total_games, u32::MAX);
}
