//! Tests for database repository operations.

use chrono::Utc;
use tempfile::NamedTempFile;

use rps_arena::{
    GameRecord, HISTORY_LIMIT, LeaderboardSort, Move, NewPlayer, Outcome, PlayerRepository,
    SessionBatch,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, PlayerRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = PlayerRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

fn seed_player(repo: &PlayerRepository, name: &str, email: &str) -> i32 {
    let player = repo
        .create_player(NewPlayer::new(name.to_string(), email.to_string(), None))
        .expect("Create failed");
    *player.id()
}

fn batch(games: u32, wins: u32, streak: u32, score: u32) -> SessionBatch {
    SessionBatch {
        games_played: games,
        games_won: wins,
        ending_streak: streak,
        peak_streak: streak,
        peak_score: score,
        history: Vec::new(),
    }
}

#[test]
fn test_create_player_zeroed_counters() {
    let (_db, repo) = setup_test_db();
    let player = repo
        .create_player(NewPlayer::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            None,
        ))
        .expect("Create failed");

    assert_eq!(player.player_name(), "Alice");
    assert!(*player.id() > 0);
    assert_eq!(*player.total_games(), 0);
    assert_eq!(*player.total_wins(), 0);
    assert_eq!(*player.best_score(), 0);
    assert!(player.password_hash().is_none());
    assert!(player.history().expect("History decode failed").is_empty());
}

#[test]
fn test_create_player_duplicate_email_fails() {
    let (_db, repo) = setup_test_db();
    seed_player(&repo, "Bob", "bob@example.com");
    let result = repo.create_player(NewPlayer::new(
        "Bobby".to_string(),
        "bob@example.com".to_string(),
        None,
    ));
    assert!(result.is_err(), "Duplicate email should fail");
}

#[test]
fn test_find_by_email() {
    let (_db, repo) = setup_test_db();
    seed_player(&repo, "Carol", "carol@example.com");

    let found = repo.find_by_email("carol@example.com").expect("Query failed");
    assert!(found.is_some());
    assert_eq!(found.unwrap().player_name(), "Carol");

    let missing = repo.find_by_email("nobody@example.com").expect("Query failed");
    assert!(missing.is_none());
}

#[test]
fn test_find_by_name_and_id() {
    let (_db, repo) = setup_test_db();
    let id = seed_player(&repo, "Dave", "dave@example.com");

    let by_id = repo.find_by_id(id).expect("Query failed");
    assert_eq!(by_id.unwrap().player_name(), "Dave");

    let by_name = repo.find_by_name("Dave").expect("Query failed");
    assert_eq!(*by_name.unwrap().id(), id);

    assert!(repo.find_by_name("NoSuchPlayer").expect("Query failed").is_none());
}

#[test]
fn test_attach_credentials_upgrades_in_place() {
    let (_db, repo) = setup_test_db();
    let id = seed_player(&repo, "Eve", "eve@example.com");

    let upgraded = repo
        .attach_credentials(id, "Evelyn".to_string(), "$2b$10$fakehash".to_string())
        .expect("Upgrade failed");

    assert_eq!(*upgraded.id(), id);
    assert_eq!(upgraded.player_name(), "Evelyn");
    assert!(upgraded.password_hash().is_some());
    assert_eq!(repo.count_players().expect("Count failed"), 1);
}

#[test]
fn test_save_session_merges_aggregates() {
    let (_db, repo) = setup_test_db();
    let id = seed_player(&repo, "Frank", "frank@example.com");

    let (player, session) = repo
        .save_session(id, &batch(4, 3, 2, 5), 75.0)
        .expect("Save failed");
    assert_eq!(*player.total_games(), 4);
    assert_eq!(*player.total_wins(), 3);
    assert_eq!(*player.current_streak(), 2);
    assert_eq!(*player.best_score(), 5);
    assert_eq!(*session.score(), 5);
    assert_eq!(*session.win_rate(), 75.0);

    // A weaker follow-up session: totals add, peaks hold, streak replaces.
    let (player, _) = repo
        .save_session(id, &batch(2, 0, 0, 1), 0.0)
        .expect("Save failed");
    assert_eq!(*player.total_games(), 6);
    assert_eq!(*player.total_wins(), 3);
    assert_eq!(*player.current_streak(), 0);
    assert_eq!(*player.max_streak(), 2);
    assert_eq!(*player.best_score(), 5);
    assert_eq!(player.win_rate(), 50);
}

#[test]
fn test_save_session_unknown_player_fails() {
    let (_db, repo) = setup_test_db();
    let result = repo.save_session(999, &batch(1, 1, 1, 1), 100.0);
    assert!(result.is_err());
}

#[test]
fn test_save_session_truncates_history() {
    let (_db, repo) = setup_test_db();
    let id = seed_player(&repo, "Grace", "grace@example.com");

    let history: Vec<GameRecord> = (0..HISTORY_LIMIT + 10)
        .map(|n| GameRecord {
            user_choice: Move::Paper,
            comp_choice: Move::Rock,
            result: Outcome::Win,
            timestamp: Utc::now() + chrono::Duration::seconds(n as i64),
        })
        .collect();
    let batch = SessionBatch {
        games_played: history.len() as u32,
        games_won: history.len() as u32,
        ending_streak: 1,
        peak_streak: 1,
        peak_score: 1,
        history: history.clone(),
    };

    let (player, _) = repo.save_session(id, &batch, 100.0).expect("Save failed");
    let stored = player.history().expect("History decode failed");
    assert_eq!(stored.len(), HISTORY_LIMIT);
    // The most recent records survive, oldest first.
    assert_eq!(stored.first(), history.get(10));
    assert_eq!(stored.last(), history.last());
}

#[test]
fn test_leaderboard_orders_by_sort_key() {
    let (_db, repo) = setup_test_db();
    let a = seed_player(&repo, "Ann", "ann@example.com");
    let b = seed_player(&repo, "Ben", "ben@example.com");
    let c = seed_player(&repo, "Cyd", "cyd@example.com");

    repo.save_session(a, &batch(10, 2, 1, 3), 20.0).expect("Save failed");
    repo.save_session(b, &batch(5, 5, 5, 9), 100.0).expect("Save failed");
    repo.save_session(c, &batch(20, 4, 0, 6), 20.0).expect("Save failed");

    let by_score = repo
        .leaderboard(10, LeaderboardSort::BestScore)
        .expect("Leaderboard failed");
    let names: Vec<_> = by_score.iter().map(|p| p.player_name().as_str()).collect();
    assert_eq!(names, ["Ben", "Cyd", "Ann"]);

    let by_games = repo
        .leaderboard(10, LeaderboardSort::TotalGames)
        .expect("Leaderboard failed");
    assert_eq!(by_games[0].player_name(), "Cyd");

    let top_one = repo
        .leaderboard(1, LeaderboardSort::BestScore)
        .expect("Leaderboard failed");
    assert_eq!(top_one.len(), 1);
    assert_eq!(top_one[0].player_name(), "Ben");
}

#[test]
fn test_sort_key_parsing_falls_back_to_best_score() {
    assert_eq!(LeaderboardSort::parse("totalWins"), LeaderboardSort::TotalWins);
    assert_eq!(LeaderboardSort::parse("maxStreak"), LeaderboardSort::MaxStreak);
    assert_eq!(LeaderboardSort::parse("garbage"), LeaderboardSort::BestScore);
}

#[test]
fn test_global_aggregates() {
    let (_db, repo) = setup_test_db();
    assert_eq!(repo.count_players().expect("Count failed"), 0);
    assert_eq!(repo.total_counts().expect("Totals failed"), (0, 0));
    assert!(repo.top_player().expect("Top failed").is_none());

    let a = seed_player(&repo, "Hank", "hank@example.com");
    let b = seed_player(&repo, "Iris", "iris@example.com");
    repo.save_session(a, &batch(8, 4, 1, 6), 50.0).expect("Save failed");
    repo.save_session(b, &batch(2, 2, 2, 9), 100.0).expect("Save failed");

    assert_eq!(repo.count_players().expect("Count failed"), 2);
    assert_eq!(repo.total_counts().expect("Totals failed"), (10, 6));
    assert_eq!(
        repo.top_player().expect("Top failed").unwrap().player_name(),
        "Iris"
    );

    let recent = repo.recent_players(5).expect("Recent failed");
    assert_eq!(recent.len(), 2);
    // Iris saved last.
    assert_eq!(recent[0].player_name(), "Iris");
}

#[test]
fn test_ping_reports_reachable_database() {
    let (_db, repo) = setup_test_db();
    assert!(repo.ping().is_ok());
}
