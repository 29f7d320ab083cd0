//! Tests for the account gatekeeper and the authorized save path.

use chrono::{Duration, Utc};
use tempfile::NamedTempFile;

use rps_arena::{
    Claims, GameService, NewPlayer, PlayerRepository, ServiceError, SessionBatch, TokenKey,
};

const SECRET: &str = "test-secret";

fn setup_service() -> (NamedTempFile, GameService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = PlayerRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");

    let service = GameService::new(repo, TokenKey::new(SECRET));
    (db_file, service)
}

#[test]
fn test_signup_then_login_with_correct_password() {
    let (_db, service) = setup_service();

    let (token, player) = service
        .signup("judy@example.com", "Judy", "hunter22")
        .expect("Signup failed");
    assert!(!token.is_empty());
    assert_eq!(player.player_name(), "Judy");

    let (token, player) = service
        .login("judy@example.com", None, Some("hunter22"))
        .expect("Login failed");
    assert!(!token.is_empty());
    assert_eq!(player.player_name(), "Judy");
}

#[test]
fn test_login_wrong_password_is_unauthorized() {
    let (_db, service) = setup_service();
    service
        .signup("kim@example.com", "Kim", "hunter22")
        .expect("Signup failed");

    let result = service.login("kim@example.com", None, Some("wrong-pass"));
    assert!(matches!(result, Err(ServiceError::InvalidCredentials)));
}

#[test]
fn test_login_missing_password_is_bad_request() {
    let (_db, service) = setup_service();
    service
        .signup("lee@example.com", "Lee", "hunter22")
        .expect("Signup failed");

    let result = service.login("lee@example.com", None, None);
    assert!(matches!(result, Err(ServiceError::PasswordRequired)));
}

#[test]
fn test_login_unknown_email_is_not_found() {
    let (_db, service) = setup_service();
    let result = service.login("ghost@example.com", None, Some("hunter22"));
    assert!(matches!(result, Err(ServiceError::AccountNotFound)));
}

#[test]
fn test_signup_conflicts_with_registered_email() {
    let (_db, service) = setup_service();
    service
        .signup("max@example.com", "Max", "hunter22")
        .expect("Signup failed");

    let result = service.signup("max@example.com", "Maxine", "other-pass");
    assert!(matches!(result, Err(ServiceError::EmailTaken)));
}

#[test]
fn test_email_lookup_is_case_insensitive() {
    let (_db, service) = setup_service();
    service
        .signup("Nia@Example.COM", "Nia", "hunter22")
        .expect("Signup failed");

    let (_, player) = service
        .login("nia@example.com", None, Some("hunter22"))
        .expect("Login failed");
    assert_eq!(player.email(), "nia@example.com");

    let result = service.signup("NIA@example.com", "Nia2", "hunter22");
    assert!(matches!(result, Err(ServiceError::EmailTaken)));
}

#[test]
fn test_signup_upgrades_passwordless_account() {
    let (_db, service) = setup_service();

    // An email-only record, as left behind by a passwordless login flow.
    let bare = service
        .repository()
        .create_player(NewPlayer::new(
            "Olga".to_string(),
            "olga@example.com".to_string(),
            None,
        ))
        .expect("Create failed");

    let (_, upgraded) = service
        .signup("olga@example.com", "Olga Prime", "hunter22")
        .expect("Upgrade signup failed");

    assert_eq!(upgraded.id(), bare.id(), "Upgrade must not duplicate the account");
    assert_eq!(upgraded.player_name(), "Olga Prime");
    assert!(upgraded.password_hash().is_some());
}

#[test]
fn test_passwordless_login_skips_check_and_renames() {
    let (_db, service) = setup_service();
    service
        .repository()
        .create_player(NewPlayer::new(
            "Pat".to_string(),
            "pat@example.com".to_string(),
            None,
        ))
        .expect("Create failed");

    let (token, player) = service
        .login("pat@example.com", Some("Patricia"), None)
        .expect("Passwordless login failed");
    assert!(!token.is_empty());
    assert_eq!(player.player_name(), "Patricia");
}

#[test]
fn test_authorize_round_trip() {
    let (_db, service) = setup_service();
    let (token, player) = service
        .signup("quin@example.com", "Quin", "hunter22")
        .expect("Signup failed");

    let claims = service
        .authorize(Some(&format!("Bearer {}", token)))
        .expect("Authorize failed");
    assert_eq!(claims.player_id, *player.id());
    assert_eq!(claims.email, "quin@example.com");
    assert_eq!(claims.player_name, "Quin");
}

#[test]
fn test_authorize_rejects_missing_and_malformed_tokens() {
    let (_db, service) = setup_service();

    assert!(matches!(
        service.authorize(None),
        Err(ServiceError::Auth(_))
    ));
    assert!(matches!(
        service.authorize(Some("Token abc")),
        Err(ServiceError::Auth(_))
    ));
    assert!(matches!(
        service.authorize(Some("Bearer not.a.jwt")),
        Err(ServiceError::Auth(_))
    ));
}

#[test]
fn test_authorize_rejects_expired_and_forged_tokens() {
    let key = TokenKey::new(SECRET);

    let expired = Claims::new(
        1,
        "old@example.com".to_string(),
        "Old".to_string(),
        Utc::now() - Duration::days(30),
    );
    let token = key.sign(&expired).expect("Sign failed");
    assert!(key.verify(&token).is_err(), "Expired token must not verify");

    let fresh = Claims::new(
        1,
        "new@example.com".to_string(),
        "New".to_string(),
        Utc::now(),
    );
    let forged = TokenKey::new("other-secret")
        .sign(&fresh)
        .expect("Sign failed");
    assert!(key.verify(&forged).is_err(), "Forged token must not verify");
}

#[test]
fn test_save_score_merges_for_claim_holder() {
    let (_db, service) = setup_service();
    let (token, player) = service
        .signup("rita@example.com", "Rita", "hunter22")
        .expect("Signup failed");

    let claims = service
        .authorize(Some(&format!("Bearer {}", token)))
        .expect("Authorize failed");

    let batch = SessionBatch {
        games_played: 6,
        games_won: 4,
        ending_streak: 2,
        peak_streak: 3,
        peak_score: 4,
        history: Vec::new(),
    };
    let (updated, session) = service
        .save_score(&claims, &batch, 66.7)
        .expect("Save failed");

    assert_eq!(updated.id(), player.id());
    assert_eq!(*updated.total_games(), 6);
    assert_eq!(*updated.total_wins(), 4);
    assert_eq!(*updated.max_streak(), 3);
    assert_eq!(*session.player_id(), *player.id());
}

#[test]
fn test_save_score_for_vanished_player_fails() {
    let (_db, service) = setup_service();

    let key = TokenKey::new(SECRET);
    let claims = Claims::new(
        4242,
        "vanished@example.com".to_string(),
        "Ghost".to_string(),
        Utc::now(),
    );
    // The claim verifies, but nobody matches it.
    let token = key.sign(&claims).expect("Sign failed");
    let claims = service
        .authorize(Some(&format!("Bearer {}", token)))
        .expect("Authorize failed");

    let result = service.save_score(&claims, &SessionBatch::default(), 0.0);
    assert!(matches!(result, Err(ServiceError::TokenPlayerMissing)));
}
