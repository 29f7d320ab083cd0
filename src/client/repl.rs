//! Interactive terminal play loop.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::client::{ApiClient, GameState};
use crate::game::{Move, Outcome, random_move};

/// Runs the interactive play loop until the player quits.
///
/// One game is in flight at a time: each round resolves synchronously
/// before the next prompt is read. The snapshot is saved after every
/// state-changing command so progress survives restarts.
///
/// # Errors
///
/// Returns an error if stdin closes unexpectedly or the snapshot cannot be
/// written.
pub async fn run_repl(data_file: PathBuf, server_url: String) -> Result<()> {
    let mut state = GameState::load(&data_file);
    let api = ApiClient::new(server_url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Rock, paper, scissors - first tool to the fight wins.");
    println!(
        "Playing as {} ({} game{} on record).",
        state.player_name,
        state.total_games,
        if state.total_games == 1 { "" } else { "s" }
    );
    print_help();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim().to_lowercase();

        match input.as_str() {
            "" => {}
            "r" | "p" | "s" | "rock" | "paper" | "scissors" => {
                let user = parse_move(&input);
                play_round(&mut state, user);
                state.save(&data_file)?;
            }
            "save" => save_score(&api, &state).await,
            "signup" => {
                signup(&api, &mut state, &mut lines).await?;
                state.save(&data_file)?;
            }
            "login" => {
                login(&api, &mut state, &mut lines).await?;
                state.save(&data_file)?;
            }
            "logout" => {
                state.log_out();
                state.save(&data_file)?;
                println!("Logged out.");
            }
            "board" | "leaderboard" => show_leaderboard(&api).await,
            "stats" => show_stats(&api).await,
            "reset" => {
                state.reset();
                state.save(&data_file)?;
                println!("Scores reset.");
            }
            "help" => print_help(),
            "quit" | "exit" | "q" => {
                state.save(&data_file)?;
                break;
            }
            other => println!("Unknown command '{}'. Type 'help' for commands.", other),
        }
    }

    println!("Thanks for playing!");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  rock/paper/scissors (r/p/s)  play a round");
    println!("  save                         send your score to the server");
    println!("  signup / login / logout      manage your account");
    println!("  board                        show the leaderboard");
    println!("  stats                        show global stats");
    println!("  reset                        zero the session scores");
    println!("  quit                         save and exit");
}

fn parse_move(input: &str) -> Move {
    match input {
        "r" => Move::Rock,
        "p" => Move::Paper,
        "s" => Move::Scissors,
        // Full names round-trip through the strum parser.
        other => Move::from_str(other).unwrap_or(Move::Rock),
    }
}

fn play_round(state: &mut GameState, user: Move) {
    let comp = random_move(&mut rand::thread_rng());
    let result = state.record_round(user, comp, Utc::now());

    match result {
        Outcome::Win => println!("You win! {:?} beats {:?}", user, comp),
        Outcome::Lose => println!("You lose! {:?} beats {:?}", comp, user),
        Outcome::Draw => println!("It's a draw! Both chose {:?}", user),
    }
    println!(
        "You {} - {} CPU | streak {} | win rate {}%",
        state.user_score,
        state.comp_score,
        state.current_streak,
        state.win_rate()
    );
}

async fn save_score(api: &ApiClient, state: &GameState) {
    let Some(token) = state.jwt_token.as_deref().filter(|_| state.is_logged_in) else {
        println!("Please login to save your score!");
        return;
    };

    match api.save_score(token, state).await {
        Ok(saved) => {
            debug!(player_id = saved.player_id, session_id = saved.session_id, "Score saved");
            println!("Score saved successfully!");
        }
        Err(e) => println!("Failed to save score: {}", e),
    }
}

async fn signup(
    api: &ApiClient,
    state: &mut GameState,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    let email = ask(lines, "Email: ").await?;
    let name = ask(lines, "Player name: ").await?;
    let password = ask(lines, "Password: ").await?;

    match api.signup(&email, &name, &password).await {
        Ok(response) => {
            state.log_in(response.player.player_name.clone(), response.token);
            println!("Welcome, {}!", response.player.player_name);
        }
        Err(e) => println!("Signup failed: {}", e),
    }
    Ok(())
}

async fn login(
    api: &ApiClient,
    state: &mut GameState,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    let email = ask(lines, "Email: ").await?;
    let name = ask(lines, "Player name (enter to skip): ").await?;
    let password = ask(lines, "Password (enter to skip): ").await?;

    let name = (!name.is_empty()).then_some(name);
    let password = (!password.is_empty()).then_some(password);

    match api.login(&email, name.as_deref(), password.as_deref()).await {
        Ok(response) => {
            state.log_in(response.player.player_name.clone(), response.token);
            println!("Welcome back, {}!", response.player.player_name);
        }
        Err(e) => println!("Login failed: {}", e),
    }
    Ok(())
}

async fn show_leaderboard(api: &ApiClient) {
    match api.leaderboard(10).await {
        Ok(response) => {
            if response.leaderboard.is_empty() {
                println!("No players yet. Be the first to save a score!");
                return;
            }
            println!("{:<4} {:<20} {:>5} {:>5} {:>6}", "#", "Player", "Best", "Wins", "Games");
            for (rank, entry) in response.leaderboard.iter().enumerate() {
                println!(
                    "{:<4} {:<20} {:>5} {:>5} {:>6}",
                    rank + 1,
                    entry.player_name,
                    entry.best_score,
                    entry.total_wins,
                    entry.total_games
                );
            }
        }
        Err(e) => println!("Failed to load leaderboard: {}", e),
    }
}

async fn show_stats(api: &ApiClient) {
    match api.global_stats().await {
        Ok(response) => {
            let stats = response.stats;
            println!(
                "{} players, {} games, {} wins",
                stats.total_players, stats.total_games, stats.total_wins
            );
            if let Some(top) = stats.top_player {
                println!("Top player: {} (best {})", top.player_name, top.best_score);
            }
        }
        Err(e) => println!("Failed to load stats: {}", e),
    }
}

async fn ask(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.unwrap_or_default().trim().to_string())
}
