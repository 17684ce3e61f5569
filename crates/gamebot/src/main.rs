//! Gamebot - Unified CLI
//!
//! Plays the bot's games from a terminal.

#![warn(missing_docs)]

mod cli;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use gamebot::{BotConfig, DiceSpec, GameRequest, SessionCoordinator, SessionError};
use gamebot_tictactoe::{Difficulty, Position};
use std::path::Path;
use std::sync::Arc;
use terminal::TerminalPresenter;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Play {
            name,
            opponent,
            difficulty,
            json,
        } => run_play(config, name, opponent, difficulty, json).await,
        Command::Roll { dice } => run_roll(&dice),
    }
}

/// Reads the config file if present, then applies environment overrides.
#[instrument(skip_all, fields(path = %path.display()))]
fn load_config(path: &Path) -> Result<BotConfig> {
    let config = if path.exists() {
        BotConfig::from_file(path)?
    } else {
        info!("No config file, using defaults");
        BotConfig::default()
    };
    Ok(config.with_env_overrides()?)
}

/// Runs one terminal game through the session coordinator.
#[instrument(skip(config))]
async fn run_play(
    config: BotConfig,
    name: String,
    opponent: Option<String>,
    difficulty: Option<Difficulty>,
    json: bool,
) -> Result<()> {
    let coordinator = SessionCoordinator::from_config(&config)
        .with_presenter(Arc::new(TerminalPresenter::new(json)));
    let reaper = coordinator.spawn_reaper(config.reaper_interval());

    let difficulty = match (&opponent, difficulty) {
        (None, None) => Some(*config.default_difficulty()),
        (_, difficulty) => difficulty,
    };
    let id = coordinator
        .open(GameRequest::new(name, opponent, difficulty))
        .context("Failed to start game")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let view = coordinator.view(&id)?;
        let Some(required) = view.required().clone() else {
            break;
        };
        let Some(actor) = required.user else {
            break;
        };

        println!("{} ({}), pick a cell 1-9:", actor, required.mark);
        let Some(line) = lines.next_line().await? else {
            info!("Input closed");
            break;
        };

        let Some(index) = parse_cell(&line) else {
            println!("Please enter a number from 1 to 9.");
            continue;
        };

        match coordinator.submit_move(&id, &actor, index) {
            Ok(_) => {}
            Err(SessionError::SessionNotFound(_)) => break,
            Err(e) => {
                warn!(error = %e, "Move rejected");
                println!("{}", e);
            }
        }
    }

    reaper.abort();
    Ok(())
}

/// Accepts 1-9 (as shown on the board) or a cell label.
fn parse_cell(input: &str) -> Option<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=9).contains(&n) => Some(n - 1),
        Ok(_) => None,
        Err(_) => Position::from_label(trimmed).map(Position::to_index),
    }
}

/// Rolls dice and prints the result.
#[instrument]
fn run_roll(dice: &str) -> Result<()> {
    let spec: DiceSpec = dice.parse()?;
    let roll = spec.roll(&mut rand::thread_rng());
    println!("{}", roll);
    Ok(())
}
