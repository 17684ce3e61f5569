//! Command-line interface for gamebot.

use clap::{Parser, Subcommand};
use gamebot_tictactoe::Difficulty;

/// Gamebot - chat bot games from the terminal
#[derive(Parser, Debug)]
#[command(name = "gamebot")]
#[command(about = "Tic-tac-toe and dice from the chat bot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to TOML configuration (defaults apply if missing)
    #[arg(short, long, default_value = "gamebot.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play tic-tac-toe in the terminal
    Play {
        /// Your player name
        #[arg(long, default_value = "you")]
        name: String,

        /// Play against another local player instead of the computer
        #[arg(long, conflicts_with = "difficulty")]
        opponent: Option<String>,

        /// Computer strength (easy, medium, hard)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Print each view as JSON instead of a board
        #[arg(long)]
        json: bool,
    },

    /// Roll dice, e.g. 2d6+3
    Roll {
        /// Dice expression
        dice: String,
    },
}
