//! Sherlock Bia: a detective mini-game for children
//!
//! Solve small school mysteries by finding clues, cracking ciphers,
//! completing number sequences, spotting differences and talking to
//! suspects before making an accusation.
//!
//! # Game Mechanics
//!
//! - **Clues**: Hotspots on the scene; some are locked behind a puzzle
//! - **Dialogue**: Branching conversations that award clues or reveal hotspots
//! - **Scoring**: Clue weights minus mistakes and hints, plus a time bonus
//! - **Economy**: Coins buy hints, power-ups and permanent skills
//!
//! # Architecture
//!
//! - `data` - Case catalog, clues, dialogue graphs, skills, profile and sessions
//! - `store` - Key-value persistence and the progress document
//! - `game` - The engine: sessions, puzzles, dialogue, scoring, economy
//! - `tui` - Terminal user interface with ratatui
//! - `config` - File-based settings

pub mod config;
pub mod data;
pub mod game;
pub mod store;
pub mod tui;

pub use data::*;
pub use game::Game;

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the binary plumbing
pub type Result<T> = anyhow::Result<T>;

/// Failures the engine reports to its callers.
///
/// Wrong puzzle answers and wrong accusations are not errors; they are
/// counted mistakes reported through the operation's outcome.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Clue {clue} not found in case {case}")]
    ClueNotFound { case: String, clue: String },

    #[error("Suspect {suspect} not found in case {case}")]
    SuspectNotFound { case: String, suspect: String },

    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("Dialogue node {node} missing for suspect {suspect}")]
    DialogueMissing { suspect: String, node: String },

    #[error("Not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: u32, available: u32 },

    #[error("Skill already unlocked: {0}")]
    SkillAlreadyUnlocked(String),

    #[error("Clue {clue} is not a {expected} puzzle")]
    PuzzleMismatch { clue: String, expected: PuzzleKind },

    #[error("Difference board not found: {0}")]
    BoardNotFound(String),

    #[error("Case {0} is already solved")]
    CaseClosed(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error(transparent)]
    Storage(#[from] store::StoreError),
}
