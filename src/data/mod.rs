//! Data structures for the game world
//!
//! Defines cases, clues, dialogue, skills, the player profile and the
//! per-case session records.

pub mod case;
pub mod catalog;
pub mod player;
pub mod session;
pub mod skills;

pub use case::*;
pub use catalog::*;
pub use player::*;
pub use session::*;
pub use skills::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tone of a notification shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Ok,
    Warn,
    Danger,
}

impl Severity {
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Info => "gray",
            Severity::Ok => "green",
            Severity::Warn => "yellow",
            Severity::Danger => "red",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Ok => "✔",
            Severity::Warn => "▲",
            Severity::Danger => "✖",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Ok => write!(f, "OK"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Danger => write!(f, "DANGER"),
        }
    }
}

/// A unique identifier wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub Uuid);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
