//! Per-case session records

use super::Id;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle of a session: `Open -> Solved`, terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Open,
    Solved,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Open => write!(f, "open"),
            SessionStatus::Solved => write!(f, "solved"),
        }
    }
}

/// Outcome of a correct accusation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    pub score: i64,
    pub stars: u8,
    pub found_count: usize,
    pub all_found: bool,
    pub fast: bool,
    pub clean: bool,
}

/// Click progress inside one spot-the-difference board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DifferenceGameState {
    pub found_differences: Vec<usize>,
    pub total_differences: usize,
    pub errors: u32,
}

impl DifferenceGameState {
    pub fn new(total: usize) -> Self {
        Self {
            found_differences: Vec::new(),
            total_differences: total,
            errors: 0,
        }
    }

    /// Record a found region; false when it was already found or out of range
    pub fn spot(&mut self, region: usize) -> bool {
        if region >= self.total_differences || self.found_differences.contains(&region) {
            return false;
        }
        self.found_differences.push(region);
        true
    }

    pub fn remaining(&self) -> usize {
        self.total_differences.saturating_sub(self.found_differences.len())
    }

    pub fn is_complete(&self) -> bool {
        self.found_differences.len() >= self.total_differences
    }
}

/// Mutable progress on one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub case_id: String,
    pub session_id: Id,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    pub status: SessionStatus,
    /// Found clue ids; membership is unique
    pub clues: Vec<String>,
    pub revealed_hotspots: Vec<String>,
    pub errors: u32,
    pub hints: u32,
    /// Elapsed seconds as of the last tick, frozen on solve
    pub time_spent: Option<u64>,
    pub result: Option<CaseResult>,
    pub difference_game_states: BTreeMap<String, DifferenceGameState>,
    /// Expiry of the reveal-all power-up
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub reveal_all_until: Option<DateTime<Utc>>,
}

/// Drop sub-millisecond precision so in-memory times match what is stored
pub fn millis_precision(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(t.timestamp_millis()).unwrap_or(t)
}

impl Default for Session {
    fn default() -> Self {
        Self::new("", Utc::now())
    }
}

impl Session {
    pub fn new(case_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            case_id: case_id.to_string(),
            session_id: Id::new(),
            start: millis_precision(now),
            status: SessionStatus::Open,
            clues: Vec::new(),
            revealed_hotspots: Vec::new(),
            errors: 0,
            hints: 0,
            time_spent: None,
            result: None,
            difference_game_states: BTreeMap::new(),
            reveal_all_until: None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status == SessionStatus::Solved
    }

    pub fn has_clue(&self, clue_id: &str) -> bool {
        self.clues.iter().any(|c| c == clue_id)
    }

    pub fn is_revealed(&self, clue_id: &str) -> bool {
        self.revealed_hotspots.iter().any(|c| c == clue_id)
    }

    /// Seconds since the session started, or the frozen value once solved
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match (self.status, self.time_spent) {
            (SessionStatus::Solved, Some(frozen)) => frozen,
            _ => (now - self.start).num_seconds().max(0) as u64,
        }
    }

    pub fn reveal_all_active(&self, now: DateTime<Utc>) -> bool {
        self.reveal_all_until.is_some_and(|until| now < until)
    }

    pub fn reveal_all_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.reveal_all_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }
}

/// A shallow update of session fields. Absent fields are left untouched;
/// set-valued fields are replaced wholesale by the caller's full collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub clues: Option<Vec<String>>,
    pub revealed_hotspots: Option<Vec<String>>,
    pub errors: Option<u32>,
    pub hints: Option<u32>,
    pub time_spent: Option<u64>,
    pub result: Option<CaseResult>,
    pub difference_game_states: Option<BTreeMap<String, DifferenceGameState>>,
    pub reveal_all_until: Option<Option<DateTime<Utc>>>,
}

impl SessionPatch {
    pub fn errors(errors: u32) -> Self {
        Self {
            errors: Some(errors),
            ..Self::default()
        }
    }

    pub fn clues(clues: Vec<String>) -> Self {
        Self {
            clues: Some(clues),
            ..Self::default()
        }
    }

    pub fn revealed_hotspots(revealed: Vec<String>) -> Self {
        Self {
            revealed_hotspots: Some(revealed),
            ..Self::default()
        }
    }

    pub fn apply(self, session: &mut Session) {
        if let Some(status) = self.status {
            session.status = status;
        }
        if let Some(clues) = self.clues {
            session.clues = clues;
        }
        if let Some(revealed) = self.revealed_hotspots {
            session.revealed_hotspots = revealed;
        }
        if let Some(errors) = self.errors {
            session.errors = errors;
        }
        if let Some(hints) = self.hints {
            session.hints = hints;
        }
        if let Some(time_spent) = self.time_spent {
            session.time_spent = Some(time_spent);
        }
        if let Some(result) = self.result {
            session.result = Some(result);
        }
        if let Some(states) = self.difference_game_states {
            session.difference_game_states = states;
        }
        if let Some(until) = self.reveal_all_until {
            session.reveal_all_until = until;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 10, 0, 0).unwrap()
    }

    #[test]
    fn patch_preserves_untouched_fields() {
        let mut session = Session::new("c-001", t0());
        session.clues = vec!["k1".into()];
        session.hints = 2;

        SessionPatch::errors(4).apply(&mut session);

        assert_eq!(session.errors, 4);
        assert_eq!(session.hints, 2);
        assert_eq!(session.clues, vec!["k1".to_string()]);
    }

    #[test]
    fn elapsed_freezes_once_solved() {
        let mut session = Session::new("c-001", t0());
        let later = t0() + Duration::seconds(200);
        assert_eq!(session.elapsed_seconds(later), 200);

        session.status = SessionStatus::Solved;
        session.time_spent = Some(150);
        assert_eq!(session.elapsed_seconds(later + Duration::seconds(999)), 150);
    }

    #[test]
    fn difference_spots_are_idempotent() {
        let mut state = DifferenceGameState::new(3);
        assert!(state.spot(1));
        assert!(!state.spot(1));
        assert!(!state.spot(7));
        assert_eq!(state.remaining(), 2);
        assert!(state.spot(0));
        assert!(state.spot(2));
        assert!(state.is_complete());

        assert!(DifferenceGameState::new(0).is_complete());
    }

    #[test]
    fn start_is_stored_as_epoch_millis() {
        let session = Session::new("c-002", t0());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["start"], serde_json::json!(t0().timestamp_millis()));
        assert_eq!(json["status"], serde_json::json!("open"));
        assert!(json["revealAllUntil"].is_null());
    }
}
