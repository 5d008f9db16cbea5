//! The presentation boundary the engine calls out to
//!
//! The engine never draws anything itself. When an operation needs the
//! player (a cipher answer, a pattern choice, a dialogue option) it asks a
//! [`Prompter`], and it reports outcomes as fire-and-forget notices.

use crate::data::Severity;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// A short-lived message for the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.to_string(),
        }
    }
}

pub trait Prompter {
    /// Free-text modal; `None` when cancelled
    fn ask_text(&mut self, title: &str, prompt: &str) -> Option<String>;

    /// Option modal; the chosen index, or `None` when cancelled
    fn choose(&mut self, title: &str, prompt: &str, options: &[String]) -> Option<usize>;

    fn notify(&mut self, severity: Severity, message: &str);
}

/// One pre-recorded reply for [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Choice(usize),
    Cancel,
}

/// Replays canned answers in order and records every notice.
///
/// Runs out gracefully: an exhausted script cancels.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    replies: VecDeque<Reply>,
    pub notices: Vec<Notice>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, reply: Reply) {
        self.replies.push_back(reply);
    }

    pub fn saw(&self, severity: Severity, fragment: &str) -> bool {
        self.notices
            .iter()
            .any(|n| n.severity == severity && n.message.contains(fragment))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_text(&mut self, title: &str, _prompt: &str) -> Option<String> {
        self.asked.push(title.to_string());
        match self.replies.pop_front() {
            Some(Reply::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn choose(&mut self, title: &str, _prompt: &str, options: &[String]) -> Option<usize> {
        self.asked.push(title.to_string());
        match self.replies.pop_front() {
            Some(Reply::Choice(i)) if i < options.len() => Some(i),
            _ => None,
        }
    }

    fn notify(&mut self, severity: Severity, message: &str) {
        self.notices.push(Notice::new(severity, message));
    }
}
