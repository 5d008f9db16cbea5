//! Case definitions: suspects, clues, puzzles and dialogue graphs
//!
//! Everything here is static content loaded once from the catalog and
//! never mutated during play.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One self-contained mystery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub title: String,
    pub chapter: u32,
    pub difficulty: u8,
    pub intro: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_scene")]
    pub scene: String,
    pub suspects: Vec<Suspect>,
    pub clues: Vec<Clue>,
    #[serde(default)]
    pub dialogues: BTreeMap<String, Dialogue>,
    /// Suspect id of the culprit
    pub solution: String,
}

fn default_scene() -> String {
    "corridor".to_string()
}

impl Case {
    pub fn clue(&self, clue_id: &str) -> Option<&Clue> {
        self.clues.iter().find(|c| c.id == clue_id)
    }

    pub fn suspect(&self, suspect_id: &str) -> Option<&Suspect> {
        self.suspects.iter().find(|s| s.id == suspect_id)
    }

    pub fn dialogue(&self, suspect_id: &str) -> Option<&Dialogue> {
        self.dialogues.get(suspect_id)
    }

    /// Clues that count towards completeness (hidden confession clues excluded)
    pub fn essential_clues(&self) -> impl Iterator<Item = &Clue> {
        self.clues.iter().filter(|c| c.is_essential())
    }

    pub fn is_solution(&self, suspect_id: &str) -> bool {
        self.solution == suspect_id
    }
}

/// A person who can be interviewed or accused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspect {
    pub id: String,
    pub name: String,
    /// Flavor only
    #[serde(default)]
    pub traits: Vec<String>,
}

/// A discoverable fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub puzzle: Option<Puzzle>,
    /// Where the clue sits on the scene; absent for dialogue-only clues
    #[serde(default)]
    pub hotspot: Option<Hotspot>,
    #[serde(default)]
    pub is_hidden_hotspot: bool,
    #[serde(default)]
    pub requires_reveal: bool,
}

impl Clue {
    pub fn requirement(&self) -> PuzzleKind {
        match &self.puzzle {
            None => PuzzleKind::None,
            Some(Puzzle::Cipher(_)) => PuzzleKind::Cipher,
            Some(Puzzle::Pattern(_)) => PuzzleKind::Pattern,
            Some(Puzzle::Difference(_)) => PuzzleKind::Difference,
        }
    }

    pub fn is_essential(&self) -> bool {
        !self.is_hidden_hotspot
    }
}

/// On-scene placement of a clue, in percent of the scene size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    "🔍".to_string()
}

/// The puzzle gating a clue, with its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Puzzle {
    Cipher(CipherPuzzle),
    Pattern(PatternPuzzle),
    Difference(DifferencePuzzle),
}

/// Tag-only view of [`Puzzle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    None,
    Cipher,
    Pattern,
    Difference,
}

impl std::fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PuzzleKind::None => write!(f, "none"),
            PuzzleKind::Cipher => write!(f, "cipher"),
            PuzzleKind::Pattern => write!(f, "pattern"),
            PuzzleKind::Difference => write!(f, "difference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherPuzzle {
    pub cipher_text: String,
    #[serde(default = "default_shift")]
    pub shift: u32,
}

fn default_shift() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternPuzzle {
    pub sequence: Vec<f64>,
    pub answer: f64,
    /// Display only
    #[serde(default)]
    pub hint: String,
    /// Choices offered to the player; generated when empty
    #[serde(default)]
    pub options: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferencePuzzle {
    pub diff_id: String,
}

/// A spot-the-difference board shared by one or more clues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceGame {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub regions: Vec<Region>,
}

impl DifferenceGame {
    /// Index of the region containing the point, if any
    pub fn region_at(&self, x: f32, y: f32) -> Option<usize> {
        self.regions.iter().position(|r| r.contains(x, y))
    }
}

/// A rectangular difference area in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A suspect's conversation graph. Cycles are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialogue {
    pub start: String,
    pub nodes: BTreeMap<String, DialogueNode>,
}

impl Dialogue {
    pub fn node(&self, node_id: &str) -> Option<&DialogueNode> {
        self.nodes.get(node_id)
    }
}

/// A node in the dialogue graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub text: String,
    #[serde(default)]
    pub options: Vec<DialogueOption>,
}

/// A choice the player can make
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueOption {
    pub label: String,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub end: bool,
    #[serde(default)]
    pub effects: Vec<DialogueEffect>,
}

/// Effects of selecting an option. Both are idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogueEffect {
    /// Grant a clue as if found
    Award(String),
    /// Make a `requires_reveal` clue visible
    RevealHotspot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puzzle_payloads_deserialize_by_kind() {
        let clue: Clue = serde_json::from_str(
            r#"{"id":"k2","text":"Bilhete","weight":1,
                "puzzle":{"kind":"cipher","cipherText":"Qeb"}}"#,
        )
        .unwrap();
        assert_eq!(clue.requirement(), PuzzleKind::Cipher);
        match clue.puzzle {
            Some(Puzzle::Cipher(ref c)) => assert_eq!(c.shift, 3),
            _ => panic!("expected cipher"),
        }

        let clue: Clue = serde_json::from_str(
            r#"{"id":"k3","text":"Chave","weight":3,
                "puzzle":{"kind":"pattern","sequence":[2,4,7],"answer":11}}"#,
        )
        .unwrap();
        assert_eq!(clue.requirement(), PuzzleKind::Pattern);
        assert!(!clue.requires_reveal);
        assert!(clue.is_essential());
    }

    #[test]
    fn dialogue_effects_use_short_keys() {
        let option: DialogueOption = serde_json::from_str(
            r#"{"label":"Perguntar","next":"z2",
                "effects":[{"award":"z_conf"},{"revealHotspot":"k1"}]}"#,
        )
        .unwrap();
        assert_eq!(
            option.effects,
            vec![
                DialogueEffect::Award("z_conf".into()),
                DialogueEffect::RevealHotspot("k1".into()),
            ]
        );
        assert!(!option.end);
    }

    #[test]
    fn region_lookup_ignores_misses() {
        let game = DifferenceGame {
            title: String::new(),
            width: 500,
            height: 300,
            regions: vec![
                Region { x: 50.0, y: 50.0, width: 80.0, height: 40.0 },
                Region { x: 200.0, y: 150.0, width: 60.0, height: 30.0 },
            ],
        };
        assert_eq!(game.region_at(60.0, 60.0), Some(0));
        assert_eq!(game.region_at(259.0, 170.0), Some(1));
        assert_eq!(game.region_at(10.0, 10.0), None);
    }
}
