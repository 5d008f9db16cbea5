//! The read-only case catalog
//!
//! Loaded once at startup, either from the built-in asset or from a JSON
//! file named in the config.

use super::case::{Case, DialogueEffect, DifferenceGame, Puzzle};
use crate::GameError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

const BUILTIN_CATALOG: &str = include_str!("../../assets/cases.json");

/// All cases plus the difference-game boards they reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub cases: Vec<Case>,
    #[serde(default)]
    pub differences: BTreeMap<String, DifferenceGame>,
}

impl Catalog {
    /// The catalog shipped with the game
    pub fn builtin() -> Result<Self, GameError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| GameError::InvalidCatalog(e.to_string()))?;
        for issue in catalog.validate() {
            warn!(%issue, "catalog issue");
        }
        Ok(catalog)
    }

    pub fn from_path(path: &Path) -> Result<Self, GameError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| GameError::InvalidCatalog(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), cases = catalog.cases.len(), "loaded external catalog");
        Ok(catalog)
    }

    pub fn case(&self, case_id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == case_id)
    }

    pub fn difference(&self, diff_id: &str) -> Option<&DifferenceGame> {
        self.differences.get(diff_id)
    }

    /// Consistency problems in the content. None of them are fatal: the
    /// engine treats dangling references as guarded no-ops.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut case_ids = HashSet::new();

        for case in &self.cases {
            if !case_ids.insert(case.id.as_str()) {
                issues.push(format!("duplicate case id {}", case.id));
            }
            if case.suspect(&case.solution).is_none() {
                issues.push(format!("{}: solution {} is not a suspect", case.id, case.solution));
            }

            let mut clue_ids = HashSet::new();
            for clue in &case.clues {
                if !clue_ids.insert(clue.id.as_str()) {
                    issues.push(format!("{}: duplicate clue id {}", case.id, clue.id));
                }
                if let Some(Puzzle::Difference(d)) = &clue.puzzle {
                    if !self.differences.contains_key(&d.diff_id) {
                        issues.push(format!(
                            "{}: clue {} uses unknown difference board {}",
                            case.id, clue.id, d.diff_id
                        ));
                    }
                }
            }

            for (suspect_id, dialogue) in &case.dialogues {
                if case.suspect(suspect_id).is_none() {
                    issues.push(format!("{}: dialogue for unknown suspect {suspect_id}", case.id));
                }
                if dialogue.node(&dialogue.start).is_none() {
                    issues.push(format!(
                        "{}: {suspect_id} starts at missing node {}",
                        case.id, dialogue.start
                    ));
                }
                for (node_id, node) in &dialogue.nodes {
                    for option in &node.options {
                        if let Some(next) = &option.next {
                            if dialogue.node(next).is_none() {
                                issues.push(format!(
                                    "{}: {suspect_id}/{node_id} points to missing node {next}",
                                    case.id
                                ));
                            }
                        }
                        for effect in &option.effects {
                            let (DialogueEffect::Award(target)
                            | DialogueEffect::RevealHotspot(target)) = effect;
                            if case.clue(target).is_none() {
                                issues.push(format!(
                                    "{}: {suspect_id}/{node_id} targets unknown clue {target}",
                                    case.id
                                ));
                            }
                        }
                    }
                }
            }
        }

        for (diff_id, board) in &self.differences {
            if board.regions.is_empty() {
                issues.push(format!("difference board {diff_id} has no regions"));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads_all_cases() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.cases.len(), 7);
        assert!(catalog.case("c-001").is_some());
        assert!(catalog.difference("diff_quadro").is_some());
        assert_eq!(catalog.difference("diff_quadro").unwrap().regions.len(), 3);
    }

    #[test]
    fn empty_difference_board_is_reported() {
        let mut catalog = Catalog::builtin().unwrap();
        assert!(!catalog.validate().iter().any(|i| i.contains("no regions")));
        if let Some(board) = catalog.differences.get_mut("diff_quadro") {
            board.regions.clear();
        }
        assert!(catalog.validate().iter().any(|i| i.contains("diff_quadro has no regions")));
    }

    #[test]
    fn builtin_catalog_reports_dangling_award() {
        let catalog = Catalog::builtin().unwrap();
        let issues = catalog.validate();
        assert!(issues.iter().any(|i| i.contains("pedro_conf")));
        assert!(!issues.iter().any(|i| i.contains("missing node")));
    }

    #[test]
    fn malformed_catalog_is_rejected() {
        let err = Catalog::from_json("{\"cases\": 3}").unwrap_err();
        assert!(matches!(err, GameError::InvalidCatalog(_)));
    }
}
