//! Suspect interviews
//!
//! A dialogue is walked by holding only the current node id, so cyclic
//! graphs need no special handling. Effects are idempotent: revisiting a
//! node never grants a clue twice.

use super::{find_case, find_clue, Game};
use crate::data::{DialogueEffect, DialogueNode, Severity};
use crate::game::Prompter;
use crate::GameError;
use tracing::{debug, info, warn};

/// Where the conversation goes after a choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueStep {
    Continue(String),
    Ended,
}

/// What a whole conversation changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    pub steps: usize,
    pub awarded: Vec<String>,
    pub revealed: Vec<String>,
}

/// Changes made by one option's effects
#[derive(Debug, Default)]
struct Applied {
    awarded: Vec<String>,
    revealed: Vec<String>,
}

impl Game {
    /// A node of a suspect's dialogue; `None` means the start node
    pub fn dialogue_node(
        &self,
        case_id: &str,
        suspect_id: &str,
        node_id: Option<&str>,
    ) -> Result<(&str, &DialogueNode), GameError> {
        let case = find_case(&self.catalog, case_id)?;
        if case.suspect(suspect_id).is_none() {
            return Err(GameError::SuspectNotFound {
                case: case_id.to_string(),
                suspect: suspect_id.to_string(),
            });
        }
        let missing = |node: &str| GameError::DialogueMissing {
            suspect: suspect_id.to_string(),
            node: node.to_string(),
        };
        let dialogue = case.dialogue(suspect_id).ok_or_else(|| missing("start"))?;
        let id = node_id.unwrap_or(dialogue.start.as_str());
        dialogue
            .nodes
            .get_key_value(id)
            .map(|(k, node)| (k.as_str(), node))
            .ok_or_else(|| missing(id))
    }

    /// Pick option `option` at `node_id`: apply its effects, then follow it
    pub fn choose_dialogue_option(
        &mut self,
        case_id: &str,
        suspect_id: &str,
        node_id: &str,
        option: usize,
        ui: &mut dyn Prompter,
    ) -> Result<DialogueStep, GameError> {
        Ok(self.apply_option(case_id, suspect_id, node_id, option, ui)?.0)
    }

    fn apply_option(
        &mut self,
        case_id: &str,
        suspect_id: &str,
        node_id: &str,
        option: usize,
        ui: &mut dyn Prompter,
    ) -> Result<(DialogueStep, Applied), GameError> {
        let (_, node) = self.dialogue_node(case_id, suspect_id, Some(node_id))?;
        let Some(choice) = node.options.get(option).cloned() else {
            ui.notify(Severity::Info, "Opção inválida ou diálogo encerrado.");
            return Ok((DialogueStep::Ended, Applied::default()));
        };
        debug!(case = case_id, suspect = suspect_id, node = node_id, option, "dialogue choice");

        let mut applied = Applied::default();
        for effect in &choice.effects {
            self.apply_effect(case_id, effect, &mut applied, ui)?;
        }

        let step = if choice.end {
            ui.notify(Severity::Info, "Diálogo encerrado.");
            DialogueStep::Ended
        } else if let Some(next) = choice.next {
            DialogueStep::Continue(next)
        } else {
            ui.notify(Severity::Info, "Opção inválida ou diálogo encerrado.");
            DialogueStep::Ended
        };
        Ok((step, applied))
    }

    fn apply_effect(
        &mut self,
        case_id: &str,
        effect: &DialogueEffect,
        applied: &mut Applied,
        ui: &mut dyn Prompter,
    ) -> Result<(), GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let target = match effect {
            DialogueEffect::Award(id) | DialogueEffect::RevealHotspot(id) => id,
        };
        let clue = match find_clue(case, target) {
            Ok(clue) => clue.clone(),
            Err(_) => {
                warn!(case = case_id, clue = %target, "dialogue effect targets an unknown clue");
                return Ok(());
            }
        };
        let now = self.clock.now();
        let solved = self.sessions.ensure_session(case_id, now)?.is_solved();

        match effect {
            DialogueEffect::Award(_) if solved => {
                debug!(case = case_id, clue = %clue.id, "award skipped on solved case");
            }
            DialogueEffect::Award(_) => {
                let added = self.sessions.with_session(case_id, now, |s| {
                    if s.has_clue(&clue.id) {
                        false
                    } else {
                        s.clues.push(clue.id.clone());
                        true
                    }
                })?;
                if added {
                    info!(case = case_id, clue = %clue.id, "clue awarded by dialogue");
                    ui.notify(
                        Severity::Ok,
                        &format!("🔍 Nova pista obtida através do diálogo: \"{}\"", clue.text),
                    );
                    applied.awarded.push(clue.id);
                } else {
                    ui.notify(Severity::Info, "Já tem esta pista.");
                }
            }
            DialogueEffect::RevealHotspot(_) => {
                if self.reveal_hotspot(case_id, &clue.id)? {
                    ui.notify(Severity::Ok, "🔍 Novo local de interesse revelado!");
                    applied.revealed.push(clue.id);
                }
            }
        }
        Ok(())
    }

    /// Interview a suspect from the start node until the player leaves or
    /// the conversation ends
    pub fn talk_to(
        &mut self,
        case_id: &str,
        suspect_id: &str,
        ui: &mut dyn Prompter,
    ) -> Result<Conversation, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let Some(suspect) = case.suspect(suspect_id) else {
            return Err(GameError::SuspectNotFound {
                case: case_id.to_string(),
                suspect: suspect_id.to_string(),
            });
        };
        let title = format!("💬 Interrogando: {}", suspect.name);
        let Some(dialogue) = case.dialogue(suspect_id) else {
            ui.notify(Severity::Info, "Este suspeito não tem nada a dizer.");
            return Ok(Conversation::default());
        };

        let mut current = dialogue.start.clone();
        let mut conversation = Conversation::default();
        info!(case = case_id, suspect = suspect_id, "interview started");

        loop {
            let node = match self.dialogue_node(case_id, suspect_id, Some(&current)) {
                Ok((_, node)) => node.clone(),
                Err(GameError::DialogueMissing { .. }) => {
                    ui.notify(Severity::Info, "Fim do diálogo.");
                    break;
                }
                Err(e) => return Err(e),
            };
            let labels: Vec<String> = node.options.iter().map(|o| o.label.clone()).collect();

            let Some(choice) = ui.choose(&title, &node.text, &labels) else {
                ui.notify(Severity::Info, "Conversa encerrada.");
                break;
            };

            let (step, applied) = self.apply_option(case_id, suspect_id, &current, choice, ui)?;
            conversation.steps += 1;
            conversation.awarded.extend(applied.awarded);
            conversation.revealed.extend(applied.revealed);

            match step {
                DialogueStep::Continue(next) => current = next,
                DialogueStep::Ended => break,
            }
        }

        debug!(
            case = case_id,
            suspect = suspect_id,
            steps = conversation.steps,
            "interview finished"
        );
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Catalog;
    use crate::game::{ManualClock, Reply, ScriptedPrompter, SessionStore};
    use crate::store::{MemoryStore, STORAGE_KEY};
    use chrono::Utc;

    fn game() -> Game {
        let sessions = SessionStore::open(Box::new(MemoryStore::new()), STORAGE_KEY, "Bia");
        Game::new(Catalog::builtin().unwrap(), sessions, Box::new(ManualClock::new(Utc::now())))
    }

    #[test]
    fn cycles_do_not_regrant_clues() {
        let mut game = game();
        // z1 -> z3 -> z1 -> z2 (award + reveal) -> z4 (award again) -> end
        let mut ui = ScriptedPrompter::new([
            Reply::Choice(1),
            Reply::Choice(0),
            Reply::Choice(0),
            Reply::Choice(0),
            Reply::Choice(0),
        ]);
        let conversation = game.talk_to("c-001", "zico", &mut ui).unwrap();

        assert_eq!(conversation.steps, 5);
        assert_eq!(conversation.awarded, vec!["z_conf".to_string()]);
        assert_eq!(conversation.revealed, vec!["k1".to_string()]);
        let session = game.session("c-001").unwrap();
        assert_eq!(session.clues.iter().filter(|c| *c == "z_conf").count(), 1);
        assert!(ui.saw(Severity::Info, "Já tem esta pista"));
    }

    #[test]
    fn cancelling_midway_ends_without_error() {
        let mut game = game();
        let mut ui = ScriptedPrompter::new([Reply::Choice(1), Reply::Cancel]);
        let conversation = game.talk_to("c-001", "zico", &mut ui).unwrap();
        assert_eq!(conversation.steps, 1);
        assert!(conversation.awarded.is_empty());
        assert!(ui.saw(Severity::Info, "Conversa encerrada"));
    }

    #[test]
    fn step_api_walks_one_choice_at_a_time() {
        let mut game = game();
        let mut ui = ScriptedPrompter::default();
        let (start, node) = game.dialogue_node("c-001", "zico", None).unwrap();
        let start = start.to_string();
        assert!(!node.options.is_empty());

        let step = game.choose_dialogue_option("c-001", "zico", &start, 0, &mut ui).unwrap();
        assert_eq!(step, DialogueStep::Continue("z2".to_string()));
        assert!(game.session("c-001").unwrap().is_revealed("k1"));
    }

    #[test]
    fn unknown_award_target_is_a_no_op() {
        let mut game = game();
        let mut ui = ScriptedPrompter::new(std::iter::repeat(Reply::Choice(0)).take(10));
        game.talk_to("c-007", "pedro", &mut ui).unwrap();
        let session = game.session("c-007").unwrap();
        assert!(!session.has_clue("pedro_conf"));
    }
}
