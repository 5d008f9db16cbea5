//! Core game logic and state management
//!
//! [`Game`] is the single controller: it owns the catalog, the session
//! store and the clock, and every operation takes it explicitly. Anything
//! that needs the player goes through a [`Prompter`].

pub mod clock;
pub mod dialogue;
pub mod economy;
pub mod hints;
pub mod prompt;
pub mod puzzle;
pub mod scoring;
pub mod sessions;
pub mod views;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dialogue::{Conversation, DialogueStep};
pub use hints::{HintContext, HintSource, LocalHints, RetryingHints};
pub use prompt::{Notice, Prompter, Reply, ScriptedPrompter};
pub use sessions::SessionStore;
pub use views::*;

use crate::data::*;
use crate::GameError;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Tunable economy rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Coin price of the reveal-all power-up
    pub power_up_cost: u32,
    pub power_up_seconds: i64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            power_up_cost: 3,
            power_up_seconds: 60,
        }
    }
}

/// Result of trying to collect a clue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClueOutcome {
    /// Newly added to the found set
    Found,
    AlreadyHeld,
    /// Wrong answer; one error counted
    Wrong,
    /// Prompt dismissed; nothing changed
    Cancelled,
    /// A difference board is open and still has regions left
    Board { diff_id: String, found: usize, total: usize },
}

/// Result of an accusation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accusation {
    Solved(CaseResult),
    /// Wrong suspect; one error counted, session stays open
    Wrong,
}

/// What a timer tick observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No open session; the timer should stop
    Stopped,
    Running { elapsed: u64, power_up_expired: bool },
}

/// The main game state
pub struct Game {
    catalog: Catalog,
    sessions: SessionStore,
    clock: Box<dyn Clock>,
    hints: RetryingHints,
    rules: Rules,
}

pub(crate) fn find_case<'a>(catalog: &'a Catalog, case_id: &str) -> Result<&'a Case, GameError> {
    catalog
        .case(case_id)
        .ok_or_else(|| GameError::CaseNotFound(case_id.to_string()))
}

pub(crate) fn find_clue<'a>(case: &'a Case, clue_id: &str) -> Result<&'a Clue, GameError> {
    case.clue(clue_id).ok_or_else(|| GameError::ClueNotFound {
        case: case.id.clone(),
        clue: clue_id.to_string(),
    })
}

/// Whether a clue's hotspot is on screen: it has one, it is unfound, and
/// it needs no reveal, was revealed, or a reveal-all effect is on
pub fn hotspot_visible(
    clue: &Clue,
    session: Option<&Session>,
    modifiers: &SkillModifiers,
    now: DateTime<Utc>,
) -> bool {
    if clue.hotspot.is_none() {
        return false;
    }
    let (found, revealed, power_up) = match session {
        Some(s) => (s.has_clue(&clue.id), s.is_revealed(&clue.id), s.reveal_all_active(now)),
        None => (false, false, false),
    };
    !found && (!clue.requires_reveal || revealed || modifiers.reveal_all_hotspots || power_up)
}

impl Game {
    pub fn new(catalog: Catalog, sessions: SessionStore, clock: Box<dyn Clock>) -> Self {
        Self {
            catalog,
            sessions,
            clock,
            hints: RetryingHints::default(),
            rules: Rules::default(),
        }
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_hints(mut self, hints: RetryingHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn profile(&self) -> &UserProfile {
        self.sessions.profile()
    }

    pub fn session(&self, case_id: &str) -> Option<&Session> {
        self.sessions.session(case_id)
    }

    pub fn document(&self) -> &crate::store::ProgressDocument {
        self.sessions.document()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Combined effect of the profile's unlocked skills
    pub fn modifiers(&self) -> SkillModifiers {
        SkillModifiers::from_unlocked(&self.profile().unlocked_skills)
    }

    /// Case lookup for callers outside the engine
    pub fn case(&self, case_id: &str) -> Result<&Case, GameError> {
        find_case(&self.catalog, case_id)
    }

    fn ensure_open(&self, case_id: &str) -> Result<(), GameError> {
        match self.sessions.session(case_id) {
            Some(s) if s.is_solved() => Err(GameError::CaseClosed(case_id.to_string())),
            _ => Ok(()),
        }
    }

    /// Open a case, creating its session on first visit
    pub fn start_case(&mut self, case_id: &str) -> Result<&Session, GameError> {
        find_case(&self.catalog, case_id)?;
        let now = self.clock.now();
        Ok(self.sessions.ensure_session(case_id, now)?)
    }

    /// Play a case again from scratch. The old session is overwritten.
    pub fn replay_case(&mut self, case_id: &str) -> Result<&Session, GameError> {
        find_case(&self.catalog, case_id)?;
        let now = self.clock.now();
        Ok(self.sessions.restart_session(case_id, now)?)
    }

    /// Elapsed seconds on the case; zero before the first visit
    pub fn elapsed(&self, case_id: &str) -> u64 {
        let now = self.clock.now();
        self.sessions
            .session(case_id)
            .map_or(0, |s| s.elapsed_seconds(now))
    }

    /// Click on a clue. Direct clues are granted at once; puzzle clues ask
    /// the player through `ui`, and difference clues open their board.
    pub fn collect_clue(
        &mut self,
        case_id: &str,
        clue_id: &str,
        ui: &mut dyn Prompter,
    ) -> Result<ClueOutcome, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let clue = find_clue(case, clue_id)?.clone();
        self.ensure_open(case_id)?;
        let now = self.clock.now();

        if self.sessions.ensure_session(case_id, now)?.has_clue(clue_id) {
            ui.notify(Severity::Info, "Pista já registada.");
            return Ok(ClueOutcome::AlreadyHeld);
        }

        match &clue.puzzle {
            None => {
                self.grant_clue(case_id, &clue, ui)?;
                Ok(ClueOutcome::Found)
            }
            Some(Puzzle::Cipher(cipher)) => {
                let prompt = format!(
                    "Decifre: {}\nDica: Deslocamento de {} letras para trás.",
                    cipher.cipher_text, cipher.shift
                );
                match ui.ask_text("🧩 Cifra de César", &prompt) {
                    Some(answer) => self.submit_cipher(case_id, clue_id, &answer, ui),
                    None => {
                        ui.notify(Severity::Info, "Cifra cancelada.");
                        Ok(ClueOutcome::Cancelled)
                    }
                }
            }
            Some(Puzzle::Pattern(pattern)) => {
                let options = puzzle::pattern_options(pattern);
                let labels: Vec<String> =
                    options.iter().map(|n| puzzle::format_number(*n)).collect();
                let sequence: Vec<String> =
                    pattern.sequence.iter().map(|n| puzzle::format_number(*n)).collect();
                let prompt = format!(
                    "Complete a sequência: {}, ??\nDica: {}",
                    sequence.join(", "),
                    pattern.hint
                );
                match ui.choose("🧩 Padrões & Sequências", &prompt, &labels) {
                    Some(i) => match options.get(i) {
                        Some(value) => self.submit_pattern(case_id, clue_id, *value, ui),
                        None => Ok(ClueOutcome::Cancelled),
                    },
                    None => {
                        ui.notify(Severity::Info, "Padrão cancelado.");
                        Ok(ClueOutcome::Cancelled)
                    }
                }
            }
            Some(Puzzle::Difference(diff)) => self.open_board(case_id, clue_id, &diff.diff_id, ui),
        }
    }

    fn puzzle_of<'a>(&'a self, case_id: &str, clue_id: &str) -> Result<&'a Clue, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        find_clue(case, clue_id)
    }

    /// Check a typed cipher answer
    pub fn submit_cipher(
        &mut self,
        case_id: &str,
        clue_id: &str,
        answer: &str,
        ui: &mut dyn Prompter,
    ) -> Result<ClueOutcome, GameError> {
        let clue = self.puzzle_of(case_id, clue_id)?.clone();
        let Some(Puzzle::Cipher(cipher)) = &clue.puzzle else {
            return Err(GameError::PuzzleMismatch {
                clue: clue_id.to_string(),
                expected: PuzzleKind::Cipher,
            });
        };
        self.check_answer(case_id, &clue, puzzle::resolve_cipher(cipher, answer), "Cifra", ui)
    }

    /// Check a chosen pattern value
    pub fn submit_pattern(
        &mut self,
        case_id: &str,
        clue_id: &str,
        answer: f64,
        ui: &mut dyn Prompter,
    ) -> Result<ClueOutcome, GameError> {
        let clue = self.puzzle_of(case_id, clue_id)?.clone();
        let Some(Puzzle::Pattern(pattern)) = &clue.puzzle else {
            return Err(GameError::PuzzleMismatch {
                clue: clue_id.to_string(),
                expected: PuzzleKind::Pattern,
            });
        };
        self.check_answer(case_id, &clue, puzzle::resolve_pattern(pattern, answer), "Padrão", ui)
    }

    fn check_answer(
        &mut self,
        case_id: &str,
        clue: &Clue,
        correct: bool,
        label: &str,
        ui: &mut dyn Prompter,
    ) -> Result<ClueOutcome, GameError> {
        self.ensure_open(case_id)?;
        let now = self.clock.now();
        if self.sessions.ensure_session(case_id, now)?.has_clue(&clue.id) {
            return Ok(ClueOutcome::AlreadyHeld);
        }

        if correct {
            ui.notify(Severity::Ok, &format!("✅ {label} resolvido!"));
            self.grant_clue(case_id, clue, ui)?;
            Ok(ClueOutcome::Found)
        } else {
            let errors = self.sessions.with_session(case_id, now, |s| {
                s.errors += 1;
                s.errors
            })?;
            info!(case = case_id, clue = %clue.id, errors, "wrong puzzle answer");
            ui.notify(Severity::Danger, "❌ Resposta incorreta!");
            Ok(ClueOutcome::Wrong)
        }
    }

    fn grant_clue(
        &mut self,
        case_id: &str,
        clue: &Clue,
        ui: &mut dyn Prompter,
    ) -> Result<bool, GameError> {
        let now = self.clock.now();
        let added = self.sessions.with_session(case_id, now, |s| {
            if s.has_clue(&clue.id) {
                false
            } else {
                s.clues.push(clue.id.clone());
                true
            }
        })?;
        if added {
            info!(case = case_id, clue = %clue.id, "clue collected");
            ui.notify(Severity::Ok, &format!("🔍 Pista encontrada: {}", clue.text));
        }
        Ok(added)
    }

    fn open_board(
        &mut self,
        case_id: &str,
        clue_id: &str,
        diff_id: &str,
        ui: &mut dyn Prompter,
    ) -> Result<ClueOutcome, GameError> {
        let Some(board) = self.catalog.difference(diff_id) else {
            ui.notify(Severity::Danger, "Dados do jogo de diferenças não encontrados!");
            return Err(GameError::BoardNotFound(diff_id.to_string()));
        };
        let total = board.regions.len();
        let now = self.clock.now();
        let (found, complete) = self.sessions.with_session(case_id, now, |s| {
            let state = s
                .difference_game_states
                .entry(diff_id.to_string())
                .or_insert_with(|| DifferenceGameState::new(total));
            (state.found_differences.len(), puzzle::resolve_difference(state))
        })?;
        debug!(
            case = case_id,
            clue = clue_id,
            diff = diff_id,
            found,
            total,
            "difference board opened"
        );

        // Another clue may have finished this board already
        if complete {
            let clue = self.puzzle_of(case_id, clue_id)?.clone();
            self.grant_clue(case_id, &clue, ui)?;
            return Ok(ClueOutcome::Found);
        }
        Ok(ClueOutcome::Board {
            diff_id: diff_id.to_string(),
            found,
            total,
        })
    }

    /// A click on a difference board, in image coordinates. Misses are
    /// ignored; the clue resolves when every region has been found.
    pub fn spot_difference(
        &mut self,
        case_id: &str,
        clue_id: &str,
        x: f32,
        y: f32,
        ui: &mut dyn Prompter,
    ) -> Result<ClueOutcome, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let clue = find_clue(case, clue_id)?.clone();
        let Some(Puzzle::Difference(diff)) = &clue.puzzle else {
            return Err(GameError::PuzzleMismatch {
                clue: clue_id.to_string(),
                expected: PuzzleKind::Difference,
            });
        };
        self.ensure_open(case_id)?;
        let board = self
            .catalog
            .difference(&diff.diff_id)
            .ok_or_else(|| GameError::BoardNotFound(diff.diff_id.clone()))?;
        let total = board.regions.len();
        let hit = board.region_at(x, y);
        let now = self.clock.now();

        if self.sessions.ensure_session(case_id, now)?.has_clue(clue_id) {
            return Ok(ClueOutcome::AlreadyHeld);
        }

        let (newly, found, complete) = self.sessions.with_session(case_id, now, |s| {
            let state = s
                .difference_game_states
                .entry(diff.diff_id.clone())
                .or_insert_with(|| DifferenceGameState::new(total));
            let newly = hit.is_some_and(|region| state.spot(region));
            (newly, state.found_differences.len(), puzzle::resolve_difference(state))
        })?;

        if newly {
            debug!(case = case_id, diff = %diff.diff_id, found, total, "difference spotted");
            ui.notify(Severity::Ok, &format!("Diferença encontrada! ({found}/{total})"));
        }
        if complete {
            ui.notify(Severity::Ok, "Todas as diferenças encontradas! Pista resolvida!");
            self.grant_clue(case_id, &clue, ui)?;
            return Ok(ClueOutcome::Found);
        }
        Ok(ClueOutcome::Board {
            diff_id: diff.diff_id.clone(),
            found,
            total,
        })
    }

    /// Mark a clue's hotspot as revealed. Returns false when it already was.
    pub fn reveal_hotspot(&mut self, case_id: &str, clue_id: &str) -> Result<bool, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        find_clue(case, clue_id)?;
        let now = self.clock.now();
        let added = self.sessions.with_session(case_id, now, |s| {
            if s.is_revealed(clue_id) {
                false
            } else {
                s.revealed_hotspots.push(clue_id.to_string());
                true
            }
        })?;
        if added {
            info!(case = case_id, clue = clue_id, "hotspot revealed");
        }
        Ok(added)
    }

    /// Clues whose hotspots are currently on screen, in catalog order
    pub fn visible_hotspots(&self, case_id: &str) -> Result<Vec<&Clue>, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let session = self.sessions.session(case_id);
        let modifiers = self.modifiers();
        let now = self.clock.now();
        Ok(case
            .clues
            .iter()
            .filter(|c| hotspot_visible(c, session, &modifiers, now))
            .collect())
    }

    /// Accuse a suspect. The right one solves the case and pays out.
    pub fn accuse(
        &mut self,
        case_id: &str,
        suspect_id: &str,
        ui: &mut dyn Prompter,
    ) -> Result<Accusation, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        if case.suspect(suspect_id).is_none() {
            return Err(GameError::SuspectNotFound {
                case: case_id.to_string(),
                suspect: suspect_id.to_string(),
            });
        }
        self.ensure_open(case_id)?;
        let now = self.clock.now();
        let modifiers = SkillModifiers::from_unlocked(&self.sessions.profile().unlocked_skills);

        if !case.is_solution(suspect_id) {
            let errors = self.sessions.with_session(case_id, now, |s| {
                s.errors += 1;
                s.errors
            })?;
            info!(case = case_id, suspect = suspect_id, errors, "wrong accusation");
            ui.notify(Severity::Danger, "❌ Acusação incorreta! Continue a investigar.");
            return Ok(Accusation::Wrong);
        }

        let (result, medals) = self.sessions.update_both(case_id, now, |session, profile| {
            let elapsed = session.elapsed_seconds(now);
            session.time_spent = Some(elapsed);
            session.status = SessionStatus::Solved;
            let result = scoring::evaluate(case, session, elapsed, &modifiers);
            session.result = Some(result);
            let medals = scoring::grant_rewards(profile, &result);
            (result, medals)
        })?;

        info!(
            case = case_id,
            score = result.score,
            stars = result.stars,
            all_found = result.all_found,
            clean = result.clean,
            fast = result.fast,
            "case solved"
        );
        for medal in &medals {
            info!(medal = medal.name(), "medal earned");
            ui.notify(Severity::Ok, &format!("🎖️ Nova Medalha: {}!", medal.name()));
        }
        ui.notify(Severity::Ok, "🎉 Caso resolvido!");
        Ok(Accusation::Solved(result))
    }

    /// Once-per-second timer step for the case on screen
    pub fn tick(&mut self, case_id: &str) -> Result<Tick, GameError> {
        let now = self.clock.now();
        match self.sessions.session(case_id) {
            Some(s) if !s.is_solved() => {}
            _ => return Ok(Tick::Stopped),
        }
        let (elapsed, expired) = self.sessions.with_session(case_id, now, |s| {
            let elapsed = s.elapsed_seconds(now);
            s.time_spent = Some(elapsed);
            let expired = match s.reveal_all_until {
                Some(until) if now >= until => {
                    s.reveal_all_until = None;
                    true
                }
                _ => false,
            };
            (elapsed, expired)
        })?;
        if expired {
            info!(case = case_id, "reveal-all power-up expired");
        }
        Ok(Tick::Running {
            elapsed,
            power_up_expired: expired,
        })
    }

    /// Wipe all progress
    pub fn reset_progress(&mut self) -> Result<(), GameError> {
        warn!("resetting all progress");
        Ok(self.sessions.reset()?)
    }

    pub fn toggle_large_font(&mut self, ui: &mut dyn Prompter) -> Result<bool, GameError> {
        let on = self.sessions.update_profile(|p| {
            p.settings.large_font = !p.settings.large_font;
            p.settings.large_font
        })?;
        info!(large_font = on, "setting changed");
        ui.notify(Severity::Info, "Configuração guardada.");
        Ok(on)
    }

    pub fn toggle_narration(&mut self, ui: &mut dyn Prompter) -> Result<bool, GameError> {
        let on = self.sessions.update_profile(|p| {
            p.settings.narration = !p.settings.narration;
            p.settings.narration
        })?;
        info!(narration = on, "setting changed");
        ui.notify(
            Severity::Info,
            "Configuração guardada. (A narração ainda não está disponível.)",
        );
        Ok(on)
    }
}
