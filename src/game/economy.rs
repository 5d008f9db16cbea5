//! Coins: hints, skills and the reveal-all power-up
//!
//! Every purchase checks the balance first and changes nothing when the
//! player cannot pay.

use super::{find_case, hotspot_visible, Game};
use crate::data::{find_skill, millis_precision, Severity};
use crate::game::{HintContext, Prompter};
use crate::GameError;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

impl Game {
    /// Current price of a hint
    pub fn hint_cost(&self) -> u32 {
        self.modifiers().hint_cost()
    }

    /// Pay for a hint and count it against the case. Returns the price paid.
    pub fn purchase_hint(
        &mut self,
        case_id: &str,
        ui: &mut dyn Prompter,
    ) -> Result<u32, GameError> {
        find_case(&self.catalog, case_id)?;
        self.ensure_open(case_id)?;
        let cost = self.hint_cost();
        let available = self.profile().coins;
        if available < cost {
            ui.notify(
                Severity::Warn,
                &format!("Sem moedas suficientes para uma dica. Custo: {cost} moedas."),
            );
            return Err(GameError::InsufficientCoins { needed: cost, available });
        }

        let now = self.clock.now();
        let hints = self.sessions.update_both(case_id, now, |session, profile| {
            profile.spend_coins(cost);
            session.hints += 1;
            session.hints
        })?;
        info!(case = case_id, cost, hints, "hint purchased");
        Ok(cost)
    }

    /// Buy a hint and fetch its text. Text generation can fail on its
    /// own; the purchase stands and the fallback text is shown.
    pub fn request_hint(
        &mut self,
        case_id: &str,
        ui: &mut dyn Prompter,
    ) -> Result<String, GameError> {
        self.purchase_hint(case_id, ui)?;
        ui.notify(Severity::Info, "✨ A Bia está a pensar...");
        let context = self.hint_context(case_id)?;
        let text = self.hints.hint(&context);
        ui.notify(Severity::Info, &format!("✨ Dica da Bia: {text}"));
        Ok(text)
    }

    /// Snapshot of the investigation for a hint source
    pub fn hint_context(&self, case_id: &str) -> Result<HintContext, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let session = self.sessions.session(case_id);
        let modifiers = self.modifiers();
        let now = self.clock.now();
        let found = |id: &str| session.is_some_and(|s| s.has_clue(id));

        Ok(HintContext {
            case_title: case.title.clone(),
            intro: case.intro.clone(),
            suspects: case.suspects.iter().map(|s| s.name.clone()).collect(),
            found: case
                .clues
                .iter()
                .filter(|c| found(&c.id))
                .map(|c| c.text.clone())
                .collect(),
            visible_unfound: case
                .clues
                .iter()
                .filter(|c| hotspot_visible(c, session, &modifiers, now))
                .map(|c| (c.text.clone(), c.requirement()))
                .collect(),
            concealed: case
                .essential_clues()
                .filter(|c| !found(&c.id) && !hotspot_visible(c, session, &modifiers, now))
                .count(),
            errors: session.map_or(0, |s| s.errors),
            hints: session.map_or(0, |s| s.hints),
        })
    }

    /// Buy a skill for good
    pub fn unlock_skill(&mut self, skill_id: &str, ui: &mut dyn Prompter) -> Result<(), GameError> {
        let skill =
            find_skill(skill_id).ok_or_else(|| GameError::SkillNotFound(skill_id.to_string()))?;
        let profile = self.profile();
        if profile.has_skill(skill.id) {
            ui.notify(Severity::Info, "Já desbloqueaste esta habilidade.");
            return Err(GameError::SkillAlreadyUnlocked(skill.id.to_string()));
        }
        if !profile.can_afford(skill.cost) {
            ui.notify(
                Severity::Warn,
                &format!(
                    "Moedas insuficientes para desbloquear {}. Custo: {} moedas.",
                    skill.name, skill.cost
                ),
            );
            return Err(GameError::InsufficientCoins {
                needed: skill.cost,
                available: profile.coins,
            });
        }

        self.sessions.update_profile(|p| {
            p.spend_coins(skill.cost);
            p.unlocked_skills.push(skill.id.to_string());
        })?;
        info!(skill = skill.id, cost = skill.cost, "skill unlocked");
        ui.notify(Severity::Ok, &format!("🎉 Habilidade desbloqueada: {}!", skill.name));
        Ok(())
    }

    /// Reveal every hotspot of an open case for a while. Buying again
    /// while active restarts the countdown.
    pub fn buy_power_up(
        &mut self,
        case_id: &str,
        ui: &mut dyn Prompter,
    ) -> Result<DateTime<Utc>, GameError> {
        find_case(&self.catalog, case_id)?;
        self.ensure_open(case_id)?;
        let cost = self.rules.power_up_cost;
        let available = self.profile().coins;
        if available < cost {
            ui.notify(
                Severity::Warn,
                &format!("Sem moedas suficientes para a lupa mágica. Custo: {cost} moedas."),
            );
            return Err(GameError::InsufficientCoins { needed: cost, available });
        }

        let now = self.clock.now();
        let until = millis_precision(now + Duration::seconds(self.rules.power_up_seconds));
        self.sessions.update_both(case_id, now, |session, profile| {
            profile.spend_coins(cost);
            session.reveal_all_until = Some(until);
        })?;
        info!(case = case_id, cost, %until, "reveal-all power-up bought");
        ui.notify(
            Severity::Ok,
            &format!("🔦 Lupa mágica ativa durante {} segundos!", self.rules.power_up_seconds),
        );
        Ok(until)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::Catalog;
    use crate::game::{ManualClock, ScriptedPrompter, SessionStore, Tick};
    use crate::store::{MemoryStore, STORAGE_KEY};
    use crate::{Game, GameError};
    use chrono::Utc;

    fn game(coins: u32) -> (Game, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        let mut sessions = SessionStore::open(Box::new(MemoryStore::new()), STORAGE_KEY, "Bia");
        sessions.update_profile(|p| p.coins = coins).unwrap();
        (Game::new(Catalog::builtin().unwrap(), sessions, Box::new(clock.clone())), clock)
    }

    #[test]
    fn hint_without_coins_changes_nothing() {
        let (mut game, _) = game(0);
        let mut ui = ScriptedPrompter::default();
        let err = game.purchase_hint("c-001", &mut ui).unwrap_err();
        assert!(matches!(err, GameError::InsufficientCoins { needed: 1, available: 0 }));
        assert_eq!(game.profile().coins, 0);
        assert!(game.session("c-001").map_or(true, |s| s.hints == 0));
    }

    #[test]
    fn cheap_hints_skill_makes_hints_free() {
        let (mut game, _) = game(5);
        let mut ui = ScriptedPrompter::default();
        game.unlock_skill("dica_barata", &mut ui).unwrap();
        assert_eq!(game.profile().coins, 0);
        assert_eq!(game.hint_cost(), 0);

        assert_eq!(game.purchase_hint("c-001", &mut ui).unwrap(), 0);
        assert_eq!(game.session("c-001").unwrap().hints, 1);
    }

    #[test]
    fn skills_unlock_once_and_never_overdraw() {
        let (mut game, _) = game(9);
        let mut ui = ScriptedPrompter::default();
        game.unlock_skill("olho_clinico", &mut ui).unwrap();
        assert!(matches!(
            game.unlock_skill("olho_clinico", &mut ui),
            Err(GameError::SkillAlreadyUnlocked(_))
        ));
        assert!(matches!(
            game.unlock_skill("detetive_rapido", &mut ui),
            Err(GameError::InsufficientCoins { needed: 10, available: 1 })
        ));
        assert!(matches!(game.unlock_skill("voar", &mut ui), Err(GameError::SkillNotFound(_))));
        assert_eq!(game.profile().unlocked_skills, vec!["olho_clinico".to_string()]);
        assert_eq!(game.profile().coins, 1);
    }

    #[test]
    fn eagle_eye_skill_shows_hidden_hotspots() {
        let (mut game, clock) = game(8);
        let mut ui = ScriptedPrompter::default();
        game.start_case("c-001").unwrap();
        let shows_k1 = |g: &Game| g.visible_hotspots("c-001").unwrap().iter().any(|c| c.id == "k1");
        assert!(!shows_k1(&game));

        game.unlock_skill("olho_clinico", &mut ui).unwrap();
        assert!(shows_k1(&game));
        assert!(game.session("c-001").unwrap().revealed_hotspots.is_empty());

        // the skill does not wear off like the power-up
        clock.advance_secs(3600);
        assert!(shows_k1(&game));

        game.collect_clue("c-001", "k1", &mut ui).unwrap();
        assert!(!shows_k1(&game));
    }

    #[test]
    fn power_up_reveals_then_expires_on_tick() {
        let (mut game, clock) = game(3);
        let mut ui = ScriptedPrompter::default();
        game.start_case("c-001").unwrap();
        let hidden = |g: &Game| g.visible_hotspots("c-001").unwrap().iter().any(|c| c.id == "k1");
        assert!(!hidden(&game));

        game.buy_power_up("c-001", &mut ui).unwrap();
        assert_eq!(game.profile().coins, 0);
        assert!(hidden(&game));

        clock.advance_secs(61);
        assert!(!hidden(&game));
        assert!(matches!(
            game.tick("c-001").unwrap(),
            Tick::Running { power_up_expired: true, .. }
        ));
        assert!(matches!(
            game.tick("c-001").unwrap(),
            Tick::Running { power_up_expired: false, .. }
        ));
    }

    #[test]
    fn requested_hint_is_paid_before_text() {
        let (mut game, _) = game(1);
        let mut ui = ScriptedPrompter::default();
        let text = game.request_hint("c-001", &mut ui).unwrap();
        assert!(!text.is_empty());
        assert_eq!(game.profile().coins, 0);
        assert_eq!(game.session("c-001").unwrap().hints, 1);
    }
}
