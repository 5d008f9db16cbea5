//! Case evaluation and rewards

use crate::data::{Case, CaseResult, Medal, Session, SkillModifiers, UserProfile};

/// Cap on the mistake and hint penalty
pub const MAX_PENALTY: i64 = 30;
pub const ERROR_PENALTY: i64 = 3;
pub const HINT_PENALTY: i64 = 5;
/// Time bonus before minutes are subtracted
pub const BASE_TIME_BONUS: i64 = 20;
/// Solving within this many minutes counts as fast
pub const FAST_MINUTES: i64 = 5;

/// Whole minutes, rounding half up
pub fn minutes_spent(elapsed_seconds: u64) -> i64 {
    ((elapsed_seconds + 30) / 60) as i64
}

pub fn penalty(errors: u32, hints: u32, modifiers: &SkillModifiers) -> i64 {
    let hint_term = if modifiers.hints_free_of_penalty {
        0
    } else {
        hints as i64 * HINT_PENALTY
    };
    (errors as i64 * ERROR_PENALTY + hint_term).min(MAX_PENALTY)
}

pub fn time_bonus(minutes: i64, modifiers: &SkillModifiers) -> i64 {
    (BASE_TIME_BONUS - minutes).max(0) + modifiers.time_bonus
}

/// Score a session. Deterministic in the found clues, the counters and
/// the elapsed time.
pub fn evaluate(
    case: &Case,
    session: &Session,
    elapsed_seconds: u64,
    modifiers: &SkillModifiers,
) -> CaseResult {
    let found: Vec<_> = case.clues.iter().filter(|c| session.has_clue(&c.id)).collect();
    let weights: i64 = found.iter().map(|c| c.weight as i64).sum();

    let minutes = minutes_spent(elapsed_seconds);
    let score = weights - penalty(session.errors, session.hints, modifiers)
        + time_bonus(minutes, modifiers);

    let all_found = case.essential_clues().all(|c| session.has_clue(&c.id));
    let fast = minutes <= FAST_MINUTES;
    let clean = session.errors == 0 && session.hints == 0;

    let stars = (1 + u8::from(all_found) + u8::from(clean)).min(3);

    CaseResult {
        score,
        stars,
        found_count: found.len(),
        all_found,
        fast,
        clean,
    }
}

/// Medals a result qualifies for
pub fn qualifying_medals(result: &CaseResult) -> Vec<Medal> {
    Medal::ALL
        .into_iter()
        .filter(|medal| match medal {
            Medal::NoErrorsNoHints => result.clean,
            Medal::EagleEye => result.all_found,
            Medal::Lightning => result.fast,
        })
        .collect()
}

/// Credit points and coins, and grant medals not already held.
/// Returns the newly granted medals.
pub fn grant_rewards(profile: &mut UserProfile, result: &CaseResult) -> Vec<Medal> {
    profile.points += result.score.max(0) as u64;
    profile.coins += result.stars as u32;

    qualifying_medals(result)
        .into_iter()
        .filter(|medal| profile.award_medal(*medal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Clue;
    use chrono::Utc;

    fn clue(id: &str, weight: u32, hidden: bool) -> Clue {
        Clue {
            id: id.to_string(),
            text: id.to_string(),
            weight,
            puzzle: None,
            hotspot: None,
            is_hidden_hotspot: hidden,
            requires_reveal: false,
        }
    }

    fn case() -> Case {
        Case {
            id: "t".to_string(),
            title: "Teste".to_string(),
            chapter: 1,
            difficulty: 1,
            intro: String::new(),
            description: String::new(),
            scene: "corridor".to_string(),
            suspects: Vec::new(),
            clues: vec![clue("a", 2, false), clue("b", 5, false), clue("conf", 4, true)],
            dialogues: Default::default(),
            solution: "x".to_string(),
        }
    }

    fn session(clues: &[&str], errors: u32, hints: u32) -> Session {
        let mut s = Session::new("t", Utc::now());
        s.clues = clues.iter().map(|c| c.to_string()).collect();
        s.errors = errors;
        s.hints = hints;
        s
    }

    #[test]
    fn worked_example_scores_21_with_two_stars() {
        let plain = SkillModifiers::default();
        let result = evaluate(&case(), &session(&["a", "b"], 1, 0), 200, &plain);
        assert_eq!(result.score, 7 - 3 + 17);
        assert!(result.all_found);
        assert!(!result.clean);
        assert!(result.fast);
        assert_eq!(result.stars, 2);
        assert_eq!(result.found_count, 2);
    }

    #[test]
    fn penalty_is_capped_and_skill_drops_hint_term() {
        let plain = SkillModifiers::default();
        assert_eq!(penalty(4, 3, &plain), 27);
        assert_eq!(penalty(10, 10, &plain), 30);

        let cheap = SkillModifiers::from_unlocked(&["dica_barata"]);
        assert_eq!(penalty(4, 3, &cheap), 12);
    }

    #[test]
    fn time_bonus_floors_at_zero_before_skill_bonus() {
        let plain = SkillModifiers::default();
        assert_eq!(minutes_spent(89), 1);
        assert_eq!(minutes_spent(90), 2);
        assert_eq!(time_bonus(25, &plain), 0);

        let quick = SkillModifiers::from_unlocked(&["detetive_rapido"]);
        assert_eq!(time_bonus(25, &quick), 50);
        assert_eq!(time_bonus(3, &quick), 67);
    }

    #[test]
    fn clean_full_solve_earns_three_stars() {
        let plain = SkillModifiers::default();
        let result = evaluate(&case(), &session(&["a", "b", "conf"], 0, 0), 900, &plain);
        assert_eq!(result.stars, 3);
        assert!(!result.fast);
        assert_eq!(result.score, 11 + 5);
    }

    #[test]
    fn hidden_clues_do_not_block_completeness() {
        let result = evaluate(&case(), &session(&["a"], 0, 1), 60, &SkillModifiers::default());
        assert!(!result.all_found);
        assert_eq!(result.stars, 1);
    }

    #[test]
    fn rewards_never_duplicate_medals() {
        let mut profile = UserProfile::default();
        let result = evaluate(&case(), &session(&["a", "b"], 0, 0), 60, &SkillModifiers::default());

        let first = grant_rewards(&mut profile, &result);
        assert_eq!(first.len(), 3);
        let second = grant_rewards(&mut profile, &result);
        assert!(second.is_empty());
        assert_eq!(profile.medals.len(), 3);
        assert_eq!(profile.coins, 6);
    }

    #[test]
    fn negative_scores_add_no_points() {
        let mut profile = UserProfile::default();
        let result = evaluate(&case(), &session(&[], 10, 0), 3600, &SkillModifiers::default());
        assert!(result.score < 0);
        grant_rewards(&mut profile, &result);
        assert_eq!(profile.points, 0);
        assert_eq!(profile.coins, 1);
    }
}
