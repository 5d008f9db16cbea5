use chrono::Utc;
use proptest::prelude::*;
use serde_json::json;
use sherlock_bia::data::{Catalog, Session, SkillModifiers};
use sherlock_bia::game::puzzle::{decode_caesar, generate_options};
use sherlock_bia::game::scoring::{evaluate, MAX_PENALTY};
use sherlock_bia::game::{ClueOutcome, ManualClock, ScriptedPrompter, SessionStore};
use sherlock_bia::store::{merge_json, MemoryStore, STORAGE_KEY};
use sherlock_bia::Game;

fn new_game() -> Game {
    let sessions = SessionStore::open(Box::new(MemoryStore::new()), STORAGE_KEY, "Bia");
    Game::new(
        Catalog::builtin().expect("built-in catalog"),
        sessions,
        Box::new(ManualClock::new(Utc::now())),
    )
}

proptest! {
    #[test]
    fn board_clicks_never_double_count(
        clicks in prop::collection::vec((0.0f32..500.0, 0.0f32..300.0), 1..60),
    ) {
        let mut game = new_game();
        let mut ui = ScriptedPrompter::default();
        game.start_case("c-007").expect("start");

        for (x, y) in clicks {
            match game.spot_difference("c-007", "d2", x, y, &mut ui).expect("click") {
                ClueOutcome::Board { found, total, .. } => prop_assert!(found < total),
                ClueOutcome::Found | ClueOutcome::AlreadyHeld => {}
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }

        let session = game.session("c-007").expect("session");
        let state = &session.difference_game_states["diff_quadro"];
        let mut distinct = state.found_differences.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(distinct.len(), state.found_differences.len());
        prop_assert!(state.found_differences.iter().all(|&i| i < 3));
        prop_assert_eq!(session.errors, 0);
        prop_assert_eq!(session.has_clue("d2"), state.found_differences.len() == 3);
        prop_assert!(session.clues.iter().filter(|c| c.as_str() == "d2").count() <= 1);
    }

    #[test]
    fn evaluation_is_deterministic_and_bounded(
        errors in 0u32..20,
        hints in 0u32..20,
        elapsed in 0u64..7200,
        found in prop::sample::subsequence(vec!["k1", "k2", "k3", "z_conf"], 0..=4),
    ) {
        let catalog = Catalog::builtin().expect("built-in catalog");
        let case = catalog.case("c-001").expect("case");
        let mut session = Session::new("c-001", Utc::now());
        session.errors = errors;
        session.hints = hints;
        session.clues = found.iter().map(|c| c.to_string()).collect();
        let modifiers = SkillModifiers::default();

        let first = evaluate(case, &session, elapsed, &modifiers);
        let second = evaluate(case, &session, elapsed, &modifiers);
        prop_assert_eq!(first, second);
        prop_assert!((1..=3).contains(&first.stars));
        prop_assert!(first.score >= -MAX_PENALTY);
        prop_assert_eq!(first.clean, errors == 0 && hints == 0);
        prop_assert_eq!(first.found_count, found.len());
    }

    #[test]
    fn stored_values_win_and_gaps_are_backfilled(
        coins in 0u32..1000,
        level in 1u32..50,
        keep_level in any::<bool>(),
    ) {
        let mut base = json!({
            "user": {
                "name": "Bia",
                "level": 1,
                "coins": 0,
                "settings": { "largeFont": false, "narration": false }
            },
            "sessions": {}
        });
        let mut user = json!({ "coins": coins, "settings": { "largeFont": true } });
        if keep_level {
            user["level"] = json!(level);
        }
        merge_json(&mut base, json!({ "user": user, "sessions": null }));

        prop_assert_eq!(&base["user"]["coins"], &json!(coins));
        prop_assert_eq!(&base["user"]["level"], &json!(if keep_level { level } else { 1 }));
        prop_assert_eq!(&base["user"]["name"], &json!("Bia"));
        prop_assert_eq!(&base["user"]["settings"]["largeFont"], &json!(true));
        prop_assert_eq!(&base["user"]["settings"]["narration"], &json!(false));
        prop_assert!(base["sessions"].is_object());
    }

    #[test]
    fn caesar_shift_zero_is_identity(text in "[a-zA-Z ]{0,40}") {
        prop_assert_eq!(decode_caesar(&text, 0), text);
    }

    #[test]
    fn generated_options_contain_the_answer(answer in -100i32..100) {
        let answer = answer as f64;
        let options = generate_options(answer);
        prop_assert!(options.contains(&answer));
        prop_assert!(options.len() <= 5);
        prop_assert!(options.windows(2).all(|w| w[0] < w[1]));
    }
}
