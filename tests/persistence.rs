use chrono::Utc;
use sherlock_bia::data::Catalog;
use sherlock_bia::game::{ManualClock, Reply, ScriptedPrompter, SessionStore};
use sherlock_bia::store::{FileStore, KeyValueStore, ProgressDocument, STORAGE_KEY};
use sherlock_bia::Game;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn open_game(dir: &Path, clock: &ManualClock) -> Game {
    let sessions = SessionStore::open(Box::new(FileStore::new(dir)), STORAGE_KEY, "Bia");
    Game::new(Catalog::builtin().expect("built-in catalog"), sessions, Box::new(clock.clone()))
}

#[test]
fn progress_survives_a_restart() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let clock = ManualClock::new(Utc::now());

    let before = {
        let mut game = open_game(temp_dir.path(), &clock);
        game.start_case("c-001").expect("start");
        let mut ui = ScriptedPrompter::new([Reply::Choice(0), Reply::Cancel, Reply::Choice(1)]);
        game.talk_to("c-001", "zico", &mut ui).expect("talk");
        game.collect_clue("c-001", "k3", &mut ui).expect("k3");
        game.toggle_large_font(&mut ui).expect("setting");
        game.document().clone()
    };

    let game = open_game(temp_dir.path(), &clock);
    assert_eq!(game.document(), &before);

    let session = game.session("c-001").expect("session");
    assert_eq!(session.clues, vec!["z_conf".to_string()]);
    assert_eq!(session.revealed_hotspots, vec!["k1".to_string()]);
    assert_eq!(session.errors, 1);
    assert!(game.profile().settings.large_font);
}

#[test]
fn document_is_stored_under_the_versioned_key() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let clock = ManualClock::new(Utc::now());
    let mut game = open_game(temp_dir.path(), &clock);
    game.start_case("c-002").expect("start");

    let raw = fs::read_to_string(temp_dir.path().join("sbia_state_v1_6.json")).expect("saved file");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    let session = &json["sessions"]["c-002"];
    assert_eq!(session["caseId"], "c-002");
    assert_eq!(session["status"], "open");
    assert!(session["start"].is_i64());
    assert!(json["user"]["unlockedSkills"].is_array());
}

#[test]
fn corrupt_file_starts_fresh() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("sbia_state_v1_6.json"), "{ not json").expect("write");

    let clock = ManualClock::new(Utc::now());
    let mut game = open_game(temp_dir.path(), &clock);
    assert!(game.document().sessions.is_empty());
    assert_eq!(game.profile().name, "Bia");

    // the next save replaces the broken blob
    game.start_case("c-001").expect("start");
    let store = FileStore::new(temp_dir.path());
    let raw = store.get(STORAGE_KEY).expect("read").expect("present");
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[test]
fn older_document_gets_new_fields_backfilled() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut store = FileStore::new(temp_dir.path());
    store
        .set(
            STORAGE_KEY,
            r#"{"user":{"name":"Ana","coins":7},"sessions":{},"week":"2024-03-04"}"#,
        )
        .expect("seed");

    let doc = ProgressDocument::load(&store, STORAGE_KEY, ProgressDocument::for_player("Bia"));
    assert_eq!(doc.user.name, "Ana");
    assert_eq!(doc.user.coins, 7);
    assert_eq!(doc.user.level, 1);
    assert!(doc.user.unlocked_skills.is_empty());
    assert!(!doc.user.settings.large_font);
}

#[test]
fn reset_wipes_the_saved_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let clock = ManualClock::new(Utc::now());
    {
        let mut game = open_game(temp_dir.path(), &clock);
        game.start_case("c-001").expect("start");
        game.reset_progress().expect("reset");
        assert!(game.document().sessions.is_empty());
    }
    let game = open_game(temp_dir.path(), &clock);
    assert!(game.document().sessions.is_empty());
}
