//! The persisted progress document
//!
//! Loading never fails: a missing, unreadable or malformed blob yields the
//! default document, and a stored document missing newer fields has them
//! backfilled from the defaults by a recursive merge.

use super::{KeyValueStore, StoreError};
use crate::data::{Session, UserProfile};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Storage key of the progress document
pub const STORAGE_KEY: &str = "sbia_state_v1_6";

/// Profile, per-case sessions and the week marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressDocument {
    pub user: UserProfile,
    pub sessions: BTreeMap<String, Session>,
    /// ISO date of when the document was created
    pub week: NaiveDate,
}

impl Default for ProgressDocument {
    fn default() -> Self {
        Self::for_player(&UserProfile::default().name)
    }
}

impl ProgressDocument {
    pub fn for_player(name: &str) -> Self {
        Self {
            user: UserProfile::new(name),
            sessions: BTreeMap::new(),
            week: Utc::now().date_naive(),
        }
    }

    /// Read the document under `key`, merged over `defaults`
    pub fn load(store: &dyn KeyValueStore, key: &str, defaults: ProgressDocument) -> Self {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(key, "no saved progress, starting fresh");
                return defaults;
            }
            Err(e) => {
                warn!(key, error = %e, "could not read saved progress, using defaults");
                return defaults;
            }
        };

        let stored: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "saved progress is not valid JSON, using defaults");
                return defaults;
            }
        };
        let Value::Object(mut stored) = stored else {
            warn!(key, "saved progress is not an object, using defaults");
            return defaults;
        };
        let stored_sessions = stored.remove("sessions");

        let mut merged = match serde_json::to_value(&defaults) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "could not encode default progress");
                return defaults;
            }
        };
        merge_json(&mut merged, Value::Object(stored));

        let mut doc = match serde_json::from_value::<ProgressDocument>(merged) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(key, error = %e, "saved profile has the wrong shape, using defaults");
                defaults
            }
        };

        // Sessions load one by one so a broken entry only costs that case
        match stored_sessions {
            Some(Value::Object(sessions)) => {
                let now = Utc::now();
                for (case_id, stored) in sessions {
                    if let Some(session) = load_session(&case_id, stored, now) {
                        doc.sessions.insert(case_id, session);
                    }
                }
            }
            None | Some(Value::Null) => {}
            Some(_) => warn!(key, "saved sessions are not an object, ignoring them"),
        }

        debug!(key, sessions = doc.sessions.len(), "progress loaded");
        doc
    }

    pub fn save(&self, store: &mut dyn KeyValueStore, key: &str) -> Result<(), StoreError> {
        let json = serde_json::to_string(self)?;
        store.set(key, &json)
    }
}

/// Merge one stored session over a fresh one for the same case. `None`
/// when it still does not fit the session shape.
fn load_session(case_id: &str, stored: Value, now: DateTime<Utc>) -> Option<Session> {
    if stored.is_null() {
        return None;
    }
    let mut merged = match serde_json::to_value(Session::new(case_id, now)) {
        Ok(v) => v,
        Err(e) => {
            warn!(case = case_id, error = %e, "could not encode a fresh session");
            return None;
        }
    };
    merge_json(&mut merged, stored);
    match serde_json::from_value::<Session>(merged) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(case = case_id, error = %e, "dropping unreadable saved session");
            None
        }
    }
}

/// Overlay `stored` onto `base`. Objects merge key by key, recursively;
/// anything else replaces the base value. Stored nulls are skipped so they
/// never erase a default, and are dropped from values copied in whole.
pub fn merge_json(base: &mut Value, stored: Value) {
    match (base, stored) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(stored_map)) => {
            for (key, mut value) in stored_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        if !value.is_null() {
                            strip_nulls(&mut value);
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (slot, mut value) => {
            strip_nulls(&mut value);
            *slot = value;
        }
    }
}

/// Drop null members from objects at any depth, so keys with no default
/// to fall back on read as absent
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn merge_backfills_nested_fields() {
        let mut base = json!({
            "user": {"name": "Bia", "coins": 0, "unlockedSkills": []},
            "week": "2024-01-01"
        });
        merge_json(&mut base, json!({"user": {"coins": 9, "name": null}}));
        assert_eq!(base["user"]["coins"], json!(9));
        assert_eq!(base["user"]["name"], json!("Bia"));
        assert_eq!(base["user"]["unlockedSkills"], json!([]));
        assert_eq!(base["week"], json!("2024-01-01"));
    }

    #[test]
    fn missing_newer_fields_are_backfilled() {
        let old = r#"{"user":{"name":"Ana","level":2,"points":40,"coins":5,"medals":["Relâmpago"]},
                      "sessions":{},"week":"2024-03-04"}"#;
        let store = MemoryStore::with_entry(STORAGE_KEY, old);
        let doc = ProgressDocument::load(&store, STORAGE_KEY, ProgressDocument::default());

        assert_eq!(doc.user.name, "Ana");
        assert_eq!(doc.user.coins, 5);
        assert!(doc.user.unlocked_skills.is_empty());
        assert!(!doc.user.settings.large_font);
        assert_eq!(doc.week, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn corrupt_blob_yields_defaults() {
        let store = MemoryStore::with_entry(STORAGE_KEY, "{not json");
        let doc = ProgressDocument::load(&store, STORAGE_KEY, ProgressDocument::for_player("Bia"));
        assert_eq!(doc.user, UserProfile::new("Bia"));
        assert!(doc.sessions.is_empty());

        let store = MemoryStore::with_entry(STORAGE_KEY, r#"{"user":{"coins":"lots"}}"#);
        let doc = ProgressDocument::load(&store, STORAGE_KEY, ProgressDocument::default());
        assert_eq!(doc.user.coins, 0);
    }

    #[test]
    fn save_then_load_keeps_written_values() {
        let mut store = MemoryStore::new();
        let mut doc = ProgressDocument::default();
        doc.user.coins = 12;
        doc.user.unlocked_skills.push("olho_clinico".into());
        doc.save(&mut store, STORAGE_KEY).unwrap();

        let loaded = ProgressDocument::load(&store, STORAGE_KEY, ProgressDocument::default());
        assert_eq!(loaded, doc);
    }

    #[test]
    fn broken_session_costs_only_that_case() {
        let stored = r#"{"user":{"name":"Ana","coins":42,"medals":["Relâmpago"]},
            "sessions":{
                "c-001":{"caseId":"c-001","start":1700000000000,"status":"open",
                         "clues":["k1"],"errors":null,"hints":2,"timeSpent":null},
                "c-002":{"caseId":"c-002","status":"lost"},
                "c-003":null
            },
            "week":"2024-03-04"}"#;
        let store = MemoryStore::with_entry(STORAGE_KEY, stored);
        let doc = ProgressDocument::load(&store, STORAGE_KEY, ProgressDocument::default());

        assert_eq!(doc.user.name, "Ana");
        assert_eq!(doc.user.coins, 42);
        assert_eq!(doc.user.medals, vec!["Relâmpago".to_string()]);

        assert_eq!(doc.sessions.len(), 1);
        let session = &doc.sessions["c-001"];
        assert_eq!(session.clues, vec!["k1".to_string()]);
        assert_eq!(session.errors, 0);
        assert_eq!(session.hints, 2);
        assert_eq!(session.start.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn session_missing_its_case_id_takes_the_key() {
        let stored = r#"{"sessions":{"c-004":{"clues":["p1"]}}}"#;
        let store = MemoryStore::with_entry(STORAGE_KEY, stored);
        let doc = ProgressDocument::load(&store, STORAGE_KEY, ProgressDocument::default());
        assert_eq!(doc.sessions["c-004"].case_id, "c-004");
        assert_eq!(doc.sessions["c-004"].clues, vec!["p1".to_string()]);
    }

    #[test]
    fn nested_nulls_in_new_keys_read_as_absent() {
        let mut base = json!({"sessions": {}});
        let board = json!({"foundDifferences": null, "totalDifferences": 3});
        merge_json(
            &mut base,
            json!({"sessions": {"c-007": {"differenceGameStates": {"diff_quadro": board}}}}),
        );
        assert_eq!(
            base["sessions"]["c-007"]["differenceGameStates"]["diff_quadro"],
            json!({"totalDifferences": 3})
        );
    }
}
