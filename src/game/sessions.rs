//! The session store
//!
//! Holds the progress document in memory and writes it through to the
//! key-value store after every mutation.

use crate::data::{Session, SessionPatch, UserProfile};
use crate::store::{KeyValueStore, ProgressDocument, StoreError};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub struct SessionStore {
    store: Box<dyn KeyValueStore>,
    key: String,
    player_name: String,
    doc: ProgressDocument,
}

impl SessionStore {
    /// Load the document under `key`, falling back to a fresh one
    pub fn open(store: Box<dyn KeyValueStore>, key: &str, player_name: &str) -> Self {
        let defaults = ProgressDocument::for_player(player_name);
        let doc = ProgressDocument::load(store.as_ref(), key, defaults);
        Self {
            store,
            key: key.to_string(),
            player_name: player_name.to_string(),
            doc,
        }
    }

    pub fn document(&self) -> &ProgressDocument {
        &self.doc
    }

    pub fn profile(&self) -> &UserProfile {
        &self.doc.user
    }

    pub fn session(&self, case_id: &str) -> Option<&Session> {
        self.doc.sessions.get(case_id)
    }

    /// The case's session, created and persisted on first use
    pub fn ensure_session(
        &mut self,
        case_id: &str,
        now: DateTime<Utc>,
    ) -> Result<&Session, StoreError> {
        if !self.doc.sessions.contains_key(case_id) {
            let session = Session::new(case_id, now);
            info!(case = case_id, session = %session.session_id, "session created");
            self.doc.sessions.insert(case_id.to_string(), session);
            self.persist()?;
        }
        Ok(&self.doc.sessions[case_id])
    }

    /// Shallow-merge `patch` into the session, creating it if absent
    pub fn update_session(
        &mut self,
        case_id: &str,
        patch: SessionPatch,
        now: DateTime<Utc>,
    ) -> Result<&Session, StoreError> {
        self.with_session(case_id, now, |session| patch.apply(session))?;
        Ok(&self.doc.sessions[case_id])
    }

    /// Mutate the session in place, then persist
    pub fn with_session<R>(
        &mut self,
        case_id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, StoreError> {
        let session = self
            .doc
            .sessions
            .entry(case_id.to_string())
            .or_insert_with(|| Session::new(case_id, now));
        let out = f(session);
        self.persist()?;
        Ok(out)
    }

    /// Overwrite the case's session with a fresh one
    pub fn restart_session(
        &mut self,
        case_id: &str,
        now: DateTime<Utc>,
    ) -> Result<&Session, StoreError> {
        let session = Session::new(case_id, now);
        info!(case = case_id, session = %session.session_id, "session restarted");
        self.doc.sessions.insert(case_id.to_string(), session);
        self.persist()?;
        Ok(&self.doc.sessions[case_id])
    }

    pub fn update_profile<R>(
        &mut self,
        f: impl FnOnce(&mut UserProfile) -> R,
    ) -> Result<R, StoreError> {
        let out = f(&mut self.doc.user);
        self.persist()?;
        Ok(out)
    }

    /// Mutate session and profile together, with a single persist
    pub fn update_both<R>(
        &mut self,
        case_id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session, &mut UserProfile) -> R,
    ) -> Result<R, StoreError> {
        let ProgressDocument { user, sessions, .. } = &mut self.doc;
        let session = sessions
            .entry(case_id.to_string())
            .or_insert_with(|| Session::new(case_id, now));
        let out = f(session, user);
        self.persist()?;
        Ok(out)
    }

    /// Replace everything with a fresh document
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.doc = ProgressDocument::for_player(&self.player_name);
        info!("progress reset");
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.doc.save(self.store.as_mut(), &self.key)?;
        debug!(key = %self.key, "progress saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, STORAGE_KEY};

    fn reopen(store: &SessionStore) -> ProgressDocument {
        let raw = serde_json::to_string(store.document()).unwrap();
        let mem = MemoryStore::with_entry(STORAGE_KEY, &raw);
        ProgressDocument::load(&mem, STORAGE_KEY, ProgressDocument::default())
    }

    #[test]
    fn ensure_session_creates_once() {
        let mut store = SessionStore::open(Box::new(MemoryStore::new()), STORAGE_KEY, "Bia");
        let now = Utc::now();
        let id = store.ensure_session("c-001", now).unwrap().session_id;
        let again = store.ensure_session("c-001", now).unwrap().session_id;
        assert_eq!(id, again);
        assert_eq!(store.document().sessions.len(), 1);
    }

    #[test]
    fn update_session_merges_and_survives_reload() {
        let mut store = SessionStore::open(Box::new(MemoryStore::new()), STORAGE_KEY, "Bia");
        let now = Utc::now();
        store
            .update_session("c-002", SessionPatch::clues(vec!["k1".into()]), now)
            .unwrap();
        store.update_session("c-002", SessionPatch::errors(2), now).unwrap();

        let session = store.session("c-002").unwrap();
        assert_eq!(session.clues, vec!["k1".to_string()]);
        assert_eq!(session.errors, 2);

        let reloaded = reopen(&store);
        assert_eq!(reloaded.sessions["c-002"], *session);
    }

    #[test]
    fn reset_keeps_the_player_name() {
        let mut store = SessionStore::open(Box::new(MemoryStore::new()), STORAGE_KEY, "Ana");
        store.update_profile(|p| p.coins = 9).unwrap();
        store.ensure_session("c-001", Utc::now()).unwrap();
        store.reset().unwrap();
        assert_eq!(store.profile().name, "Ana");
        assert_eq!(store.profile().coins, 0);
        assert!(store.document().sessions.is_empty());
    }
}
