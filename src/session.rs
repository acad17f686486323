//! Signed-in session state and its on-disk key-value store.
//!
//! The backend hands out bearer tokens; the client keeps exactly two pieces
//! of local state, the token and a snapshot of the signed-in user. Both live
//! in a single sqlite table so the session survives restarts. Logout wipes
//! them. Nothing else is persisted client-side.

use crate::error::StoreError;
use crate::models::SessionUser;
use rusqlite::{params, Connection, OptionalExtension};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(())
    }

    /// Removes the persisted session outright. Used on logout when the
    /// in-memory [`Session`] lives elsewhere.
    pub fn wipe(&self) -> Result<(), StoreError> {
        self.delete(TOKEN_KEY)?;
        self.delete(USER_KEY)?;
        Ok(())
    }
}

/// The session context handed to components that need auth state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
}

impl Session {
    /// Hydrates from the store. An absent token means a signed-out session,
    /// which is valid; a token whose user snapshot fails to parse is
    /// reported as corrupt rather than silently half-loaded.
    pub fn load(store: &SessionStore) -> Result<Self, StoreError> {
        let token = store.get(TOKEN_KEY)?;
        let user = match store.get(USER_KEY)? {
            Some(json) => Some(
                serde_json::from_str(&json)
                    .map_err(|e| StoreError::Corrupt(format!("user record: {}", e)))?,
            ),
            None => None,
        };
        Ok(Self { token, user })
    }

    pub fn save(&self, store: &SessionStore) -> Result<(), StoreError> {
        match &self.token {
            Some(token) => store.set(TOKEN_KEY, token)?,
            None => store.delete(TOKEN_KEY)?,
        }
        match &self.user {
            Some(user) => {
                let json = serde_json::to_string(user)
                    .map_err(|e| StoreError::Corrupt(format!("user record: {}", e)))?;
                store.set(USER_KEY, &json)?;
            }
            None => store.delete(USER_KEY)?,
        }
        Ok(())
    }

    /// Logout: drop both fields here and in the store.
    pub fn clear(&mut self, store: &SessionStore) -> Result<(), StoreError> {
        self.token = None;
        self.user = None;
        store.delete(TOKEN_KEY)?;
        store.delete(USER_KEY)?;
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser {
            id: "u-1".to_string(),
            name: "Asha".to_string(),
            role: "customer".to_string(),
        }
    }

    #[test]
    fn fresh_store_yields_signed_out_session() {
        let store = SessionStore::open_in_memory().unwrap();
        let session = Session::load(&store).unwrap();
        assert!(!session.is_signed_in());
        assert!(session.user.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = SessionStore::open_in_memory().unwrap();
        let session = Session {
            token: Some("tok-123".to_string()),
            user: Some(user()),
        };
        session.save(&store).unwrap();

        let loaded = Session::load(&store).unwrap();
        assert_eq!(loaded.token.as_deref(), Some("tok-123"));
        assert_eq!(loaded.user.unwrap().name, "Asha");
    }

    #[test]
    fn clear_wipes_store() {
        let store = SessionStore::open_in_memory().unwrap();
        let mut session = Session {
            token: Some("tok-123".to_string()),
            user: Some(user()),
        };
        session.save(&store).unwrap();
        session.clear(&store).unwrap();

        let loaded = Session::load(&store).unwrap();
        assert!(!loaded.is_signed_in());
        assert!(loaded.user.is_none());
    }
}
