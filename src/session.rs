use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Cookie used to track a client's session across requests.
pub const SESSION_COOKIE: &str = "session_id";

/// Strongly typed session identifier backed by ULID.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct SessionId(pub ulid::Ulid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SessionId(ulid::Ulid::from_string(s)?))
    }
}

/// Cheap handle to one client's session state.
///
/// Attribute values are JSON so that any serializable type can be stored;
/// the map is behind an `RwLock` because a session may be touched by
/// concurrent requests from the same client.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    attrs: Arc<RwLock<HashMap<String, Value>>>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            attrs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Read an attribute; returns a clone of the stored value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.read().ok()?.get(name).cloned()
    }

    /// Store an attribute. Values that fail to serialize are stored as null.
    pub fn set(&self, name: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        if let Ok(mut attrs) = self.attrs.write() {
            attrs.insert(name.into(), value);
        }
    }

    pub fn remove(&self, name: &str) {
        if let Ok(mut attrs) = self.attrs.write() {
            attrs.remove(name);
        }
    }
}

/// In-memory session store shared by all requests.
///
/// Sessions are created lazily on first access and looked up by the
/// `session_id` cookie on later requests.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lookup(&self, id: SessionId) -> Option<Session> {
        self.inner.read().ok()?.get(&id).cloned()
    }

    /// Create a fresh session and register it in the store.
    #[must_use]
    pub fn create(&self) -> Session {
        let session = Session::new(SessionId::new());
        if let Ok(mut sessions) = self.inner.write() {
            sessions.insert(session.id(), session.clone());
        }
        debug!(session_id = %session.id(), "session created");
        session
    }

    /// Drop a session and all of its attributes.
    pub fn invalidate(&self, id: SessionId) {
        if let Ok(mut sessions) = self.inner.write() {
            sessions.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_roundtrip() {
        let store = SessionStore::new();
        let session = store.create();
        session.set("user", json!({"name": "Bob"}));
        assert_eq!(session.get("user"), Some(json!({"name": "Bob"})));
        session.remove("user");
        assert_eq!(session.get("user"), None);
    }

    #[test]
    fn test_lookup_after_create() {
        let store = SessionStore::new();
        let session = store.create();
        let found = store.lookup(session.id()).expect("session registered");
        found.set("n", 1);
        assert_eq!(session.get("n"), Some(json!(1)));
    }

    #[test]
    fn test_invalidate_removes_session() {
        let store = SessionStore::new();
        let session = store.create();
        store.invalidate(session.id());
        assert!(store.lookup(session.id()).is_none());
    }

    #[test]
    fn test_session_id_parses_own_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().expect("valid ulid");
        assert_eq!(parsed, id);
    }
}
