use crate::session::{Session, SessionId, SessionStore};
use std::collections::HashMap;

/// Per-request view of the transport boundary.
///
/// The exchange is everything the dispatch core is allowed to touch: query
/// parameters, the request body, session state, and a buffered response.
/// The server layer builds one per request and writes the buffer out after
/// dispatch; tests construct one directly.
pub struct Exchange {
    query_params: HashMap<String, String>,
    body: Option<String>,
    session_store: SessionStore,
    inbound_session: Option<SessionId>,
    session: Option<Session>,
    session_created: bool,
    status: u16,
    content_type: String,
    body_out: Vec<u8>,
    redirect: Option<String>,
}

impl Exchange {
    #[must_use]
    pub fn new(session_store: SessionStore) -> Self {
        Self {
            query_params: HashMap::new(),
            body: None,
            session_store,
            inbound_session: None,
            session: None,
            session_created: false,
            status: 200,
            content_type: "text/html; charset=utf-8".to_string(),
            body_out: Vec::new(),
            redirect: None,
        }
    }

    #[must_use]
    pub fn with_query_params(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = params;
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Session id presented by the client's cookie, if any.
    #[must_use]
    pub fn with_session_id(mut self, id: SessionId) -> Self {
        self.inbound_session = Some(id);
        self
    }

    // --- request side -----------------------------------------------------

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Raw request body, read at most once by the POST binder.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The client's session, created lazily if absent.
    ///
    /// A cookie id that no longer resolves (expired store, restart) is
    /// treated the same as no cookie at all.
    pub fn session(&mut self) -> Session {
        if let Some(session) = &self.session {
            return session.clone();
        }
        let existing = self
            .inbound_session
            .and_then(|id| self.session_store.lookup(id));
        let session = match existing {
            Some(s) => s,
            None => {
                self.session_created = true;
                self.session_store.create()
            }
        };
        self.session = Some(session.clone());
        session
    }

    /// The session already bound to this request, without creating one.
    #[must_use]
    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    // --- response side ----------------------------------------------------

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    pub fn write(&mut self, text: &str) {
        self.body_out.extend_from_slice(text.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.body_out.extend_from_slice(bytes);
    }

    /// Queue a redirect; the transport sends a 302 with this target.
    pub fn send_redirect(&mut self, target: impl Into<String>) {
        self.status = 302;
        self.redirect = Some(target.into());
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn body_out(&self) -> &[u8] {
        &self.body_out
    }

    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Session id to hand back to the client in a `Set-Cookie`, present only
    /// when this request created the session.
    #[must_use]
    pub fn new_session_cookie(&self) -> Option<SessionId> {
        if self.session_created {
            self.session.as_ref().map(Session::id)
        } else {
            None
        }
    }
}
