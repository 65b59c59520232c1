use crate::binder::{bind_get, bind_post, Args};
use crate::context::Exchange;
use crate::error::{DecodeError, DispatchError};
use crate::registry::RouteTable;
use crate::render::ViewRenderer;
use crate::view::{ModelAndView, REDIRECT_PREFIX};
use http::Method;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of dispatching one request.
///
/// Modeled as an explicit tagged variant rather than a nullable view
/// string: `HandledDirectly` means the handler finalized the response
/// itself and no further processing happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No route for (verb, path); the boundary reports 404.
    NotFound,
    /// The handler asked for a redirect to this target.
    Redirect(String),
    /// A view was rendered into the response.
    Rendered,
    /// The handler wrote the response itself.
    HandledDirectly,
}

/// Per-request pipeline: path lookup → argument binding → invocation →
/// result interpretation.
///
/// Holds the immutable route table and the render collaborator; safe to
/// share across concurrent requests without locking.
pub struct Dispatcher {
    table: RouteTable,
    renderer: Arc<dyn ViewRenderer>,
    mount_prefix: String,
}

impl Dispatcher {
    #[must_use]
    pub fn new(table: RouteTable, renderer: Arc<dyn ViewRenderer>) -> Self {
        Self {
            table,
            renderer,
            mount_prefix: String::new(),
        }
    }

    /// Prefix the application is mounted under; inbound paths are
    /// normalized against it before lookup.
    #[must_use]
    pub fn with_mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mount_prefix = prefix.into();
        self
    }

    /// Dispatch one request. All failures are terminal for the request and
    /// reported once; nothing here retries or mutates the route table.
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        ex: &mut Exchange,
    ) -> Result<Outcome, DispatchError> {
        let start = Instant::now();
        let path = match self.normalize(path) {
            Some(p) => p,
            None => {
                debug!(%method, path, prefix = %self.mount_prefix, "path outside mount prefix");
                return Ok(Outcome::NotFound);
            }
        };

        let entry = match self.table.route(method, path) {
            Some(entry) => entry,
            None => {
                debug!(%method, path, "no route");
                return Ok(Outcome::NotFound);
            }
        };

        let args = self.bind(method, entry.params(), ex)?;

        let result = entry.invoke(ex, &args).map_err(|err| {
            // A payload the handler could not shape is still client input;
            // keep its 400 severity instead of reporting a handler failure.
            match err.downcast::<DecodeError>() {
                Ok(decode) => DispatchError::Decode(decode),
                Err(other) => DispatchError::Handler(other),
            }
        })?;

        let outcome = self.interpret(result, ex)?;
        info!(
            %method,
            path,
            outcome = ?outcome,
            latency_ms = start.elapsed().as_millis() as u64,
            "request dispatched"
        );
        Ok(outcome)
    }

    fn normalize<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.mount_prefix.is_empty() {
            return Some(path);
        }
        path.strip_prefix(&self.mount_prefix)
    }

    fn bind(
        &self,
        method: &Method,
        params: &[crate::registry::ParamSpec],
        ex: &mut Exchange,
    ) -> Result<Args, DispatchError> {
        match *method {
            Method::GET => Ok(bind_get(params, ex)?),
            Method::POST => Ok(bind_post(params, ex)?),
            // The route table never resolves other verbs.
            _ => Ok(Args::empty()),
        }
    }

    fn interpret(
        &self,
        result: Option<ModelAndView>,
        ex: &mut Exchange,
    ) -> Result<Outcome, DispatchError> {
        let mv = match result {
            // Handler already finalized the response.
            None => return Ok(Outcome::HandledDirectly),
            Some(mv) => mv,
        };
        if let Some(target) = mv.view().strip_prefix(REDIRECT_PREFIX) {
            ex.send_redirect(target);
            return Ok(Outcome::Redirect(target.to_string()));
        }
        let rendered = self.renderer.render(&mv).map_err(|e| {
            warn!(view = %mv.view(), error = %e, "render failed");
            e
        })?;
        ex.set_content_type("text/html; charset=utf-8");
        ex.write(&rendered);
        Ok(Outcome::Rendered)
    }
}
