use crate::registry::ParamKind;
use http::Method;
use std::fmt;

/// Structural error raised while the route table is being built.
///
/// These are programming errors in the route declarations, so they abort
/// startup; none of them can occur while a request is being served.
#[derive(Debug)]
pub enum RegistryError {
    /// A parameter kind outside the supported set for the route's verb.
    UnsupportedParam {
        method: Method,
        path: String,
        name: String,
        kind: ParamKind,
    },
    /// More than one structured-payload parameter on a POST route.
    DuplicatePayload { method: Method, path: String },
    /// Two routes registered for the same (verb, path) pair.
    DuplicateRoute { method: Method, path: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnsupportedParam {
                method,
                path,
                name,
                kind,
            } => {
                write!(
                    f,
                    "unsupported parameter kind {kind:?} for '{name}' on route {method} {path}"
                )
            }
            RegistryError::DuplicatePayload { method, path } => {
                write!(
                    f,
                    "duplicate structured-payload parameter on route {method} {path}"
                )
            }
            RegistryError::DuplicateRoute { method, path } => {
                write!(f, "route {method} {path} registered twice")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Client-input error raised while binding GET query parameters.
#[derive(Debug)]
pub enum BindError {
    /// A numeric query parameter that does not parse as the declared type.
    MalformedNumber { name: String, value: String },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::MalformedNumber { name, value } => {
                write!(f, "query parameter '{name}' is not a number: '{value}'")
            }
        }
    }
}

impl std::error::Error for BindError {}

/// Client-input error raised while decoding a structured request body.
#[derive(Debug)]
pub enum DecodeError {
    /// The route declared a payload but the request carried no body.
    MissingBody,
    /// The body is not well-formed JSON.
    Malformed(serde_json::Error),
    /// The body parsed but cannot be shaped into the declared payload type.
    Shape(serde_json::Error),
    /// The handler asked for a payload the route never declared.
    NoPayloadDeclared,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingBody => write!(f, "request body required but absent"),
            DecodeError::Malformed(e) => write!(f, "malformed request body: {e}"),
            DecodeError::Shape(e) => write!(f, "request body does not match payload type: {e}"),
            DecodeError::NoPayloadDeclared => {
                write!(f, "route declares no structured-payload parameter")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Malformed(e) | DecodeError::Shape(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure while rendering a view through the template engine.
#[derive(Debug)]
pub enum RenderError {
    /// The view id escapes the template root or is otherwise not a plain path.
    InvalidView { view: String },
    /// No template source exists for the view id.
    NotFound { view: String },
    /// The template source could not be read.
    Io {
        view: String,
        source: std::io::Error,
    },
    /// The template engine rejected the source or the model.
    Engine {
        view: String,
        source: minijinja::Error,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidView { view } => write!(f, "invalid view id '{view}'"),
            RenderError::NotFound { view } => write!(f, "no template for view '{view}'"),
            RenderError::Io { view, source } => {
                write!(f, "failed to read template for view '{view}': {source}")
            }
            RenderError::Engine { view, source } => {
                write!(f, "failed to render view '{view}': {source}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io { source, .. } => Some(source),
            RenderError::Engine { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Typed-accessor mismatch on a bound argument list.
///
/// Raised when a handler reads an argument slot with the wrong accessor;
/// this is a handler bug, not client input.
#[derive(Debug)]
pub struct ArgError {
    pub index: usize,
    pub expected: &'static str,
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bound argument {} is not a {}", self.index, self.expected)
    }
}

impl std::error::Error for ArgError {}

/// Per-request failure surfaced by the dispatcher.
///
/// A routing miss is not an error; it is reported as
/// [`Outcome::NotFound`](crate::dispatcher::Outcome::NotFound).
#[derive(Debug)]
pub enum DispatchError {
    /// Client input failed GET binding.
    Bind(BindError),
    /// Client input failed payload decoding.
    Decode(DecodeError),
    /// The handler itself failed; the cause chain is preserved.
    Handler(anyhow::Error),
    /// The render collaborator failed.
    Render(RenderError),
}

impl DispatchError {
    /// HTTP status the transport boundary should report for this failure.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            DispatchError::Bind(_) | DispatchError::Decode(_) => 400,
            DispatchError::Handler(_) | DispatchError::Render(_) => 500,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Bind(e) => write!(f, "binding failed: {e}"),
            DispatchError::Decode(e) => write!(f, "decode failed: {e}"),
            DispatchError::Handler(e) => write!(f, "handler failed: {e:#}"),
            DispatchError::Render(e) => write!(f, "render failed: {e}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Bind(e) => Some(e),
            DispatchError::Decode(e) => Some(e),
            DispatchError::Handler(e) => Some(e.as_ref()),
            DispatchError::Render(e) => Some(e),
        }
    }
}

impl From<BindError> for DispatchError {
    fn from(e: BindError) -> Self {
        DispatchError::Bind(e)
    }
}

impl From<DecodeError> for DispatchError {
    fn from(e: DecodeError) -> Self {
        DispatchError::Decode(e)
    }
}

impl From<RenderError> for DispatchError {
    fn from(e: RenderError) -> Self {
        DispatchError::Render(e)
    }
}
