use crate::context::Exchange;
use crate::error::{ArgError, BindError, DecodeError};
use crate::registry::{ParamKind, ParamSpec};
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One bound argument. Context slots are markers; the live objects are
/// reached through the [`Exchange`] (the session additionally travels here
/// so handlers can take it positionally).
#[derive(Debug, Clone)]
pub enum BoundValue {
    Int(i32),
    Long(i64),
    Bool(bool),
    Str(String),
    Request,
    Response,
    Session(Session),
    Payload(Value),
}

/// Ordered argument list produced by a binder, one slot per declared
/// parameter, with typed positional accessors.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<BoundValue>,
}

impl Args {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn int(&self, index: usize) -> Result<i32, ArgError> {
        match self.values.get(index) {
            Some(BoundValue::Int(v)) => Ok(*v),
            _ => Err(ArgError {
                index,
                expected: "32-bit integer",
            }),
        }
    }

    pub fn long(&self, index: usize) -> Result<i64, ArgError> {
        match self.values.get(index) {
            Some(BoundValue::Long(v)) => Ok(*v),
            _ => Err(ArgError {
                index,
                expected: "64-bit integer",
            }),
        }
    }

    pub fn boolean(&self, index: usize) -> Result<bool, ArgError> {
        match self.values.get(index) {
            Some(BoundValue::Bool(v)) => Ok(*v),
            _ => Err(ArgError {
                index,
                expected: "boolean",
            }),
        }
    }

    pub fn str(&self, index: usize) -> Result<&str, ArgError> {
        match self.values.get(index) {
            Some(BoundValue::Str(v)) => Ok(v),
            _ => Err(ArgError {
                index,
                expected: "string",
            }),
        }
    }

    pub fn session(&self, index: usize) -> Result<Session, ArgError> {
        match self.values.get(index) {
            Some(BoundValue::Session(s)) => Ok(s.clone()),
            _ => Err(ArgError {
                index,
                expected: "session",
            }),
        }
    }

    /// The decoded payload slot as raw JSON, wherever it was declared.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.values.iter().find_map(|v| match v {
            BoundValue::Payload(value) => Some(value),
            _ => None,
        })
    }

    /// Shape the payload into its declared type.
    ///
    /// Unrecognized input fields are ignored (forward-compatible decode);
    /// a body that cannot be shaped into `T` at all fails with a
    /// [`DecodeError`].
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let value = self.payload().ok_or(DecodeError::NoPayloadDeclared)?;
        serde_json::from_value(value.clone()).map_err(DecodeError::Shape)
    }

    fn push(&mut self, value: BoundValue) {
        self.values.push(value);
    }
}

/// Bind a GET route's declared parameters from the query string.
///
/// Missing scalars take the original defaults: `"0"` for the numeric
/// kinds, `"false"` for booleans, `""` for strings. No trimming, no
/// multi-value support. A malformed numeric string is client input, not a
/// framework bug.
pub fn bind_get(params: &[ParamSpec], ex: &mut Exchange) -> Result<Args, BindError> {
    let mut args = Args::empty();
    for spec in params {
        let value = match spec.kind {
            ParamKind::Request => BoundValue::Request,
            ParamKind::Response => BoundValue::Response,
            ParamKind::Session => BoundValue::Session(ex.session()),
            ParamKind::Int => {
                let raw = ex.query_param(&spec.name).unwrap_or("0");
                BoundValue::Int(raw.parse().map_err(|_| BindError::MalformedNumber {
                    name: spec.name.clone(),
                    value: raw.to_string(),
                })?)
            }
            ParamKind::Long => {
                let raw = ex.query_param(&spec.name).unwrap_or("0");
                BoundValue::Long(raw.parse().map_err(|_| BindError::MalformedNumber {
                    name: spec.name.clone(),
                    value: raw.to_string(),
                })?)
            }
            ParamKind::Bool => {
                let raw = ex.query_param(&spec.name).unwrap_or("false");
                BoundValue::Bool(raw.eq_ignore_ascii_case("true"))
            }
            ParamKind::Str => {
                BoundValue::Str(ex.query_param(&spec.name).unwrap_or("").to_string())
            }
            // Rejected at registration for GET routes.
            ParamKind::Payload => unreachable!("payload parameter on a GET route"),
        };
        args.push(value);
    }
    Ok(args)
}

/// Bind a POST route's declared parameters.
///
/// Context slots resolve as for GET; the single payload slot is filled by
/// parsing the request body as JSON exactly once. The body is never read
/// twice: registration guarantees at most one payload descriptor.
pub fn bind_post(params: &[ParamSpec], ex: &mut Exchange) -> Result<Args, DecodeError> {
    let mut args = Args::empty();
    for spec in params {
        let value = match spec.kind {
            ParamKind::Request => BoundValue::Request,
            ParamKind::Response => BoundValue::Response,
            ParamKind::Session => BoundValue::Session(ex.session()),
            ParamKind::Payload => {
                let body = ex.body().ok_or(DecodeError::MissingBody)?;
                BoundValue::Payload(serde_json::from_str(body).map_err(DecodeError::Malformed)?)
            }
            // Rejected at registration for POST routes.
            _ => unreachable!("scalar parameter on a POST route"),
        };
        args.push(value);
    }
    Ok(args)
}
