use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// View-id prefix that turns a handler result into a redirect instead of a
/// rendered page, e.g. `redirect:/signin`.
pub const REDIRECT_PREFIX: &str = "redirect:";

/// Immutable pairing of a view id with the model data to render into it.
///
/// Produced by handlers and consumed by the dispatcher. A handler that has
/// already written its own response returns `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAndView {
    view: String,
    model: HashMap<String, Value>,
}

impl ModelAndView {
    /// A view with an empty model.
    #[must_use]
    pub fn new(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            model: HashMap::new(),
        }
    }

    /// A view carrying a single named model value.
    #[must_use]
    pub fn with(view: impl Into<String>, name: impl Into<String>, value: impl Serialize) -> Self {
        let mut model = HashMap::new();
        model.insert(
            name.into(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
        Self {
            view: view.into(),
            model,
        }
    }

    /// A view carrying a full model mapping.
    #[must_use]
    pub fn with_model(view: impl Into<String>, model: HashMap<String, Value>) -> Self {
        Self {
            view: view.into(),
            model,
        }
    }

    #[must_use]
    pub fn view(&self) -> &str {
        &self.view
    }

    #[must_use]
    pub fn model(&self) -> &HashMap<String, Value> {
        &self.model
    }

    /// The redirect target if the view id carries the redirect prefix.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        self.view.strip_prefix(REDIRECT_PREFIX)
    }
}
