use crate::error::RenderError;
use crate::view::ModelAndView;
use minijinja::Environment;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Narrow render contract between the dispatcher and the template engine.
///
/// Output is UTF-8 `text/html`; auto-escaping of interpolated values is the
/// collaborator's responsibility, the core never escapes.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, mv: &ModelAndView) -> Result<String, RenderError>;
}

/// MiniJinja renderer rooted at a template directory.
///
/// View ids map directly to files under the root (`/hello.html` →
/// `<root>/hello.html`). Sources are loaded from disk per render, so edits
/// show up without a restart. `.html` template names get MiniJinja's HTML
/// auto-escaping.
pub struct TemplateRenderer {
    root: PathBuf,
}

impl TemplateRenderer {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn template_path(&self, view: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for comp in Path::new(view.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => path.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(path)
    }
}

impl ViewRenderer for TemplateRenderer {
    fn render(&self, mv: &ModelAndView) -> Result<String, RenderError> {
        let view = mv.view();
        let path = self.template_path(view).ok_or_else(|| RenderError::InvalidView {
            view: view.to_string(),
        })?;
        if !path.is_file() {
            return Err(RenderError::NotFound {
                view: view.to_string(),
            });
        }
        let source = fs::read_to_string(&path).map_err(|e| RenderError::Io {
            view: view.to_string(),
            source: e,
        })?;

        let mut env = Environment::new();
        // Register under the view id so the .html suffix selects HTML
        // auto-escaping.
        env.add_template(view, &source)
            .map_err(|e| RenderError::Engine {
                view: view.to_string(),
                source: e,
            })?;
        let template = env.get_template(view).map_err(|e| RenderError::Engine {
            view: view.to_string(),
            source: e,
        })?;
        let rendered = template.render(mv.model()).map_err(|e| RenderError::Engine {
            view: view.to_string(),
            source: e,
        })?;
        debug!(view = %view, bytes = rendered.len(), "view rendered");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_path_prevents_traversal() {
        let renderer = TemplateRenderer::new("templates");
        assert!(renderer.template_path("../Cargo.toml").is_none());
        assert!(renderer.template_path("/../../etc/passwd").is_none());
        assert!(renderer.template_path("/hello.html").is_some());
    }
}
