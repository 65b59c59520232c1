use crate::binder::Args;
use crate::context::Exchange;
use crate::registry::{HandlerRegistry, Route};
use crate::view::ModelAndView;
use serde_json::Value;
use std::sync::Arc;

/// Home page and greeting handlers.
#[derive(Default)]
pub struct IndexController;

impl IndexController {
    /// `GET /` - the home page, with the signed-in user if any.
    pub fn index(&self, _ex: &mut Exchange, args: &Args) -> anyhow::Result<Option<ModelAndView>> {
        let session = args.session(0)?;
        let user = session.get("user").unwrap_or(Value::Null);
        Ok(Some(ModelAndView::with("/index.html", "user", user)))
    }

    /// `GET /hello` - greets the `name` query parameter, defaulting to
    /// "World" when the binder supplied the empty string.
    pub fn hello(&self, _ex: &mut Exchange, args: &Args) -> anyhow::Result<Option<ModelAndView>> {
        let name = args.str(0)?;
        let name = if name.is_empty() { "World" } else { name };
        Ok(Some(ModelAndView::with("/hello.html", "name", name)))
    }
}

pub fn register(registry: &mut HandlerRegistry) {
    let controller = Arc::new(IndexController);
    registry.add(Route::get("/").session_param().handler({
        let c = controller.clone();
        move |ex, args| c.index(ex, args)
    }));
    registry.add(Route::get("/hello").str_param("name").handler({
        let c = controller;
        move |ex, args| c.hello(ex, args)
    }));
}
