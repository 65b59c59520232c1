//! Tests for the request pipeline: lookup, binding, invocation, and
//! outcome interpretation.

use http::Method;
use minimvc::context::Exchange;
use minimvc::dispatcher::{Dispatcher, Outcome};
use minimvc::error::{DispatchError, RenderError};
use minimvc::registry::{HandlerRegistry, Route};
use minimvc::render::ViewRenderer;
use minimvc::session::SessionStore;
use minimvc::view::ModelAndView;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

/// Render collaborator test double that records every view it is handed.
#[derive(Default)]
struct RecordingRenderer {
    rendered: Mutex<Vec<ModelAndView>>,
}

impl RecordingRenderer {
    fn rendered(&self) -> Vec<ModelAndView> {
        self.rendered.lock().unwrap().clone()
    }
}

impl ViewRenderer for RecordingRenderer {
    fn render(&self, mv: &ModelAndView) -> Result<String, RenderError> {
        self.rendered.lock().unwrap().push(mv.clone());
        Ok(format!("<rendered {}>", mv.view()))
    }
}

fn build(registry: HandlerRegistry) -> (Dispatcher, Arc<RecordingRenderer>) {
    let renderer = Arc::new(RecordingRenderer::default());
    let table = registry.install().expect("valid routes");
    (Dispatcher::new(table, renderer.clone()), renderer)
}

fn exchange() -> Exchange {
    Exchange::new(SessionStore::new())
}

#[test]
fn test_null_result_is_handled_directly() {
    let mut registry = HandlerRegistry::new();
    registry.add(Route::get("/direct").handler(|ex, _args| {
        ex.set_content_type("application/json");
        ex.write(r#"{"result":true}"#);
        Ok(None)
    }));
    let (dispatcher, renderer) = build(registry);

    let mut ex = exchange();
    let outcome = dispatcher.dispatch(&Method::GET, "/direct", &mut ex).unwrap();
    assert_eq!(outcome, Outcome::HandledDirectly);
    assert!(renderer.rendered().is_empty(), "no render side effect");
    assert!(ex.redirect_target().is_none(), "no redirect side effect");
    assert_eq!(ex.body_out(), br#"{"result":true}"#);
}

#[test]
fn test_redirect_prefixed_view_produces_redirect() {
    let mut registry = HandlerRegistry::new();
    registry.add(
        Route::get("/away").handler(|_ex, _args| Ok(Some(ModelAndView::new("redirect:/home")))),
    );
    let (dispatcher, renderer) = build(registry);

    let mut ex = exchange();
    let outcome = dispatcher.dispatch(&Method::GET, "/away", &mut ex).unwrap();
    assert_eq!(outcome, Outcome::Redirect("/home".to_string()));
    assert_eq!(ex.redirect_target(), Some("/home"));
    assert_eq!(ex.status(), 302);
    assert!(renderer.rendered().is_empty(), "redirects are not rendered");
}

#[test]
fn test_view_result_is_rendered() {
    let mut registry = HandlerRegistry::new();
    registry.add(Route::get("/page").handler(|_ex, _args| {
        Ok(Some(ModelAndView::with("/page.html", "n", 7)))
    }));
    let (dispatcher, renderer) = build(registry);

    let mut ex = exchange();
    let outcome = dispatcher.dispatch(&Method::GET, "/page", &mut ex).unwrap();
    assert_eq!(outcome, Outcome::Rendered);
    let rendered = renderer.rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].view(), "/page.html");
    assert_eq!(ex.body_out(), b"<rendered /page.html>");
    assert!(ex.content_type().starts_with("text/html"));
}

#[test]
fn test_unknown_route_is_not_found() {
    let mut registry = HandlerRegistry::new();
    registry.add(Route::get("/known").handler(|_ex, _args| Ok(None)));
    let (dispatcher, _) = build(registry);

    let mut ex = exchange();
    let outcome = dispatcher.dispatch(&Method::GET, "/unknown", &mut ex).unwrap();
    assert_eq!(outcome, Outcome::NotFound);
    // Verb mismatch on a known path is a plain not-found.
    let outcome = dispatcher.dispatch(&Method::POST, "/known", &mut ex).unwrap();
    assert_eq!(outcome, Outcome::NotFound);
}

#[test]
fn test_mount_prefix_is_stripped_before_lookup() {
    let mut registry = HandlerRegistry::new();
    registry.add(Route::get("/hello").handler(|_ex, _args| {
        Ok(Some(ModelAndView::new("/hello.html")))
    }));
    let renderer = Arc::new(RecordingRenderer::default());
    let dispatcher = Dispatcher::new(registry.install().unwrap(), renderer)
        .with_mount_prefix("/app");

    let mut ex = exchange();
    assert_eq!(
        dispatcher.dispatch(&Method::GET, "/app/hello", &mut ex).unwrap(),
        Outcome::Rendered
    );
    assert_eq!(
        dispatcher.dispatch(&Method::GET, "/other/hello", &mut ex).unwrap(),
        Outcome::NotFound
    );
}

#[test]
fn test_handler_failure_surfaces_as_framework_error() {
    let mut registry = HandlerRegistry::new();
    registry.add(Route::get("/boom").handler(|_ex, _args| Err(anyhow::anyhow!("boom"))));
    let (dispatcher, _) = build(registry);

    let mut ex = exchange();
    let err = dispatcher.dispatch(&Method::GET, "/boom", &mut ex).unwrap_err();
    match &err {
        DispatchError::Handler(cause) => assert_eq!(cause.to_string(), "boom"),
        other => panic!("expected Handler error, got {other:?}"),
    }
    assert_eq!(err.http_status(), 500);
}

#[test]
fn test_malformed_query_number_is_client_error() {
    let mut registry = HandlerRegistry::new();
    registry.add(Route::get("/n").int_param("n").handler(|_ex, _args| Ok(None)));
    let (dispatcher, _) = build(registry);

    let mut ex = exchange().with_query_param("n", "abc");
    let err = dispatcher.dispatch(&Method::GET, "/n", &mut ex).unwrap_err();
    assert!(matches!(err, DispatchError::Bind(_)));
    assert_eq!(err.http_status(), 400);
}

#[test]
fn test_payload_shape_failure_keeps_client_severity() {
    #[derive(Debug, Deserialize)]
    struct Strict {
        #[allow(dead_code)]
        required: String,
    }

    let mut registry = HandlerRegistry::new();
    registry.add(Route::post("/strict").payload_param().handler(|_ex, args| {
        let _strict: Strict = args.body()?;
        Ok(None)
    }));
    let (dispatcher, _) = build(registry);

    let mut ex = exchange().with_body(r#"{"something":"else"}"#);
    let err = dispatcher.dispatch(&Method::POST, "/strict", &mut ex).unwrap_err();
    assert!(
        matches!(err, DispatchError::Decode(_)),
        "decode failures inside the handler are still client input: {err:?}"
    );
    assert_eq!(err.http_status(), 400);
}

#[test]
fn test_malformed_body_is_client_error() {
    let mut registry = HandlerRegistry::new();
    registry.add(Route::post("/p").payload_param().handler(|_ex, _args| Ok(None)));
    let (dispatcher, _) = build(registry);

    let mut ex = exchange().with_body("{oops");
    let err = dispatcher.dispatch(&Method::POST, "/p", &mut ex).unwrap_err();
    assert!(matches!(err, DispatchError::Decode(_)));
    assert_eq!(err.http_status(), 400);
}

#[test]
fn test_render_failure_is_server_error() {
    struct FailingRenderer;
    impl ViewRenderer for FailingRenderer {
        fn render(&self, mv: &ModelAndView) -> Result<String, RenderError> {
            Err(RenderError::NotFound {
                view: mv.view().to_string(),
            })
        }
    }

    let mut registry = HandlerRegistry::new();
    registry.add(Route::get("/page").handler(|_ex, _args| {
        Ok(Some(ModelAndView::new("/page.html")))
    }));
    let dispatcher = Dispatcher::new(registry.install().unwrap(), Arc::new(FailingRenderer));

    let mut ex = exchange();
    let err = dispatcher.dispatch(&Method::GET, "/page", &mut ex).unwrap_err();
    assert!(matches!(err, DispatchError::Render(_)));
    assert_eq!(err.http_status(), 500);
}
