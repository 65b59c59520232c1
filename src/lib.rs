//! # minimvc
//!
//! A minimal MVC dispatch framework sitting directly on a raw HTTP
//! request/response abstraction, powered by the `may` coroutine runtime
//! and `may_minihttp`.
//!
//! The core is the dispatch engine: an immutable route table built from
//! explicit route declarations at startup, and a per-request pipeline of
//! path lookup, argument binding, handler invocation, and result
//! interpretation. A handler returns a [`view::ModelAndView`] to render,
//! a `redirect:`-prefixed view id to redirect, or `None` after writing
//! the response itself.
//!
//! ## Modules
//!
//! - [`registry`] - route declaration, signature validation, route table
//! - [`binder`] - GET query binding and POST payload binding
//! - [`dispatcher`] - the request pipeline and its [`dispatcher::Outcome`]
//! - [`view`] - the view descriptor handlers produce
//! - [`context`] - the per-request transport abstraction ([`context::Exchange`])
//! - [`session`] - in-memory, cookie-tracked sessions
//! - [`render`] - the render collaborator contract and a MiniJinja impl
//! - [`server`] - embedded HTTP bootstrap on `may_minihttp`
//! - [`controllers`], [`models`] - the bundled demo application
//!
//! ## Quick start
//!
//! ```no_run
//! use minimvc::registry::{HandlerRegistry, Route};
//! use minimvc::render::TemplateRenderer;
//! use minimvc::dispatcher::Dispatcher;
//! use minimvc::view::ModelAndView;
//! use std::sync::Arc;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.add(Route::get("/hello").str_param("name").handler(|_ex, args| {
//!     let name = args.str(0)?;
//!     Ok(Some(ModelAndView::with("/hello.html", "name", name)))
//! }));
//! let table = registry.install().expect("valid routes");
//! let dispatcher = Dispatcher::new(table, Arc::new(TemplateRenderer::new("templates")));
//! ```
//!
//! Route tables are read-only after [`registry::HandlerRegistry::install`];
//! handlers are shared across concurrent requests and must be stateless or
//! internally synchronized.

pub mod binder;
pub mod context;
pub mod controllers;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod registry;
pub mod render;
pub mod server;
pub mod session;
pub mod view;

pub use context::Exchange;
pub use dispatcher::{Dispatcher, Outcome};
pub use error::{BindError, DecodeError, DispatchError, RegistryError, RenderError};
pub use registry::{HandlerRegistry, ParamKind, Route, RouteTable};
pub use render::{TemplateRenderer, ViewRenderer};
pub use session::{Session, SessionStore};
pub use view::{ModelAndView, REDIRECT_PREFIX};
