use crate::binder::Args;
use crate::context::Exchange;
use crate::error::RegistryError;
use crate::view::ModelAndView;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Closed set of parameter kinds a handler may declare.
///
/// Rust cannot recover parameter names or types reflectively, so routes
/// declare an ordered descriptor list at registration time instead. The
/// per-verb subsets are enforced when the table is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Long,
    Bool,
    Str,
    /// The live request context (reached through the [`Exchange`]).
    Request,
    /// The live response context (reached through the [`Exchange`]).
    Response,
    /// The client session, created lazily if absent.
    Session,
    /// Structured request-body payload; POST only, at most one per route.
    Payload,
}

impl ParamKind {
    fn supported_for(self, method: &Method) -> bool {
        match *method {
            Method::GET => self != ParamKind::Payload,
            Method::POST => matches!(
                self,
                ParamKind::Request | ParamKind::Response | ParamKind::Session | ParamKind::Payload
            ),
            _ => false,
        }
    }
}

/// One declared handler parameter. The name is used only for GET query
/// lookup; context and payload slots carry fixed placeholder names.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
}

impl ParamSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Shared handler closure. One instance per route, invoked concurrently;
/// handlers must be stateless or synchronize internally.
pub type HandlerFn =
    Arc<dyn Fn(&mut Exchange, &Args) -> anyhow::Result<Option<ModelAndView>> + Send + Sync>;

/// A fully declared route: verb, exact path, descriptors, handler.
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: String,
    params: Vec<ParamSpec>,
    handler: HandlerFn,
}

impl Route {
    #[must_use]
    pub fn get(path: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(Method::GET, path.into())
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(Method::POST, path.into())
    }
}

/// Builder mirroring the original's method markers: the verb and path come
/// first, then the ordered parameter declarations, then the handler.
pub struct RouteBuilder {
    method: Method,
    path: String,
    params: Vec<ParamSpec>,
}

impl RouteBuilder {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(ParamSpec::new(name, kind));
        self
    }

    #[must_use]
    pub fn int_param(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Int)
    }

    #[must_use]
    pub fn long_param(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Long)
    }

    #[must_use]
    pub fn bool_param(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Bool)
    }

    #[must_use]
    pub fn str_param(self, name: impl Into<String>) -> Self {
        self.param(name, ParamKind::Str)
    }

    #[must_use]
    pub fn request_param(self) -> Self {
        self.param("request", ParamKind::Request)
    }

    #[must_use]
    pub fn response_param(self) -> Self {
        self.param("response", ParamKind::Response)
    }

    #[must_use]
    pub fn session_param(self) -> Self {
        self.param("session", ParamKind::Session)
    }

    #[must_use]
    pub fn payload_param(self) -> Self {
        self.param("payload", ParamKind::Payload)
    }

    pub fn handler<F>(self, f: F) -> Route
    where
        F: Fn(&mut Exchange, &Args) -> anyhow::Result<Option<ModelAndView>>
            + Send
            + Sync
            + 'static,
    {
        Route {
            method: self.method,
            path: self.path,
            params: self.params,
            handler: Arc::new(f),
        }
    }
}

/// One entry of the installed route table. Immutable after registration.
#[derive(Clone)]
pub struct RouteEntry {
    method: Method,
    path: String,
    params: Vec<ParamSpec>,
    handler: HandlerFn,
}

impl RouteEntry {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Invoke the bound handler with pre-bound arguments.
    pub fn invoke(
        &self,
        ex: &mut Exchange,
        args: &Args,
    ) -> anyhow::Result<Option<ModelAndView>> {
        (self.handler)(ex, args)
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Two independent path mappings, one per verb. Built once at startup and
/// read-only afterwards, so concurrent lookups need no coordination.
#[derive(Clone, Default, Debug)]
pub struct RouteTable {
    get_routes: HashMap<String, RouteEntry>,
    post_routes: HashMap<String, RouteEntry>,
}

impl RouteTable {
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
        match *method {
            Method::GET => self.get_routes.get(path),
            Method::POST => self.post_routes.get(path),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.get_routes.len() + self.post_routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects route declarations and installs them as an immutable
/// [`RouteTable`], failing fast on any structural error.
#[derive(Default)]
pub struct HandlerRegistry {
    routes: Vec<Route>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Validate every declaration and build the route table.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] naming the offending route on the first
    /// unsupported parameter kind, duplicate payload, or duplicate
    /// (verb, path) pair. Startup must not proceed past a failure here.
    pub fn install(self) -> Result<RouteTable, RegistryError> {
        let mut table = RouteTable::default();
        for route in self.routes {
            validate(&route)?;
            info!(
                method = %route.method,
                path = %route.path,
                params = route.params.len(),
                "route registered"
            );
            let entry = RouteEntry {
                method: route.method.clone(),
                path: route.path.clone(),
                params: route.params,
                handler: route.handler,
            };
            let map = match route.method {
                Method::GET => &mut table.get_routes,
                Method::POST => &mut table.post_routes,
                // Route construction only offers GET and POST.
                _ => unreachable!("route table holds only GET and POST"),
            };
            if map.insert(route.path.clone(), entry).is_some() {
                return Err(RegistryError::DuplicateRoute {
                    method: route.method,
                    path: route.path,
                });
            }
        }
        info!(routes = table.len(), "route table installed");
        Ok(table)
    }
}

fn validate(route: &Route) -> Result<(), RegistryError> {
    let mut payloads = 0usize;
    for param in &route.params {
        if !param.kind.supported_for(&route.method) {
            return Err(RegistryError::UnsupportedParam {
                method: route.method.clone(),
                path: route.path.clone(),
                name: param.name.clone(),
                kind: param.kind,
            });
        }
        if param.kind == ParamKind::Payload {
            payloads += 1;
            if payloads > 1 {
                return Err(RegistryError::DuplicatePayload {
                    method: route.method.clone(),
                    path: route.path.clone(),
                });
            }
        }
    }
    Ok(())
}
