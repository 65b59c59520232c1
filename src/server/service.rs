use super::request::{parse_request, ParsedRequest};
use super::response::{write_exchange, write_json_error, write_static};
use super::static_files::StaticFiles;
use crate::context::Exchange;
use crate::dispatcher::{Dispatcher, Outcome};
use crate::session::{SessionStore, SESSION_COOKIE};
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// HTTP boundary: parses the raw request, builds an [`Exchange`], hands it
/// to the dispatcher, and writes the buffered response back out.
///
/// Routing misses on GET fall through to the static webapp root before a
/// 404 is reported.
#[derive(Clone)]
pub struct AppService {
    dispatcher: Arc<Dispatcher>,
    session_store: SessionStore,
    static_files: Option<StaticFiles>,
}

impl AppService {
    #[must_use]
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        session_store: SessionStore,
        static_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            dispatcher,
            session_store,
            static_files: static_dir.map(StaticFiles::new),
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            cookies,
            query_params,
            body,
            ..
        } = parse_request(req);

        let method: Method = match method.parse() {
            Ok(m) => m,
            Err(_) => {
                write_json_error(res, 404, json!({ "error": "Not Found", "path": path }));
                return Ok(());
            }
        };

        let mut ex = Exchange::new(self.session_store.clone()).with_query_params(query_params);
        if let Some(body) = body {
            ex = ex.with_body(body);
        }
        if let Some(id) = cookies.get(SESSION_COOKIE).and_then(|v| v.parse().ok()) {
            ex = ex.with_session_id(id);
        }

        match self.dispatcher.dispatch(&method, &path, &mut ex) {
            Ok(Outcome::NotFound) => {
                if method == Method::GET {
                    if let Some(sf) = &self.static_files {
                        if let Ok((bytes, ct)) = sf.load(&path) {
                            write_static(res, ct, bytes);
                            return Ok(());
                        }
                    }
                }
                write_json_error(
                    res,
                    404,
                    json!({ "error": "Not Found", "method": method.as_str(), "path": path }),
                );
            }
            Ok(_) => write_exchange(res, &ex),
            Err(e) => {
                error!(%method, path = %path, error = %e, "dispatch failed");
                write_json_error(res, e.http_status(), json!({ "error": e.to_string() }));
            }
        }
        Ok(())
    }
}
