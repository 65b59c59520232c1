//! HTTP boundary: embedded server bootstrap, raw request parsing, and
//! response write-out. The dispatch core never touches this module; it
//! only sees the [`Exchange`](crate::context::Exchange) built here.

mod http_server;
mod request;
mod response;
mod service;
mod static_files;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_cookies, parse_query_params, parse_request, ParsedRequest};
pub use response::{write_exchange, write_json_error, write_static};
pub use service::AppService;
pub use static_files::StaticFiles;
