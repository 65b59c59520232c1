use crate::context::Exchange;
use crate::session::SESSION_COOKIE;
use may_minihttp::Response;
use serde_json::Value;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

// may_minihttp takes header lines as &'static str; genuinely dynamic
// values (cookies, redirect targets) go through Box::leak.
fn dynamic_header(res: &mut Response, line: String) {
    res.header(&*Box::leak(line.into_boxed_str()));
}

/// Set the Content-Type header, reusing a static line for the types the
/// framework itself produces so only handler-supplied types leak.
fn content_type_header(res: &mut Response, content_type: &str) {
    let line = match content_type {
        "text/html; charset=utf-8" => "Content-Type: text/html; charset=utf-8",
        "application/json" => "Content-Type: application/json",
        "text/html" => "Content-Type: text/html",
        "text/css" => "Content-Type: text/css",
        "application/javascript" => "Content-Type: application/javascript",
        "image/png" => "Content-Type: image/png",
        "image/x-icon" => "Content-Type: image/x-icon",
        "text/plain" => "Content-Type: text/plain",
        "application/octet-stream" => "Content-Type: application/octet-stream",
        other => {
            dynamic_header(res, format!("Content-Type: {other}"));
            return;
        }
    };
    res.header(line);
}

/// Flush a dispatched exchange to the raw response: status, content type,
/// session cookie, and either a redirect or the buffered body.
pub fn write_exchange(res: &mut Response, ex: &Exchange) {
    let status = ex.status();
    res.status_code(status as usize, status_reason(status));
    if let Some(id) = ex.new_session_cookie() {
        dynamic_header(
            res,
            format!("Set-Cookie: {SESSION_COOKIE}={id}; Path=/; HttpOnly"),
        );
    }
    if let Some(target) = ex.redirect_target() {
        dynamic_header(res, format!("Location: {target}"));
        return;
    }
    content_type_header(res, ex.content_type());
    res.body_vec(ex.body_out().to_vec());
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}

/// Write a static file body with its content type.
pub fn write_static(res: &mut Response, content_type: &'static str, bytes: Vec<u8>) {
    res.status_code(200, "OK");
    content_type_header(res, content_type);
    res.body_vec(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(302), "Found");
        assert_eq!(status_reason(404), "Not Found");
    }
}
