//! Smoke tests for the embedded HTTP boundary: a real server on an
//! ephemeral port, driven over raw TCP.

use minimvc::controllers;
use minimvc::dispatcher::Dispatcher;
use minimvc::registry::HandlerRegistry;
use minimvc::render::TemplateRenderer;
use minimvc::server::{AppService, HttpServer, ServerHandle};
use minimvc::session::SessionStore;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("local addr")
        .port()
}

/// Start the demo application on an ephemeral port and wait until it
/// accepts connections.
fn start_demo() -> (ServerHandle, u16) {
    let mut registry = HandlerRegistry::new();
    controllers::register_all(&mut registry);
    let table = registry.install().expect("demo routes are valid");
    let dispatcher = Arc::new(Dispatcher::new(
        table,
        Arc::new(TemplateRenderer::new("templates")),
    ));
    let service = AppService::new(dispatcher, SessionStore::new(), Some(PathBuf::from("static")));

    let port = free_port();
    let handle = HttpServer(service)
        .start(("127.0.0.1", port))
        .expect("server starts");
    handle.wait_ready().expect("server accepts connections");
    (handle, port)
}

/// One request over a fresh connection; returns the full raw response.
fn send(port: u16, request: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("read timeout");
    stream.write_all(request.as_bytes()).expect("write request");

    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if response_complete(&buf) {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// True once the headers and the Content-Length body have both arrived.
fn response_complete(buf: &[u8]) -> bool {
    let Some(split) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buf[..split]);
    let body_len = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);
    buf.len() - (split + 4) >= body_len
}

fn get(port: u16, path: &str) -> String {
    send(
        port,
        &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
    )
}

fn post_json(port: u16, path: &str, body: &str) -> String {
    send(
        port,
        &format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ),
    )
}

#[test]
fn test_server_renders_hello_over_tcp() {
    let (handle, port) = start_demo();

    let response = get(port, "/hello?name=Bob");
    assert!(response.starts_with("HTTP/1.1 200"), "response: {response}");
    assert!(
        response.contains("Content-Type: text/html; charset=utf-8"),
        "response: {response}"
    );
    assert!(response.contains("Hello, Bob!"), "response: {response}");

    handle.stop();
}

#[test]
fn test_server_signin_sets_session_cookie() {
    let (handle, port) = start_demo();

    let response = post_json(
        port,
        "/signin",
        r#"{"email":"bob@example.com","password":"bob123"}"#,
    );
    assert!(response.starts_with("HTTP/1.1 200"), "response: {response}");
    assert!(
        response.contains("Set-Cookie: session_id="),
        "fresh session travels back as a cookie: {response}"
    );
    assert!(response.contains(r#""result":true"#), "response: {response}");

    handle.stop();
}

#[test]
fn test_server_redirect_carries_location_header() {
    let (handle, port) = start_demo();

    let response = get(port, "/signout");
    assert!(response.starts_with("HTTP/1.1 302"), "response: {response}");
    assert!(response.contains("Location: /\r\n"), "response: {response}");

    handle.stop();
}

#[test]
fn test_server_static_fallback_and_not_found() {
    let (handle, port) = start_demo();

    let response = get(port, "/style.css");
    assert!(response.starts_with("HTTP/1.1 200"), "response: {response}");
    assert!(response.contains("Content-Type: text/css"), "response: {response}");
    assert!(response.contains("font-family"), "response: {response}");

    let response = get(port, "/no/such/page");
    assert!(response.starts_with("HTTP/1.1 404"), "response: {response}");
    assert!(response.contains("Not Found"), "response: {response}");

    handle.stop();
}

#[test]
fn test_server_malformed_body_is_bad_request() {
    let (handle, port) = start_demo();

    let response = post_json(port, "/signin", "{not json");
    assert!(response.starts_with("HTTP/1.1 400"), "response: {response}");
    assert!(
        response.contains("malformed request body"),
        "response: {response}"
    );

    handle.stop();
}
