use anyhow::Context;
use minimvc::controllers;
use minimvc::dispatcher::Dispatcher;
use minimvc::registry::HandlerRegistry;
use minimvc::render::TemplateRenderer;
use minimvc::server::{AppService, HttpServer};
use minimvc::session::SessionStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut registry = HandlerRegistry::new();
    controllers::register_all(&mut registry);
    let table = registry.install().context("route table installation failed")?;

    let renderer = Arc::new(TemplateRenderer::new("templates"));
    let dispatcher = Arc::new(Dispatcher::new(table, renderer));
    let service = AppService::new(dispatcher, SessionStore::new(), Some(PathBuf::from("static")));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let handle = HttpServer(service)
        .start(("0.0.0.0", port))
        .context("failed to bind HTTP server")?;
    info!(port, "minimvc demo listening");
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))?;
    Ok(())
}
