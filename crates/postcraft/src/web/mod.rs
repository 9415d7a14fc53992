mod handlers;
mod pages;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use colored::Colorize;
use tower_http::cors::CorsLayer;

use postcraft_core::LoopRunner;

#[derive(Clone)]
pub struct AppState {
    pub runner: LoopRunner,
    /// Iteration cap for form submissions and upper bound for JSON requests
    pub max_iterations: usize,
}

pub fn create_router(runner: LoopRunner, max_iterations: usize) -> Router {
    let state = AppState {
        runner,
        max_iterations,
    };

    Router::new()
        .route("/", get(handlers::index))
        .route("/craft", post(handlers::craft_form))
        .route("/api/craft", post(handlers::craft_json))
        .route("/api/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn handle_serve_command(
    runner: LoopRunner,
    max_iterations: usize,
    host: &str,
    port: u16,
    open_browser: bool,
) -> Result<()> {
    let router = create_router(runner, max_iterations);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    let url = format!("http://localhost:{}", port);
    eprintln!();
    eprintln!("  {} {}", "->".bright_green(), format!("Open {}", url).bold());
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    if open_browser {
        if let Err(e) = open::that(&url) {
            eprintln!("Failed to open browser: {} (open {} manually)", e, url);
        }
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
