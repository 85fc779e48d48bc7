// ABOUTME: Server binary: config load, logging, database init and axum serve
// ABOUTME: Spawns the cache cleanup and limiter eviction background tasks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! # Forma API Server Binary
//!
//! Starts the REST backend with authentication, persistence and the plan
//! generators wired together.

use anyhow::Result;
use clap::Parser;
use forma_server::{config::environment::ServerConfig, database::Database, logging, routes};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Interval for cache cleanup and rate-limiter window eviction
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "forma-server")]
#[command(about = "Forma Fitness API - REST backend for weight, nutrition and training tracking")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }

    logging::init_from_env()?;

    info!("Starting Forma Fitness API");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url.to_connection_string()).await?;
    info!("Database initialized ({})", database.backend_info());

    let resources = Arc::new(routes::ServerResources::new(database, Arc::new(config.clone())));

    // Periodic in-process maintenance
    let _cache_task = resources.cache.spawn_cleanup_task(MAINTENANCE_INTERVAL);
    let limiter = Arc::clone(&resources.rate_limiter);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(MAINTENANCE_INTERVAL);
        loop {
            ticker.tick().await;
            limiter.evict_stale();
        }
    });

    let app = routes::router(Arc::clone(&resources));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    info!("Server listening on {addr}");
    display_available_endpoints(config.http_port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}

/// Display the API surface on startup
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());

    info!("=== Available API Endpoints ===");
    info!("Auth:");
    info!("   Register:          POST http://{host}:{port}/api/auth/register");
    info!("   Login:             POST http://{host}:{port}/api/auth/login");
    info!("   Refresh:           POST http://{host}:{port}/api/auth/refresh");
    info!("   Profile:           GET  http://{host}:{port}/api/auth/me");
    info!("Tracking:");
    info!("   Daily logs:        GET  http://{host}:{port}/api/logs?from&to");
    info!("   Day detail:        GET  http://{host}:{port}/api/logs/{{date}}");
    info!("   Log meal:          POST http://{host}:{port}/api/logs/{{date}}/meals");
    info!("   Log exercise:      POST http://{host}:{port}/api/logs/{{date}}/exercises");
    info!("   Calendar:          GET  http://{host}:{port}/api/calendar?from&to");
    info!("Plans:");
    info!("   Routines:          GET/POST http://{host}:{port}/api/routines");
    info!("   Generate routine:  POST http://{host}:{port}/api/routines/generate");
    info!("   Generate plan:     POST http://{host}:{port}/api/meal-plans/generate");
    info!("   Recommendations:   GET  http://{host}:{port}/api/recommendations");
    info!("Catalog:");
    info!("   Exercises:         GET  http://{host}:{port}/api/exercises");
    info!("   External search:   GET  http://{host}:{port}/api/exercises/search-external?q=");
    info!("   Foods:             GET  http://{host}:{port}/api/foods");
    info!("Coaching:");
    info!("   Clients:           GET  http://{host}:{port}/api/coach/clients");
    info!("   Invites:           POST http://{host}:{port}/api/coach/invites");
    info!("   Check-ins:         GET  http://{host}:{port}/api/coach/checkins");
    info!("   Messages:          GET  http://{host}:{port}/api/messages/conversations");
    info!("Admin:");
    info!("   Users:             GET  http://{host}:{port}/api/admin/users");
    info!("   Stats:             GET  http://{host}:{port}/api/admin/stats");
    info!("   Brand:             PUT  http://{host}:{port}/api/admin/brand");
    info!("Misc:");
    info!("   Health:            GET  http://{host}:{port}/api/health");
    info!("   Brand (public):    GET  http://{host}:{port}/api/brand");
    info!("=== End of Endpoint List ===");
}
