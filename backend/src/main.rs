//! Backend entry-point: loads settings, wires adapters, and serves the API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use library_api::inbound::http::health::HealthState;
use library_api::settings::LibrarySettings;
use server::{AppServices, ServerConfig, build_services, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = LibrarySettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let runtime = settings.validate().wrap_err("invalid configuration")?;

    let AppServices { http_state, primer } = build_services(&runtime).await?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(runtime.bind_addr, http_state),
    )
    .wrap_err_with(|| format!("failed to bind {}", runtime.bind_addr))?;
    info!(bind_addr = %runtime.bind_addr, "library api listening");

    let outcome = server.await;
    health_state.mark_unhealthy();
    primer.shutdown().await;
    info!("library api stopped");
    outcome.wrap_err("http server failed")
}
