// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod dialogs;
mod error;
mod handlers;
mod live;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use clap::Parser;
use dialogs::DialogRegistry;
use handlers::{
    handle_close_dialog, handle_dismiss_error, handle_edit, handle_get_dialog, handle_get_map,
    handle_highlight, handle_map_config, handle_open_dialog, handle_recalculate, handle_submit,
    handle_supervisor_options,
};
use live::{LiveEventBroadcaster, live_events_handler};
use plotgroup_api::{FixtureGroupingService, GroupingService, HttpGroupingService};
use plotgroup_domain::ValidationRules;
use plotgroup_map::MapConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Plot Group Server - hosts grouping preview dialogs over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Base URL of the grouping service. Without it, previews come from
    /// the fixture.
    #[arg(long)]
    grouping_service_url: Option<String>,

    /// Path to a preview response in JSON, served when no grouping service
    /// URL is given.
    #[arg(long)]
    fixture: Option<String>,

    /// Maximum number of plots a group may hold while editing.
    #[arg(long)]
    max_plots_per_group: Option<usize>,
}

/// Settings applied to every new dialog.
#[derive(Debug, Clone, Copy, Default)]
struct DialogSettings {
    rules: ValidationRules,
    max_plots_per_group: Option<usize>,
    map: MapConfig,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    dialogs: DialogRegistry,
    service: Arc<dyn GroupingService>,
    live: Arc<LiveEventBroadcaster>,
    settings: Arc<DialogSettings>,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.live)
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/dialogs", post(handle_open_dialog))
        .route(
            "/dialogs/{id}",
            get(handle_get_dialog).delete(handle_close_dialog),
        )
        .route("/dialogs/{id}/edits", post(handle_edit))
        .route(
            "/dialogs/{id}/supervisors/{group_number}",
            get(handle_supervisor_options),
        )
        .route("/dialogs/{id}/recalculate", post(handle_recalculate))
        .route("/dialogs/{id}/submit", post(handle_submit))
        .route("/dialogs/{id}/dismiss", post(handle_dismiss_error))
        .route("/dialogs/{id}/map", get(handle_get_map))
        .route("/dialogs/{id}/highlight", post(handle_highlight))
        .route("/map/config", get(handle_map_config))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

/// Picks the grouping service from the command line.
fn grouping_service(args: &Args) -> Result<Arc<dyn GroupingService>, Box<dyn std::error::Error>> {
    if let Some(url) = &args.grouping_service_url {
        info!("Using grouping service at: {}", url);
        return Ok(Arc::new(HttpGroupingService::new(url.as_str())?));
    }
    if let Some(path) = &args.fixture {
        info!("Serving previews from fixture: {}", path);
        let json: String = std::fs::read_to_string(path)?;
        return Ok(Arc::new(FixtureGroupingService::from_json(&json)?));
    }
    warn!("No grouping service or fixture configured; previews will be empty");
    Ok(Arc::new(FixtureGroupingService::default()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Plot Group Server");

    let app_state: AppState = AppState {
        dialogs: DialogRegistry::default(),
        service: grouping_service(&args)?,
        live: Arc::new(LiveEventBroadcaster::new()),
        settings: Arc::new(DialogSettings {
            max_plots_per_group: args.max_plots_per_group,
            ..DialogSettings::default()
        }),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
