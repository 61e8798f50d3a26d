//! Main Entrypoint for the HCV Tutor Agent
//!
//! Serves the tutoring tools over MCP on stdio and pushes every slide and
//! spoken line to the relay so browsers in the agent's room follow along.
//! Logs go to stderr; stdout belongs to the MCP transport.

mod config;

use anyhow::Context;
use clap::Parser;
use config::AgentConfig;
use hcv_tutor_core::{
    agent::{TutorService, TutorSession},
    catalog::Catalog,
    relay::{HttpRelayClient, SlideDispatcher},
    script::{run_script, welcome_script},
};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AgentConfig::parse();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_json_file(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::builtin(),
    };
    info!(lessons = catalog.lessons().len(), "Lesson catalog ready.");

    let relay = HttpRelayClient::new(&config.relay_url, config.relay_timeout())
        .context("Failed to build relay client")?;
    let (dispatcher, _dispatch_handle) = SlideDispatcher::spawn(Arc::new(relay));
    let session = TutorSession::new(Arc::new(catalog), config.room.as_str(), dispatcher);
    info!(relay_url = %config.relay_url, room = %config.room, "Tutor session created.");

    if !config.no_welcome_script {
        tokio::spawn(run_script(session.clone(), welcome_script()));
    }

    let service = TutorService::new(session)
        .serve(stdio())
        .await
        .context("Failed to start MCP server on stdio")?;
    info!("MCP server running on stdio.");
    service.waiting().await?;

    info!("MCP client disconnected. Shutting down.");
    Ok(())
}
