//! Command-line and environment configuration for the tutor agent.

use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tracing::Level;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";
pub const DEFAULT_ROOM: &str = "hcv-training-room";

#[derive(Parser, Debug, Clone)]
#[command(name = "hcv-tutor-agent")]
#[command(about = "HCV tutor agent: MCP tools over stdio, slides pushed to the relay")]
#[command(version)]
pub struct AgentConfig {
    /// Base URL of the relay service
    #[arg(long, env = "RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    pub relay_url: String,

    /// Room the agent's slides and messages are published to
    #[arg(long, env = "ROOM_NAME", default_value = DEFAULT_ROOM)]
    pub room: String,

    /// Seconds before a single relay request is abandoned
    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value_t = 3)]
    pub relay_timeout_secs: u64,

    /// JSON lesson catalog; the built-in catalog is used when absent
    #[arg(long = "catalog", env = "CATALOG_PATH")]
    pub catalog_path: Option<PathBuf>,

    /// Skip the scripted welcome played at startup
    #[arg(long)]
    pub no_welcome_script: bool,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: Level,
}

impl AgentConfig {
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_are_parsed() {
        let config = AgentConfig::try_parse_from([
            "hcv-tutor-agent",
            "--relay-url",
            "http://relay:8080",
            "--room",
            "class-a",
            "--relay-timeout-secs",
            "7",
            "--catalog",
            "/tmp/lessons.json",
            "--no-welcome-script",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(config.relay_url, "http://relay:8080");
        assert_eq!(config.room, "class-a");
        assert_eq!(config.relay_timeout(), Duration::from_secs(7));
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/lessons.json")));
        assert!(config.no_welcome_script);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let result = AgentConfig::try_parse_from(["hcv-tutor-agent", "--log-level", "loud"]);
        assert!(result.is_err());
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let result =
            AgentConfig::try_parse_from(["hcv-tutor-agent", "--relay-timeout-secs", "soon"]);
        assert!(result.is_err());
    }
}
