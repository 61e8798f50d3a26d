//! HCV Relay Library Crate
//!
//! This library contains the web relay between the tutor agent and browser
//! clients: the room registry, the REST handlers, the WebSocket channel and
//! routing. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod rooms;
pub mod router;
pub mod state;
pub mod ws;
