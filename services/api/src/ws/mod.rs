//! WebSocket Client Channel
//!
//! Browser clients connect here, join a room by name and then receive every
//! slide and agent message published to that room.
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `session`: Manages the WebSocket connection lifecycle and room membership.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
