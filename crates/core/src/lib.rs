//! HCV Tutor Core
//!
//! Domain logic shared by the tutor agent and the web relay: the lesson
//! catalog, the slide content resolver, the lesson progress state machine,
//! the agent's MCP tool service and the ordered relay dispatcher.

pub mod agent;
pub mod catalog;
pub mod housing;
pub mod progress;
pub mod relay;
pub mod script;
pub mod slide;
pub mod topic;
