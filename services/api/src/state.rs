//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared
//! resources: the lesson catalog, the room registry and the configuration.

use crate::{config::Config, rooms::RoomRegistry};
use hcv_tutor_core::catalog::Catalog;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub rooms: Arc<RoomRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(catalog: Catalog, config: Config) -> Self {
        Self {
            catalog: Arc::new(catalog),
            rooms: Arc::new(RoomRegistry::new()),
            config: Arc::new(config),
        }
    }
}
