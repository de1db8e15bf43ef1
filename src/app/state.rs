//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::{EngineHandle, GameEngine};
use crate::ws::ClientRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clients: ClientRegistry,
    pub engine: EngineHandle,
}

impl AppState {
    /// Build the state and the engine it feeds. The caller spawns the engine.
    pub fn new(config: Config, seed: u64) -> (Self, GameEngine) {
        let config = Arc::new(config);
        let clients = ClientRegistry::new();

        let (engine, handle) = GameEngine::new(
            Arc::new(config.game.clone()),
            config.snapshot_format,
            clients.clone(),
            seed,
        );

        let state = Self {
            config,
            clients,
            engine: handle,
        };

        (state, engine)
    }
}
