//! Game simulation modules

pub mod combat;
pub mod engine;
pub mod entities;
pub mod physics;
pub mod room;
pub mod snapshot;
pub mod upgrades;
pub mod world;

pub use engine::{EngineHandle, GameEngine};

use crate::ws::protocol::ClientMsg;
use uuid::Uuid;

pub type PlayerId = Uuid;
pub type RoomId = Uuid;

/// Player input received from WebSocket
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub player_id: PlayerId,
    pub msg: ClientMsg,
    pub received_at: u64,
}
