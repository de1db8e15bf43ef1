//! Room assignment and player-to-room bookkeeping

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::game::room::Room;
use crate::game::{PlayerId, RoomId};

/// Longest display name kept after trimming
pub const MAX_NAME_LEN: usize = 24;

/// Owns every room. Rooms are kept in creation order so room assignment
/// always fills the oldest room first.
pub struct SessionManager {
    config: Arc<GameConfig>,
    rooms: Vec<Room>,
    player_rooms: HashMap<PlayerId, RoomId>,
    rng: ChaCha8Rng,
}

impl SessionManager {
    pub fn new(config: Arc<GameConfig>, seed: u64) -> Self {
        Self {
            config,
            rooms: Vec::new(),
            player_rooms: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &Arc<GameConfig> {
        &self.config
    }

    /// First room with a free slot, creating one if all are full
    pub fn find_available_room(&mut self) -> RoomId {
        match self.rooms.iter().find(|room| room.has_capacity()) {
            Some(room) => room.id,
            None => self.create_room(),
        }
    }

    /// Create an empty room with a fresh layout
    pub fn create_room(&mut self) -> RoomId {
        let id = Uuid::new_v4();
        let seed = self.rng.gen::<u64>();
        self.rooms.push(Room::new(id, Arc::clone(&self.config), seed));

        info!(room_id = %id, room_count = self.rooms.len(), "Room created");
        id
    }

    /// Place a player in a room. Returns None if the player is already in one.
    pub fn join(&mut self, player_id: PlayerId, name: &str) -> Option<RoomId> {
        if self.player_rooms.contains_key(&player_id) {
            debug!(player_id = %player_id, "Duplicate join ignored");
            return None;
        }

        let name = self.display_name(name);
        let room_id = self.find_available_room();
        let room = self.room_mut(&room_id)?;
        room.add_player(player_id, name);
        let player_count = room.player_count();
        self.player_rooms.insert(player_id, room_id);

        info!(
            room_id = %room_id,
            player_id = %player_id,
            player_count,
            "Player joined room"
        );
        Some(room_id)
    }

    /// Remove a player and delete its room once empty. Safe to call twice.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<RoomId> {
        let room_id = self.player_rooms.remove(player_id)?;
        let room = self.room_mut(&room_id)?;
        room.remove_player(player_id);
        let emptied = room.is_empty();

        info!(room_id = %room_id, player_id = %player_id, "Player left room");

        if emptied {
            self.rooms.retain(|room| room.id != room_id);
            info!(room_id = %room_id, room_count = self.rooms.len(), "Room removed");
        }
        Some(room_id)
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.id == id)
    }

    pub fn room_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| &room.id == id)
    }

    #[cfg(test)]
    pub fn room_of_player(&self, player_id: &PlayerId) -> Option<&Room> {
        let room_id = self.player_rooms.get(player_id)?;
        self.room(room_id)
    }

    pub fn room_of_player_mut(&mut self, player_id: &PlayerId) -> Option<&mut Room> {
        let room_id = *self.player_rooms.get(player_id)?;
        self.room_mut(&room_id)
    }

    /// Rooms in creation order
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.rooms.iter_mut()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn player_count(&self) -> usize {
        self.player_rooms.len()
    }

    /// Trimmed, length-capped name, or a random placeholder when blank
    fn display_name(&mut self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return format!("Archer{}", self.rng.gen_range(0..1000));
        }
        trimmed.chars().take(MAX_NAME_LEN).collect()
    }
}
