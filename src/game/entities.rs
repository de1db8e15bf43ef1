//! Player and pickup entities

use serde::Serialize;
use uuid::Uuid;

use crate::config::GameConfig;

use super::PlayerId;

/// Authoritative player state. Serialized verbatim in full snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,

    pub x: f32,
    pub y: f32,
    /// Aim angle in radians
    pub angle: f32,

    pub hp: f32,
    pub max_hp: f32,
    pub exp: f32,
    pub level: u32,

    // Upgradeable stats
    pub damage: f32,
    pub speed: f32,
    /// Milliseconds between accepted shots
    pub reload_time: u64,
    pub piercing: bool,
    pub multishot: u32,
    /// Hit points regenerated per second
    pub health_regen: f32,
    /// Bounce budget granted to this player's arrows
    pub ricochet_count: u32,

    /// Wall-clock millis of the last accepted shot
    #[serde(skip)]
    pub last_shot: Option<u64>,

    pub kills: u32,
    pub alive: bool,
}

impl Player {
    /// Fresh level-1 player at the origin; the caller places it
    pub fn new(id: PlayerId, name: String, config: &GameConfig) -> Self {
        Self {
            id,
            name,
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            hp: config.base_hp,
            max_hp: config.base_hp,
            exp: 0.0,
            level: 1,
            damage: config.arrow_damage,
            speed: config.player_speed,
            reload_time: config.base_reload_time,
            piercing: false,
            multishot: 1,
            health_regen: 0.0,
            ricochet_count: 0,
            last_shot: None,
            kills: 0,
            alive: true,
        }
    }

    /// Return every progression stat to level-1 defaults. Identity, name,
    /// kills and position are kept.
    pub fn reset(&mut self, config: &GameConfig) {
        self.level = 1;
        self.hp = config.base_hp;
        self.max_hp = config.base_hp;
        self.exp = 0.0;
        self.damage = config.arrow_damage;
        self.speed = config.player_speed;
        self.reload_time = config.base_reload_time;
        self.piercing = false;
        self.multishot = 1;
        self.health_regen = 0.0;
        self.ricochet_count = 0;
        self.alive = true;
    }

    /// Regenerate `amount` hp without exceeding max
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Subtract damage, returns true if this hit is lethal
    pub fn take_damage(&mut self, damage: f32) -> bool {
        self.hp = (self.hp - damage).max(0.0);
        self.hp <= 0.0
    }

    /// Whether a shot at `now_ms` respects the reload cooldown
    pub fn can_fire(&self, now_ms: u64) -> bool {
        match self.last_shot {
            Some(last) => now_ms.saturating_sub(last) >= self.reload_time,
            None => true,
        }
    }
}

/// Experience pickup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpBean {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub value: f32,
}

impl ExpBean {
    pub fn new(x: f32, y: f32, value: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            value,
        }
    }
}
