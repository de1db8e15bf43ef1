//! Gameplay tunables shared read-only by every room

use serde::Serialize;

/// Immutable game constants. Sent verbatim to clients on join, so field names
/// follow the client's SCREAMING_SNAKE convention on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GameConfig {
    pub map_width: f32,
    pub map_height: f32,
    pub max_players_per_room: usize,

    /// Client-side movement speed; upgrades raise it
    pub player_speed: f32,
    /// Arrow travel per tick
    pub arrow_speed: f32,
    pub arrow_damage: f32,
    pub base_hp: f32,
    /// Milliseconds between accepted shots at level 1
    pub base_reload_time: u64,
    /// Lowest reload time the reload upgrade can reach
    pub min_reload_time: u64,

    /// Share of a victim's experience dropped (and granted to the killer)
    pub exp_drop_ratio: f32,
    /// Experience cost per level; levels past the end reuse the last entry
    pub upgrade_exp_cost: Vec<f32>,
    /// Number of upgrade options offered at a time
    pub upgrade_choices: usize,

    pub tick_rate: u32,
    /// Distance a ricocheting arrow may travel between bounces
    pub ricochet_range: f32,
    /// Angular gap between multishot pellets (radians)
    pub multishot_spread: f32,

    pub obstacle_count: usize,
    pub exp_bean_count: usize,

    pub respawn_attempts: u32,
    /// Minimum distance from other living players for a spawn point
    pub respawn_clearance: f32,
    /// Inset of the fallback spawn corners from the map edge
    pub respawn_corner_inset: f32,
    /// Players are kept this far from the map edge
    pub move_margin: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 2000.0,
            map_height: 2000.0,
            max_players_per_room: 30,
            player_speed: 3.0,
            arrow_speed: 8.0,
            arrow_damage: 25.0,
            base_hp: 100.0,
            base_reload_time: 500,
            min_reload_time: 200,
            exp_drop_ratio: 0.33,
            upgrade_exp_cost: vec![100.0, 200.0, 400.0, 800.0, 1600.0],
            upgrade_choices: 3,
            tick_rate: 60,
            ricochet_range: 500.0,
            multishot_spread: 0.2,
            obstacle_count: 15,
            exp_bean_count: 100,
            respawn_attempts: 50,
            respawn_clearance: 100.0,
            respawn_corner_inset: 100.0,
            move_margin: 20.0,
        }
    }
}

impl GameConfig {
    /// Experience needed to take the upgrade for `level`
    pub fn exp_threshold(&self, level: u32) -> f32 {
        let last = self.upgrade_exp_cost.len().saturating_sub(1);
        let idx = (level.max(1) as usize - 1).min(last);
        self.upgrade_exp_cost.get(idx).copied().unwrap_or(f32::INFINITY)
    }

    /// Health regenerated per tick for a regen rate given in hp/second
    pub fn regen_per_tick(&self, per_second: f32) -> f32 {
        per_second / self.tick_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_reuse_last_entry() {
        let config = GameConfig::default();
        assert_eq!(config.exp_threshold(1), 100.0);
        assert_eq!(config.exp_threshold(3), 400.0);
        assert_eq!(config.exp_threshold(5), 1600.0);
        assert_eq!(config.exp_threshold(12), 1600.0);
    }

    #[test]
    fn serializes_with_client_keys() {
        let json = serde_json::to_value(GameConfig::default()).unwrap();
        assert_eq!(json["MAP_WIDTH"], 2000.0);
        assert_eq!(json["MAX_PLAYERS_PER_ROOM"], 30);
        assert_eq!(json["UPGRADE_EXP_COST"].as_array().unwrap().len(), 5);
    }
}
