//! Room state and the per-tick simulation step

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::config::GameConfig;

use super::combat::{Arrow, CombatSystem};
use super::entities::{ExpBean, Player};
use super::physics::{Obstacle, PhysicsSystem};
use super::upgrades::{sample_upgrades, try_level_up, UpgradeKind, CATALOG};
use super::world::WorldGenerator;
use super::{PlayerId, RoomId};

/// Spawn candidates keep this distance from the map edge
const SPAWN_MARGIN: f32 = 50.0;

/// Half extents of the player/bean pickup box
const PICKUP_HALF_X: f32 = 20.0;
const PICKUP_HALF_Y: f32 = 10.0;

/// Result of a successful pickup
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub value: f32,
    /// Upgrade choices, present when the player can afford a level
    pub offer: Option<Vec<UpgradeKind>>,
}

/// One isolated simulation instance
pub struct Room {
    pub id: RoomId,
    /// Ordered by id so hit resolution is deterministic
    pub players: BTreeMap<PlayerId, Player>,
    pub arrows: Vec<Arrow>,
    pub exp_beans: Vec<ExpBean>,
    pub obstacles: Vec<Obstacle>,
    config: Arc<GameConfig>,
    rng: ChaCha8Rng,
    /// Arrow whose step panics, for exercising fault isolation
    #[cfg(test)]
    pub(crate) faulty_arrow: Option<Uuid>,
}

impl Room {
    /// Create a room with a freshly generated layout
    pub fn new(id: RoomId, config: Arc<GameConfig>, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let obstacles = WorldGenerator::generate_obstacles(&mut rng, &config, config.obstacle_count);
        let exp_beans = WorldGenerator::generate_exp_beans(&mut rng, &config, config.exp_bean_count);

        Self {
            id,
            players: BTreeMap::new(),
            arrows: Vec::new(),
            exp_beans,
            obstacles,
            config,
            rng,
            #[cfg(test)]
            faulty_arrow: None,
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.players.len() < self.config.max_players_per_room
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[cfg(test)]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.keys()
    }

    /// Register a player at a safe spawn point
    pub fn add_player(&mut self, id: PlayerId, name: String) -> &Player {
        let (x, y) = self.find_safe_respawn_position(Some(id));
        let mut player = Player::new(id, name, &self.config);
        player.x = x;
        player.y = y;
        self.players.entry(id).or_insert(player)
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        self.players.remove(id)
    }

    /// Best-effort spawn search. Rejects points inside obstacles or too close
    /// to another living player; falls back to a random inset corner, which
    /// is not checked.
    pub fn find_safe_respawn_position(&mut self, exclude: Option<PlayerId>) -> (f32, f32) {
        let config = &*self.config;
        let span_x = (config.map_width - 2.0 * SPAWN_MARGIN).max(0.0);
        let span_y = (config.map_height - 2.0 * SPAWN_MARGIN).max(0.0);

        for _ in 0..config.respawn_attempts {
            let x = SPAWN_MARGIN + self.rng.gen::<f32>() * span_x;
            let y = SPAWN_MARGIN + self.rng.gen::<f32>() * span_y;

            if PhysicsSystem::hits_obstacle(x, y, &self.obstacles) {
                continue;
            }

            let crowded = self.players.values().any(|p| {
                Some(p.id) != exclude
                    && p.alive
                    && PhysicsSystem::distance(x, y, p.x, p.y) < config.respawn_clearance
            });
            if !crowded {
                return (x, y);
            }
        }

        let corners = Self::spawn_corners(config);
        corners[self.rng.gen_range(0..corners.len())]
    }

    /// Fallback spawn points, inset from each map corner
    pub fn spawn_corners(config: &GameConfig) -> [(f32, f32); 4] {
        let inset = config.respawn_corner_inset;
        [
            (inset, inset),
            (config.map_width - inset, inset),
            (inset, config.map_height - inset),
            (config.map_width - inset, config.map_height - inset),
        ]
    }

    /// Apply a client-reported position and aim. The position is clamped to
    /// the map and ignored if it lands inside an obstacle; the aim is always
    /// taken. Returns whether the position was accepted.
    pub fn move_player(&mut self, id: &PlayerId, x: f32, y: f32, angle: f32) -> bool {
        let Some(player) = self.players.get_mut(id) else {
            return false;
        };

        if angle.is_finite() {
            player.angle = angle;
        }
        if !x.is_finite() || !y.is_finite() {
            return false;
        }

        let config = &*self.config;
        let (x, y) = PhysicsSystem::clamp_to_map(
            x,
            y,
            config.map_width,
            config.map_height,
            config.move_margin,
        );
        if PhysicsSystem::hits_obstacle(x, y, &self.obstacles) {
            return false;
        }

        player.x = x;
        player.y = y;
        true
    }

    /// Fire a volley if the reload cooldown allows it. Returns the number of
    /// arrows spawned.
    pub fn shoot(&mut self, id: &PlayerId, now_ms: u64) -> usize {
        let Some(player) = self.players.get_mut(id) else {
            return 0;
        };
        if !player.alive || !player.can_fire(now_ms) {
            return 0;
        }
        player.last_shot = Some(now_ms);

        let player = &*player;
        let angles =
            CombatSystem::volley_angles(player.angle, player.multishot, self.config.multishot_spread);
        let fired = angles.len();
        self.arrows
            .extend(angles.into_iter().map(|angle| Arrow::fire(player, angle)));
        fired
    }

    /// Collect a bean within pickup range of the player
    pub fn collect_exp(&mut self, id: &PlayerId, bean_id: &Uuid) -> Option<Pickup> {
        let player = self.players.get_mut(id)?;
        let idx = self.exp_beans.iter().position(|b| &b.id == bean_id)?;

        let bean = &self.exp_beans[idx];
        if !PhysicsSystem::within_box(player.x, player.y, bean.x, bean.y, PICKUP_HALF_X, PICKUP_HALF_Y)
        {
            return None;
        }

        let bean = self.exp_beans.remove(idx);
        player.exp += bean.value;

        let offer = (player.exp >= self.config.exp_threshold(player.level))
            .then(|| sample_upgrades(&CATALOG, self.config.upgrade_choices, &mut self.rng));

        Some(Pickup {
            value: bean.value,
            offer,
        })
    }

    /// Spend experience on an upgrade. Returns the new level on success.
    pub fn select_upgrade(&mut self, id: &PlayerId, kind: UpgradeKind) -> Option<u32> {
        let player = self.players.get_mut(id)?;
        try_level_up(player, kind, &self.config)
    }

    /// Advance the simulation by one tick
    /// Arrows are stepped in place, so a panic part way through leaves every
    /// arrow in the room, the one being stepped at its previous position.
    pub fn step(&mut self) {
        self.regenerate();

        let mut i = 0;
        while i < self.arrows.len() {
            let mut arrow = self.arrows[i].clone();
            if self.step_arrow(&mut arrow) {
                self.arrows[i] = arrow;
                i += 1;
            } else {
                self.arrows.remove(i);
            }
        }
    }

    fn regenerate(&mut self) {
        for player in self.players.values_mut() {
            if player.alive && player.health_regen > 0.0 {
                player.heal(self.config.regen_per_tick(player.health_regen));
            }
        }
    }

    /// Move one arrow and resolve its collisions. Returns false once the
    /// arrow is spent.
    fn step_arrow(&mut self, arrow: &mut Arrow) -> bool {
        let config = Arc::clone(&self.config);
        let previous = (arrow.x, arrow.y);

        #[cfg(test)]
        if self.faulty_arrow == Some(arrow.id) {
            panic!("faulty arrow {}", arrow.id);
        }

        arrow.advance(config.arrow_speed);

        if !arrow.resolve_bounds(config.map_width, config.map_height, config.ricochet_range) {
            return false;
        }

        if PhysicsSystem::hits_obstacle(arrow.x, arrow.y, &self.obstacles) {
            if !arrow.can_bounce() {
                return false;
            }
            let jitter = self.rng.gen::<f32>();
            arrow.deflect(previous, jitter);
        }

        if arrow.expired(config.ricochet_range) {
            return false;
        }

        self.resolve_player_hits(arrow)
    }

    /// Damage every living non-owner player the arrow overlaps, in id order.
    /// Deaths resolve immediately. Returns false if the arrow is consumed.
    fn resolve_player_hits(&mut self, arrow: &Arrow) -> bool {
        let targets: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| p.alive && p.id != arrow.shooter_id)
            .map(|p| p.id)
            .collect();

        for target in targets {
            let Some(player) = self.players.get_mut(&target) else {
                continue;
            };
            if !player.alive || !arrow.hits(player) {
                continue;
            }

            if player.take_damage(arrow.damage) {
                self.handle_player_death(&target, &arrow.shooter_id);
            }
            if !arrow.piercing {
                return false;
            }
        }

        true
    }

    /// Atomic death and respawn: drop beans, reward the killer if still
    /// present, reset the victim and move it to a fresh spawn point.
    pub fn handle_player_death(&mut self, victim_id: &PlayerId, killer_id: &PlayerId) {
        let Some(victim) = self.players.get(victim_id) else {
            return;
        };
        let outcome = CombatSystem::resolve_death(victim, &self.config, &mut self.rng);

        self.exp_beans.extend(outcome.beans);
        if let Some(killer) = self.players.get_mut(killer_id) {
            killer.exp += outcome.reward;
            killer.kills += 1;
        }

        let (x, y) = self.find_safe_respawn_position(Some(*victim_id));
        if let Some(victim) = self.players.get_mut(victim_id) {
            victim.reset(&self.config);
            victim.x = x;
            victim.y = y;
        }

        debug!(
            room_id = %self.id,
            victim_id = %victim_id,
            killer_id = %killer_id,
            reward = outcome.reward,
            "Player killed and respawned"
        );
    }
}
