//! Combat system - arrows, volleys, death resolution

use rand::Rng;
use serde::Serialize;
use std::f32::consts::PI;
use uuid::Uuid;

use crate::config::GameConfig;

use super::entities::{ExpBean, Player};
use super::physics::PhysicsSystem;
use super::PlayerId;

/// Beans dropped on death are clamped to this range
const MIN_DEATH_BEANS: u32 = 5;
const MAX_DEATH_BEANS: u32 = 20;
/// Dropped beans land within this distance of the death point on each axis
const DEATH_SCATTER: f32 = 50.0;

/// In-flight projectile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub damage: f32,
    pub shooter_id: PlayerId,
    pub piercing: bool,
    /// Bounce budget copied from the shooter at fire time
    pub ricochet_count: u32,
    /// Bounces used so far
    pub bounce_count: u32,
    /// Distance travelled since spawn or the last bounce
    pub range: f32,
}

impl Arrow {
    /// Snapshot the shooter's current stats into a new arrow
    pub fn fire(shooter: &Player, angle: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: shooter.x,
            y: shooter.y,
            angle,
            damage: shooter.damage,
            shooter_id: shooter.id,
            piercing: shooter.piercing,
            ricochet_count: shooter.ricochet_count,
            bounce_count: 0,
            range: 0.0,
        }
    }

    pub fn can_bounce(&self) -> bool {
        self.ricochet_count > self.bounce_count
    }

    /// Move one tick along the current heading
    pub fn advance(&mut self, speed: f32) {
        self.x += self.angle.cos() * speed;
        self.y += self.angle.sin() * speed;
        self.range += speed;
    }

    fn register_bounce(&mut self) {
        self.range = 0.0;
        self.bounce_count += 1;
    }

    /// Resolve a map-edge crossing. Returns false if the arrow leaves play.
    /// The budget is checked once; a corner crossing reflects both axes and
    /// spends a bounce for each, which may overdraw the budget by one.
    pub fn resolve_bounds(&mut self, width: f32, height: f32, ricochet_range: f32) -> bool {
        let out_x = PhysicsSystem::out_of_bounds_x(self.x, width);
        let out_y = PhysicsSystem::out_of_bounds_y(self.y, height);
        if !out_x && !out_y {
            return true;
        }

        if !self.can_bounce() || self.range >= ricochet_range {
            return false;
        }

        if out_x {
            self.angle = PI - self.angle;
            self.x = self.x.clamp(0.0, width);
            self.register_bounce();
        }
        if out_y {
            self.angle = -self.angle;
            self.y = self.y.clamp(0.0, height);
            self.register_bounce();
        }
        true
    }

    /// Bounce off an obstacle: rewind to `previous` and perturb the heading.
    /// `jitter` is a uniform sample in [0, 1).
    pub fn deflect(&mut self, previous: (f32, f32), jitter: f32) {
        self.angle += (jitter - 0.5) * PI;
        self.x = previous.0;
        self.y = previous.1;
        self.register_bounce();
    }

    /// A ricocheted arrow dies once it outruns its post-bounce range
    pub fn expired(&self, ricochet_range: f32) -> bool {
        self.bounce_count > 0 && self.range > ricochet_range
    }

    /// Player hitbox test against this arrow's position
    pub fn hits(&self, player: &Player) -> bool {
        PhysicsSystem::within_box(self.x, self.y, player.x, player.y, 10.0, 20.0)
    }
}

/// What a death leaves behind, computed before the victim is reset
#[derive(Debug, Clone)]
pub struct DeathOutcome {
    /// Experience granted to the killer
    pub reward: f32,
    /// Pickups scattered around the death point
    pub beans: Vec<ExpBean>,
}

/// Combat rules that do not need room state
pub struct CombatSystem;

impl CombatSystem {
    /// Headings for a volley of `count` pellets fanned evenly around `aim`
    pub fn volley_angles(aim: f32, count: u32, spread: f32) -> Vec<f32> {
        let count = count.max(1);
        if count == 1 {
            return vec![aim];
        }
        let center = (count - 1) as f32 / 2.0;
        (0..count)
            .map(|i| aim + (i as f32 - center) * spread)
            .collect()
    }

    /// Experience a victim drops and the beans it scatters
    pub fn resolve_death<R: Rng + ?Sized>(
        victim: &Player,
        config: &GameConfig,
        rng: &mut R,
    ) -> DeathOutcome {
        let reward = (victim.exp * config.exp_drop_ratio).floor();
        let count = ((reward / 10.0).floor() as u32).clamp(MIN_DEATH_BEANS, MAX_DEATH_BEANS);
        let value = (reward / count as f32).floor();

        let beans = (0..count)
            .map(|_| {
                let x = victim.x + (rng.gen::<f32>() - 0.5) * DEATH_SCATTER * 2.0;
                let y = victim.y + (rng.gen::<f32>() - 0.5) * DEATH_SCATTER * 2.0;
                ExpBean::new(x, y, value)
            })
            .collect();

        DeathOutcome { reward, beans }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn shooter() -> Player {
        let mut p = Player::new(Uuid::new_v4(), "s".into(), &GameConfig::default());
        p.x = 100.0;
        p.y = 200.0;
        p
    }

    #[test]
    fn multishot_fans_symmetrically() {
        let angles = CombatSystem::volley_angles(0.0, 3, 0.2);
        assert_eq!(angles.len(), 3);
        assert!((angles[0] + 0.2).abs() < 1e-6);
        assert!(angles[1].abs() < 1e-6);
        assert!((angles[2] - 0.2).abs() < 1e-6);

        let even = CombatSystem::volley_angles(1.0, 2, 0.2);
        assert!((even[0] - 0.9).abs() < 1e-6);
        assert!((even[1] - 1.1).abs() < 1e-6);
    }

    #[test]
    fn arrow_copies_shooter_stats() {
        let mut s = shooter();
        s.damage = 45.0;
        s.piercing = true;
        s.ricochet_count = 2;
        let arrow = Arrow::fire(&s, 0.5);

        s.damage = 999.0;
        assert_eq!(arrow.damage, 45.0);
        assert!(arrow.piercing);
        assert_eq!(arrow.ricochet_count, 2);
        assert_eq!((arrow.x, arrow.y), (100.0, 200.0));
        assert_eq!(arrow.bounce_count, 0);
    }

    #[test]
    fn bounds_without_budget_removes() {
        let mut arrow = Arrow::fire(&shooter(), 0.0);
        arrow.x = 2001.0;
        assert!(!arrow.resolve_bounds(2000.0, 2000.0, 500.0));
    }

    #[test]
    fn bounds_with_budget_reflects_horizontally() {
        let mut s = shooter();
        s.ricochet_count = 1;
        let mut arrow = Arrow::fire(&s, 0.3);
        arrow.x = 2004.0;
        arrow.range = 120.0;

        assert!(arrow.resolve_bounds(2000.0, 2000.0, 500.0));
        assert_eq!(arrow.x, 2000.0);
        assert!((arrow.angle - (PI - 0.3)).abs() < 1e-6);
        assert_eq!(arrow.bounce_count, 1);
        assert_eq!(arrow.range, 0.0);
        assert!(!arrow.can_bounce());
    }

    #[test]
    fn bounds_past_ricochet_range_removes() {
        let mut s = shooter();
        s.ricochet_count = 3;
        let mut arrow = Arrow::fire(&s, 0.0);
        arrow.y = -1.0;
        arrow.range = 500.0;
        assert!(!arrow.resolve_bounds(2000.0, 2000.0, 500.0));
    }

    #[test]
    fn corner_crossing_spends_a_bounce_per_axis() {
        let mut s = shooter();
        s.ricochet_count = 2;
        let mut arrow = Arrow::fire(&s, PI / 4.0);
        arrow.x = 2003.0;
        arrow.y = 2003.0;
        assert!(arrow.resolve_bounds(2000.0, 2000.0, 500.0));
        assert_eq!(arrow.bounce_count, 2);
        assert!(!arrow.can_bounce());
        assert_eq!((arrow.x, arrow.y), (2000.0, 2000.0));
        assert!((arrow.angle - (-(PI - PI / 4.0))).abs() < 1e-6);
    }

    #[test]
    fn corner_crossing_with_one_bounce_left_overdraws() {
        let mut s = shooter();
        s.ricochet_count = 1;
        let mut arrow = Arrow::fire(&s, PI / 4.0);
        arrow.x = 2003.0;
        arrow.y = 2003.0;
        assert!(arrow.resolve_bounds(2000.0, 2000.0, 500.0));
        assert_eq!(arrow.bounce_count, 2);
        assert!(!arrow.can_bounce());
    }

    #[test]
    fn deflect_rewinds_position() {
        let mut s = shooter();
        s.ricochet_count = 1;
        let mut arrow = Arrow::fire(&s, 0.0);
        arrow.advance(8.0);
        arrow.deflect((100.0, 200.0), 0.75);
        assert_eq!((arrow.x, arrow.y), (100.0, 200.0));
        assert!((arrow.angle - PI / 4.0).abs() < 1e-6);
        assert_eq!(arrow.range, 0.0);
    }

    #[test]
    fn expiry_only_after_bounce() {
        let mut arrow = Arrow::fire(&shooter(), 0.0);
        arrow.range = 900.0;
        assert!(!arrow.expired(500.0));
        arrow.bounce_count = 1;
        assert!(arrow.expired(500.0));
    }

    #[test]
    fn death_drops_a_third_of_experience() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut victim = shooter();
        victim.exp = 300.0;

        let outcome = CombatSystem::resolve_death(&victim, &config, &mut rng);
        assert_eq!(outcome.reward, 99.0);
        assert_eq!(outcome.beans.len(), 9);
        for bean in &outcome.beans {
            assert_eq!(bean.value, 11.0);
            assert!((bean.x - victim.x).abs() <= 50.0);
            assert!((bean.y - victim.y).abs() <= 50.0);
        }
    }

    #[test]
    fn death_bean_count_is_clamped() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut victim = shooter();

        victim.exp = 0.0;
        assert_eq!(CombatSystem::resolve_death(&victim, &config, &mut rng).beans.len(), 5);

        victim.exp = 10_000.0;
        let outcome = CombatSystem::resolve_death(&victim, &config, &mut rng);
        assert_eq!(outcome.beans.len(), 20);
        assert_eq!(outcome.reward, 3300.0);
        assert_eq!(outcome.beans[0].value, 165.0);
    }
}
