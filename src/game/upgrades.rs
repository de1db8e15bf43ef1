//! Level-up upgrades

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::GameConfig;

use super::entities::Player;

/// Every upgrade a player can be offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    Damage,
    Speed,
    Health,
    Piercing,
    Multishot,
    Reload,
    Regen,
    Ricochet,
}

/// The fixed catalog, in offer order
pub const CATALOG: [UpgradeKind; 8] = [
    UpgradeKind::Damage,
    UpgradeKind::Speed,
    UpgradeKind::Health,
    UpgradeKind::Piercing,
    UpgradeKind::Multishot,
    UpgradeKind::Reload,
    UpgradeKind::Regen,
    UpgradeKind::Ricochet,
];

impl UpgradeKind {
    /// Wire key used by `selectUpgrade`
    pub fn key(self) -> &'static str {
        match self {
            UpgradeKind::Damage => "damage",
            UpgradeKind::Speed => "speed",
            UpgradeKind::Health => "health",
            UpgradeKind::Piercing => "piercing",
            UpgradeKind::Multishot => "multishot",
            UpgradeKind::Reload => "reload",
            UpgradeKind::Regen => "regen",
            UpgradeKind::Ricochet => "ricochet",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|kind| kind.key() == key)
    }

    /// Display name shown in the upgrade picker
    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::Damage => "Damage Up",
            UpgradeKind::Speed => "Move Speed",
            UpgradeKind::Health => "Max Health",
            UpgradeKind::Piercing => "Piercing Shot",
            UpgradeKind::Multishot => "Multishot",
            UpgradeKind::Reload => "Fire Rate",
            UpgradeKind::Regen => "Health Regen",
            UpgradeKind::Ricochet => "Ricochet",
        }
    }

    /// Apply this upgrade's stat effect
    pub fn apply(self, player: &mut Player, config: &GameConfig) {
        match self {
            UpgradeKind::Damage => player.damage += 10.0,
            UpgradeKind::Speed => player.speed += 0.5,
            UpgradeKind::Health => {
                player.max_hp += 20.0;
                player.hp += 20.0;
            }
            UpgradeKind::Piercing => player.piercing = true,
            UpgradeKind::Multishot => player.multishot += 1,
            UpgradeKind::Reload => {
                player.reload_time = player
                    .reload_time
                    .saturating_sub(100)
                    .max(config.min_reload_time)
            }
            UpgradeKind::Regen => player.health_regen += 0.5,
            UpgradeKind::Ricochet => player.ricochet_count += 1,
        }
    }
}

/// One entry of an `upgradeOptions` message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeOption {
    pub key: &'static str,
    pub name: &'static str,
}

impl From<UpgradeKind> for UpgradeOption {
    fn from(kind: UpgradeKind) -> Self {
        Self {
            key: kind.key(),
            name: kind.name(),
        }
    }
}

/// Pick `n` distinct upgrades from `catalog`
pub fn sample_upgrades<R: Rng + ?Sized>(
    catalog: &[UpgradeKind],
    n: usize,
    rng: &mut R,
) -> Vec<UpgradeKind> {
    catalog.choose_multiple(rng, n).copied().collect()
}

/// Spend the current level's threshold on `kind`. Returns the new level, or
/// None if the player no longer has enough experience.
pub fn try_level_up(player: &mut Player, kind: UpgradeKind, config: &GameConfig) -> Option<u32> {
    let threshold = config.exp_threshold(player.level);
    if player.exp < threshold {
        return None;
    }
    player.exp -= threshold;
    player.level += 1;
    kind.apply(player, config);
    Some(player.level)
}
