//! Snapshot building and compression

use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use super::combat::Arrow;
use super::entities::{ExpBean, Player};
use super::room::Room;
use super::PlayerId;

/// Wire shape of `gameState` broadcasts. `Full` is authoritative; `Compact`
/// trades field names for bandwidth and carries a subset of player fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotFormat {
    #[default]
    Full,
    Compact,
}

impl FromStr for SnapshotFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown snapshot format: {other}")),
        }
    }
}

/// Room state as broadcast once per tick
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GameSnapshot {
    Full(FullState),
    Compact(CompactState),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullState {
    pub players: BTreeMap<PlayerId, Player>,
    pub arrows: Vec<Arrow>,
    pub exp_beans: Vec<ExpBean>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompactState {
    pub p: BTreeMap<PlayerId, CompactPlayer>,
    pub a: Vec<CompactArrow>,
    pub e: Vec<ExpBean>,
}

/// Player with single-letter keys: name, position, angle, hp, max hp, exp,
/// level, kills, alive, speed
#[derive(Debug, Clone, Serialize)]
pub struct CompactPlayer {
    pub n: String,
    pub x: f32,
    pub y: f32,
    pub a: f32,
    pub h: f32,
    pub m: f32,
    pub e: f32,
    pub l: u32,
    pub k: u32,
    pub v: bool,
    pub s: f32,
}

/// Arrow with single-letter keys: id, position, angle, shooter
#[derive(Debug, Clone, Serialize)]
pub struct CompactArrow {
    pub i: Uuid,
    pub x: f32,
    pub y: f32,
    pub a: f32,
    pub s: PlayerId,
}

impl From<&Player> for CompactPlayer {
    fn from(p: &Player) -> Self {
        Self {
            n: p.name.clone(),
            x: p.x,
            y: p.y,
            a: p.angle,
            h: p.hp,
            m: p.max_hp,
            e: p.exp,
            l: p.level,
            k: p.kills,
            v: p.alive,
            s: p.speed,
        }
    }
}

impl From<&Arrow> for CompactArrow {
    fn from(a: &Arrow) -> Self {
        Self {
            i: a.id,
            x: a.x,
            y: a.y,
            a: a.angle,
            s: a.shooter_id,
        }
    }
}

/// Builds snapshots for network transmission
pub struct SnapshotBuilder {
    format: SnapshotFormat,
}

impl SnapshotBuilder {
    pub fn new(format: SnapshotFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> SnapshotFormat {
        self.format
    }

    /// Build a snapshot of the room's players, arrows and beans
    pub fn build(&self, room: &Room) -> GameSnapshot {
        match self.format {
            SnapshotFormat::Full => GameSnapshot::Full(FullState {
                players: room.players.clone(),
                arrows: room.arrows.clone(),
                exp_beans: room.exp_beans.clone(),
            }),
            SnapshotFormat::Compact => GameSnapshot::Compact(CompactState {
                p: room
                    .players
                    .iter()
                    .map(|(id, p)| (*id, CompactPlayer::from(p)))
                    .collect(),
                a: room.arrows.iter().map(CompactArrow::from).collect(),
                e: room.exp_beans.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use std::sync::Arc;

    fn populated_room() -> (Room, PlayerId) {
        let mut room = Room::new(Uuid::new_v4(), Arc::new(GameConfig::default()), 5);
        let id = Uuid::new_v4();
        room.add_player(id, "robin".into());
        room.shoot(&id, 10_000);
        (room, id)
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("full".parse::<SnapshotFormat>(), Ok(SnapshotFormat::Full));
        assert_eq!(" Compact ".parse::<SnapshotFormat>(), Ok(SnapshotFormat::Compact));
        assert!("zip".parse::<SnapshotFormat>().is_err());
    }

    #[test]
    fn full_snapshot_uses_verbatim_keys() {
        let (room, id) = populated_room();
        let snapshot = SnapshotBuilder::new(SnapshotFormat::Full).build(&room);
        let json = serde_json::to_value(&snapshot).unwrap();

        let player = &json["players"][id.to_string()];
        assert_eq!(player["name"], "robin");
        assert_eq!(player["maxHp"], 100.0);
        assert_eq!(json["arrows"].as_array().unwrap().len(), 1);
        assert_eq!(json["arrows"][0]["shooterId"], id.to_string());
        assert_eq!(json["expBeans"].as_array().unwrap().len(), 100);
    }

    #[test]
    fn compact_snapshot_uses_single_letter_keys() {
        let (room, id) = populated_room();
        let snapshot = SnapshotBuilder::new(SnapshotFormat::Compact).build(&room);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json.get("players").is_none());
        let player = &json["p"][id.to_string()];
        assert_eq!(player["n"], "robin");
        assert_eq!(player["l"], 1);
        assert_eq!(player["v"], true);
        assert_eq!(json["a"][0]["s"], id.to_string());
        assert_eq!(json["e"].as_array().unwrap().len(), 100);
    }
}
