//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::game::physics::Obstacle;
use crate::game::snapshot::GameSnapshot;
use crate::game::upgrades::UpgradeOption;
use crate::game::{PlayerId, RoomId};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Enter the arena; a blank name gets a placeholder
    JoinGame {
        #[serde(default)]
        name: String,
    },

    /// Client-reported position and aim
    PlayerMove { x: f32, y: f32, angle: f32 },

    /// Fire a volley at the current aim
    Shoot,

    /// Pick up an experience bean
    #[serde(rename_all = "camelCase")]
    CollectExp { bean_id: Uuid },

    /// Spend experience on an offered upgrade
    SelectUpgrade { key: String },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave the arena. Also emitted by the gateway when the socket closes.
    LeaveGame,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Sent once after the socket opens
    #[serde(rename_all = "camelCase")]
    Welcome {
        player_id: PlayerId,
        server_time: u64,
    },

    /// Confirmation of room assignment with everything needed to render
    #[serde(rename_all = "camelCase")]
    GameJoined {
        player_id: PlayerId,
        room_id: RoomId,
        obstacles: Vec<Obstacle>,
        config: Arc<GameConfig>,
    },

    /// Per-tick room state, shared by every member of the room
    GameState(Arc<GameSnapshot>),

    /// Upgrade choices, sent only to the player who can afford one
    UpgradeOptions { options: Vec<UpgradeOption> },

    /// An upgrade was applied
    UpgradeComplete {
        /// Display name of the applied upgrade
        upgrade: &'static str,
        level: u32,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::snapshot::{FullState, GameSnapshot};
    use std::collections::BTreeMap;

    #[test]
    fn parses_client_events() {
        let join: ClientMsg = serde_json::from_str(r#"{"type":"joinGame","name":"Robin"}"#).unwrap();
        assert!(matches!(join, ClientMsg::JoinGame { name } if name == "Robin"));

        let nameless: ClientMsg = serde_json::from_str(r#"{"type":"joinGame"}"#).unwrap();
        assert!(matches!(nameless, ClientMsg::JoinGame { name } if name.is_empty()));

        let mv: ClientMsg =
            serde_json::from_str(r#"{"type":"playerMove","x":10.5,"y":20,"angle":-1.5}"#).unwrap();
        assert!(matches!(mv, ClientMsg::PlayerMove { x, y, angle } if x == 10.5 && y == 20.0 && angle == -1.5));

        let shoot: ClientMsg = serde_json::from_str(r#"{"type":"shoot"}"#).unwrap();
        assert!(matches!(shoot, ClientMsg::Shoot));

        let id = Uuid::new_v4();
        let collect: ClientMsg =
            serde_json::from_str(&format!(r#"{{"type":"collectExp","beanId":"{id}"}}"#)).unwrap();
        assert!(matches!(collect, ClientMsg::CollectExp { bean_id } if bean_id == id));

        let select: ClientMsg =
            serde_json::from_str(r#"{"type":"selectUpgrade","key":"ricochet"}"#).unwrap();
        assert!(matches!(select, ClientMsg::SelectUpgrade { key } if key == "ricochet"));
    }

    #[test]
    fn rejects_malformed_events() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"teleport"}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"collectExp","beanId":7}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>("not json").is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let joined = ServerMsg::GameJoined {
            player_id: Uuid::nil(),
            room_id: Uuid::nil(),
            obstacles: vec![Obstacle::new(1.0, 2.0, 3.0, 4.0)],
            config: Arc::new(GameConfig::default()),
        };
        let json = tokio_test::assert_ok!(serde_json::to_value(&joined));
        assert_eq!(json["type"], "gameJoined");
        assert_eq!(json["roomId"], Uuid::nil().to_string());
        assert_eq!(json["obstacles"][0]["width"], 3.0);
        assert_eq!(json["config"]["MAP_HEIGHT"], 2000.0);

        let state = ServerMsg::GameState(Arc::new(GameSnapshot::Full(FullState {
            players: BTreeMap::new(),
            arrows: Vec::new(),
            exp_beans: Vec::new(),
        })));
        let json = tokio_test::assert_ok!(serde_json::to_value(&state));
        assert_eq!(json["type"], "gameState");
        assert!(json["players"].is_object());
        assert!(json["expBeans"].is_array());

        let done = ServerMsg::UpgradeComplete {
            upgrade: "Ricochet",
            level: 3,
        };
        let json = tokio_test::assert_ok!(serde_json::to_value(&done));
        assert_eq!(json["type"], "upgradeComplete");
        assert_eq!(json["level"], 3);
    }
}
