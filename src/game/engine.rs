//! The engine actor: owns every room, applies player events and runs the
//! fixed-rate tick

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::session::SessionManager;
use crate::util::time::{tick_period, Timer};
use crate::ws::clients::ClientRegistry;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::snapshot::{SnapshotBuilder, SnapshotFormat};
use super::upgrades::{UpgradeKind, UpgradeOption};
use super::{PlayerId, PlayerInput};

/// Inbound events buffered ahead of the engine
pub const INPUT_QUEUE_CAPACITY: usize = 1024;

/// Counters published by the engine for the health endpoint
#[derive(Debug, Default)]
pub struct EngineStats {
    rooms: AtomicUsize,
    players: AtomicUsize,
    ticks: AtomicU64,
}

impl EngineStats {
    pub fn active_rooms(&self) -> usize {
        self.rooms.load(Ordering::Relaxed)
    }

    pub fn active_players(&self) -> usize {
        self.players.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

/// Cloneable handle for feeding the engine
#[derive(Clone)]
pub struct EngineHandle {
    input_tx: mpsc::Sender<PlayerInput>,
    stats: Arc<EngineStats>,
}

impl EngineHandle {
    pub fn input_sender(&self) -> mpsc::Sender<PlayerInput> {
        self.input_tx.clone()
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }
}

/// Single owner of all simulation state. Events and ticks are handled one
/// at a time, so no room is ever observed mid-mutation.
pub struct GameEngine {
    sessions: SessionManager,
    clients: ClientRegistry,
    input_rx: mpsc::Receiver<PlayerInput>,
    snapshot_builder: SnapshotBuilder,
    stats: Arc<EngineStats>,
    tick_period: Duration,
}

impl GameEngine {
    pub fn new(
        config: Arc<GameConfig>,
        format: SnapshotFormat,
        clients: ClientRegistry,
        seed: u64,
    ) -> (Self, EngineHandle) {
        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let stats = Arc::new(EngineStats::default());

        let handle = EngineHandle {
            input_tx,
            stats: Arc::clone(&stats),
        };

        let engine = Self {
            tick_period: tick_period(config.tick_rate),
            sessions: SessionManager::new(config, seed),
            clients,
            input_rx,
            snapshot_builder: SnapshotBuilder::new(format),
            stats,
        };

        (engine, handle)
    }

    /// Run until every input sender is dropped
    pub async fn run(mut self) {
        info!(
            tick_period_us = self.tick_period.as_micros() as u64,
            snapshot_format = ?self.snapshot_builder.format(),
            "Game engine started"
        );

        let mut ticker = interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                input = self.input_rx.recv() => match input {
                    Some(input) => self.handle_input(input),
                    None => break,
                },
                _ = ticker.tick() => self.tick(),
            }
        }

        info!("Game engine stopped");
    }

    /// Apply one client event. Events that make no sense in the player's
    /// current state are dropped.
    pub fn handle_input(&mut self, input: PlayerInput) {
        let PlayerInput {
            player_id,
            msg,
            received_at,
        } = input;

        match msg {
            ClientMsg::JoinGame { name } => self.handle_join(player_id, &name),
            ClientMsg::PlayerMove { x, y, angle } => {
                match self.sessions.room_of_player_mut(&player_id) {
                    Some(room) => {
                        room.move_player(&player_id, x, y, angle);
                    }
                    None => debug!(player_id = %player_id, "Move without room ignored"),
                }
            }
            ClientMsg::Shoot => match self.sessions.room_of_player_mut(&player_id) {
                Some(room) => {
                    room.shoot(&player_id, received_at);
                }
                None => debug!(player_id = %player_id, "Shot without room ignored"),
            },
            ClientMsg::CollectExp { bean_id } => self.handle_collect(player_id, bean_id),
            ClientMsg::SelectUpgrade { key } => self.handle_select(player_id, &key),
            ClientMsg::Ping { t } => {
                self.clients.send(&player_id, ServerMsg::Pong { t });
            }
            ClientMsg::LeaveGame => {
                self.sessions.remove_player(&player_id);
            }
        }

        self.publish_stats();
    }

    fn handle_join(&mut self, player_id: PlayerId, name: &str) {
        let Some(room_id) = self.sessions.join(player_id, name) else {
            return;
        };
        let Some(room) = self.sessions.room(&room_id) else {
            return;
        };

        self.clients.send(
            &player_id,
            ServerMsg::GameJoined {
                player_id,
                room_id,
                obstacles: room.obstacles.clone(),
                config: Arc::clone(self.sessions.config()),
            },
        );
    }

    fn handle_collect(&mut self, player_id: PlayerId, bean_id: Uuid) {
        let Some(room) = self.sessions.room_of_player_mut(&player_id) else {
            debug!(player_id = %player_id, "Pickup without room ignored");
            return;
        };
        let Some(pickup) = room.collect_exp(&player_id, &bean_id) else {
            debug!(player_id = %player_id, bean_id = %bean_id, "Stale or distant pickup ignored");
            return;
        };

        if let Some(offer) = pickup.offer {
            let options = offer.into_iter().map(UpgradeOption::from).collect();
            self.clients
                .send(&player_id, ServerMsg::UpgradeOptions { options });
        }
    }

    fn handle_select(&mut self, player_id: PlayerId, key: &str) {
        let Some(kind) = UpgradeKind::from_key(key) else {
            debug!(player_id = %player_id, key, "Unknown upgrade key ignored");
            return;
        };
        let Some(room) = self.sessions.room_of_player_mut(&player_id) else {
            return;
        };

        match room.select_upgrade(&player_id, kind) {
            Some(level) => {
                debug!(player_id = %player_id, upgrade = kind.key(), level, "Upgrade applied");
                self.clients.send(
                    &player_id,
                    ServerMsg::UpgradeComplete {
                        upgrade: kind.name(),
                        level,
                    },
                );
            }
            None => debug!(player_id = %player_id, "Upgrade without enough experience ignored"),
        }
    }

    /// Step every room, then send each room its snapshot
    pub fn tick(&mut self) {
        let timer = Timer::new();

        for room in self.sessions.rooms_mut() {
            let room_id = room.id;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| room.step())) {
                error!(
                    room_id = %room_id,
                    panic = panic_message(payload.as_ref()),
                    "Room tick panicked"
                );
            }
        }

        for room in self.sessions.rooms() {
            let snapshot = Arc::new(self.snapshot_builder.build(room));
            self.clients
                .broadcast(room.player_ids(), &ServerMsg::GameState(snapshot));
        }

        self.stats.ticks.fetch_add(1, Ordering::Relaxed);

        if timer.elapsed() > self.tick_period {
            warn!(
                elapsed_us = timer.elapsed_micros(),
                budget_us = self.tick_period.as_micros() as u64,
                rooms = self.sessions.room_count(),
                "Slow tick"
            );
        }
    }

    fn publish_stats(&self) {
        self.stats
            .rooms
            .store(self.sessions.room_count(), Ordering::Relaxed);
        self.stats
            .players
            .store(self.sessions.player_count(), Ordering::Relaxed);
    }

    #[cfg(test)]
    fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    #[cfg(test)]
    fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
