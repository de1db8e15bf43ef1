//! Outbound channels to connected clients

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::game::PlayerId;
use crate::ws::protocol::ServerMsg;

/// Messages buffered per client before new ones are dropped
pub const CLIENT_QUEUE_CAPACITY: usize = 64;

/// Registry of connected clients, keyed by connection id. Sending never
/// blocks: a full queue drops the message.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<DashMap<PlayerId, mpsc::Sender<ServerMsg>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an outbound queue for a connection
    pub fn register(&self, player_id: PlayerId) -> mpsc::Receiver<ServerMsg> {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        self.clients.insert(player_id, tx);
        rx
    }

    pub fn unregister(&self, player_id: &PlayerId) {
        self.clients.remove(player_id);
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Queue a message for one client. Returns false if it was dropped.
    pub fn send(&self, player_id: &PlayerId, msg: ServerMsg) -> bool {
        let Some(tx) = self.clients.get(player_id) else {
            return false;
        };

        match tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(player_id = %player_id, "Client lagging, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(player_id = %player_id, "Client channel closed");
                false
            }
        }
    }

    /// Queue a message for each listed client
    pub fn broadcast<'a, I>(&self, recipients: I, msg: &ServerMsg)
    where
        I: IntoIterator<Item = &'a PlayerId>,
    {
        for player_id in recipients {
            self.send(player_id, msg.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn delivers_to_registered_clients_only() {
        let clients = ClientRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = clients.register(a);
        let mut rx_b = clients.register(b);

        clients.broadcast([a].iter(), &ServerMsg::Pong { t: 9 });

        assert!(matches!(rx_a.recv().await, Some(ServerMsg::Pong { t: 9 })));
        assert!(rx_b.try_recv().is_err());
        assert!(!clients.send(&Uuid::new_v4(), ServerMsg::Pong { t: 1 }));
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let clients = ClientRegistry::new();
        let id = Uuid::new_v4();
        let _rx = clients.register(id);

        for t in 0..CLIENT_QUEUE_CAPACITY as u64 {
            assert!(clients.send(&id, ServerMsg::Pong { t }));
        }
        assert!(!clients.send(&id, ServerMsg::Pong { t: 0 }));
    }

    #[test]
    fn unregister_removes_client() {
        let clients = ClientRegistry::new();
        let id = Uuid::new_v4();
        let rx = clients.register(id);
        assert_eq!(clients.len(), 1);

        clients.unregister(&id);
        drop(rx);
        assert!(clients.is_empty());
        assert!(!clients.send(&id, ServerMsg::Pong { t: 0 }));
    }
}
