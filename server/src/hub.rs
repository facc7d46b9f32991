use crate::game::{Audience, Envelope};
use parking_lot::Mutex;
use std::collections::HashMap;
use superfarmer_protocol::ServerToClient;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Delivery side of the server: pushes messages to one connection or to
/// everybody connected. Sends are fire-and-forget.
pub trait Gateway: Send + Sync {
    fn send_to(&self, id: Uuid, msg: ServerToClient);

    fn send_all(&self, msg: ServerToClient);

    fn deliver(&self, envelopes: Vec<Envelope>) {
        for Envelope { to, msg } in envelopes {
            match to {
                Audience::Room(members) => {
                    for id in members {
                        self.send_to(id, msg.clone());
                    }
                }
                Audience::Player(id) => self.send_to(id, msg),
            }
        }
    }
}

/// Outbound channel of every live websocket, keyed by connection id.
#[derive(Default)]
pub struct Hub {
    clients: Mutex<HashMap<Uuid, mpsc::UnboundedSender<ServerToClient>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: Uuid) -> mpsc::UnboundedReceiver<ServerToClient> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.lock().insert(id, tx);
        rx
    }

    pub fn unregister(&self, id: Uuid) {
        self.clients.lock().remove(&id);
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Gateway for Hub {
    fn send_to(&self, id: Uuid, msg: ServerToClient) {
        let clients = self.clients.lock();
        match clients.get(&id) {
            Some(tx) => {
                if tx.send(msg).is_err() {
                    warn!(client = %id, "send failed; connection closing");
                }
            }
            None => warn!(client = %id, "no such connection"),
        }
    }

    fn send_all(&self, msg: ServerToClient) {
        for (id, tx) in self.clients.lock().iter() {
            if tx.send(msg.clone()).is_err() {
                warn!(client = %id, "send failed; connection closing");
            }
        }
    }
}
