use crate::error::ActionError;
use crate::game::{self, Command, DiceSource, Game};
use crate::hub::Gateway;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use superfarmer_protocol::{RoomSummary, ServerToClient};
use tracing::{debug, info};
use uuid::Uuid;

type SharedGame = Arc<Mutex<Game>>;

/// Owner of every live room.
///
/// Lock order is always the room map first, then a single room. Outbound
/// messages of an action are delivered while that room is still locked, so
/// two actions on the same room can never interleave their broadcasts.
pub struct RoomStore {
    rooms: Mutex<HashMap<String, SharedGame>>,
    dice: Box<dyn DiceSource>,
    // serializes room list publication
    lobby: Mutex<()>,
}

impl RoomStore {
    pub fn new(dice: Box<dyn DiceSource>) -> Self {
        RoomStore {
            rooms: Mutex::new(HashMap::new()),
            dice,
            lobby: Mutex::new(()),
        }
    }

    /// Returns the room, creating it with a fresh bank if absent.
    pub fn get_or_create(&self, room_id: &str) -> SharedGame {
        get_or_create(&mut self.rooms.lock(), room_id)
    }

    pub fn get(&self, room_id: &str) -> Option<SharedGame> {
        self.rooms.lock().get(room_id).cloned()
    }

    /// Drops a room if nobody is seated in it any more.
    pub fn remove(&self, room_id: &str) -> bool {
        remove_if_empty(&mut self.rooms.lock(), room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        let games: Vec<SharedGame> = self.rooms.lock().values().cloned().collect();
        let mut out: Vec<RoomSummary> = games.iter().map(|g| g.lock().summary()).collect();
        out.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        out
    }

    /// Runs one command against a room. `Ok(true)` means the room changed
    /// and the lobby list should be republished; unknown rooms are ignored.
    pub fn dispatch(
        &self,
        room_id: &str,
        actor: Uuid,
        cmd: Command,
        gateway: &dyn Gateway,
    ) -> Result<bool, ActionError> {
        let cmd = match cmd {
            Command::Join { name } => return self.join(room_id, actor, &name, gateway),
            other => other,
        };

        let Some(shared) = self.get(room_id) else {
            debug!(room = %room_id, ?cmd, "action for unknown room ignored");
            return Ok(false);
        };
        let mut game = shared.lock();
        let out = game.apply(actor, cmd, self.dice.as_ref())?;
        gateway.deliver(out);
        Ok(true)
    }

    fn join(
        &self,
        room_id: &str,
        actor: Uuid,
        name: &str,
        gateway: &dyn Gateway,
    ) -> Result<bool, ActionError> {
        let name = game::display_name(name)?;
        let mut rooms = self.rooms.lock();

        if let Some(existing) = rooms.get(room_id) {
            if existing.lock().started {
                return Err(ActionError::JoinAfterStart);
            }
        }

        // one seat per connection: leave any other room first
        depart(&mut rooms, actor, Some(room_id), gateway);

        let shared = get_or_create(&mut rooms, room_id);
        let mut game = shared.lock();
        let out = game.join(actor, &name)?;
        gateway.deliver(out);
        Ok(true)
    }

    /// Removes a lost connection from every room it sat in.
    pub fn disconnect(&self, actor: Uuid, gateway: &dyn Gateway) -> bool {
        let mut rooms = self.rooms.lock();
        depart(&mut rooms, actor, None, gateway)
    }

    /// Sends the lobby view of every room to every connected client.
    pub fn publish_room_list(&self, gateway: &dyn Gateway) {
        let _gate = self.lobby.lock();
        gateway.send_all(ServerToClient::RoomList {
            rooms: self.summaries(),
        });
    }
}

/// Unseats `actor` from every room except `keep`, deleting rooms left empty.
fn depart(
    rooms: &mut HashMap<String, SharedGame>,
    actor: Uuid,
    keep: Option<&str>,
    gateway: &dyn Gateway,
) -> bool {
    let mut changed = false;
    let mut emptied = Vec::new();
    for (room_id, shared) in rooms.iter() {
        if keep == Some(room_id.as_str()) {
            continue;
        }
        let mut game = shared.lock();
        if let Some(out) = game.remove_player(actor) {
            changed = true;
            gateway.deliver(out);
            if game.is_empty() {
                emptied.push(room_id.clone());
            }
        }
    }
    for room_id in emptied {
        remove_if_empty(rooms, &room_id);
    }
    changed
}

// The helpers below take the already locked map; the map mutex is not reentrant.

fn get_or_create(rooms: &mut HashMap<String, SharedGame>, room_id: &str) -> SharedGame {
    rooms
        .entry(room_id.to_string())
        .or_insert_with(|| {
            info!(room = %room_id, "room created");
            Arc::new(Mutex::new(Game::new(room_id)))
        })
        .clone()
}

fn remove_if_empty(rooms: &mut HashMap<String, SharedGame>, room_id: &str) -> bool {
    let empty = rooms.get(room_id).is_some_and(|g| g.lock().is_empty());
    if empty {
        rooms.remove(room_id);
        info!(room = %room_id, "room removed");
    }
    empty
}
