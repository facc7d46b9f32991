use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use uuid::Uuid;

mod rules;

pub use rules::*;

/// ---- Animals ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Animal {
    Rabbit,
    Sheep,
    Pig,
    Cow,
    Horse,
    SmallDog,
    BigDog,
}

impl Animal {
    pub const ALL: [Animal; 7] = [
        Animal::Rabbit,
        Animal::Sheep,
        Animal::Pig,
        Animal::Cow,
        Animal::Horse,
        Animal::SmallDog,
        Animal::BigDog,
    ];

    /// The five kinds that can be collected in pairs and count towards a win.
    pub const MAIN: [Animal; 5] = [
        Animal::Rabbit,
        Animal::Sheep,
        Animal::Pig,
        Animal::Cow,
        Animal::Horse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Animal::Rabbit => "rabbit",
            Animal::Sheep => "sheep",
            Animal::Pig => "pig",
            Animal::Cow => "cow",
            Animal::Horse => "horse",
            Animal::SmallDog => "smallDog",
            Animal::BigDog => "bigDog",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// ---- Herds ----
///
/// Counts of every animal kind, used for the bank as well as for each
/// player's holdings. On the wire it is a map keyed by animal name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Animal, u32>", into = "BTreeMap<Animal, u32>")]
pub struct Herd([u32; 7]);

impl Herd {
    /// Builds a herd from counts listed in `Animal::ALL` order.
    pub const fn from_counts(counts: [u32; 7]) -> Self {
        Herd(counts)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Animal, u32)> + '_ {
        Animal::ALL.iter().map(move |&a| (a, self[a]))
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// True when the herd holds at least one of every listed kind.
    pub fn has_each(&self, kinds: &[Animal]) -> bool {
        kinds.iter().all(|&a| self[a] > 0)
    }
}

impl Index<Animal> for Herd {
    type Output = u32;

    fn index(&self, animal: Animal) -> &u32 {
        &self.0[animal.slot()]
    }
}

impl IndexMut<Animal> for Herd {
    fn index_mut(&mut self, animal: Animal) -> &mut u32 {
        &mut self.0[animal.slot()]
    }
}

impl From<BTreeMap<Animal, u32>> for Herd {
    fn from(map: BTreeMap<Animal, u32>) -> Self {
        let mut herd = Herd::default();
        for (animal, count) in map {
            herd[animal] = count;
        }
        herd
    }
}

impl From<Herd> for BTreeMap<Animal, u32> {
    fn from(herd: Herd) -> Self {
        herd.iter().collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Exchange,
    Roll,
    EndTurn,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Waiting => "waiting",
            Phase::Exchange => "exchange",
            Phase::Roll => "roll",
            Phase::EndTurn => "endTurn",
            Phase::GameOver => "gameOver",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicPlayer {
    pub id: Uuid,
    pub name: String,
    pub animals: Herd,
    pub exchanges_used: u32,
}

/// Full room snapshot pushed to every member after each state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicGame {
    pub game_id: String,
    pub bank: Herd,
    // in turn order
    pub players: Vec<PublicPlayer>,
    pub turn_order: Vec<Uuid>,
    pub current_turn: Option<Uuid>,
    pub phase: Phase,
    pub started: bool,
    pub last_dice: Option<DiceRoll>,
}

/// Lobby view of one room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: String,
    pub players: Vec<String>,
    pub started: bool,
    pub phase: Phase,
    pub current_turn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientToServer {
    JoinGame { game_id: String, name: String },
    StartGame { game_id: String },

    // Exchange phase
    Exchange { game_id: String, exchange_type: String },
    FinishExchange { game_id: String },

    // Roll phase
    RollDice { game_id: String },

    // Lobby
    ListRooms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerToClient {
    Hello {
        your_id: Uuid,
    },
    GameState {
        snapshot: PublicGame,
    },
    /// Human-readable log line(s), newline separated.
    Message {
        text: String,
    },
    Error {
        message: String,
    },
    RoomList {
        rooms: Vec<RoomSummary>,
    },
}
