//! Static game data: the starting bank, the exchange table, the two dice
//! and the win condition.

use crate::{Animal, Herd};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchanges a player may make during one exchange phase.
pub const MAX_EXCHANGES_PER_TURN: u32 = 1;

/// Bank contents of a freshly created room.
pub const STARTING_BANK: Herd = Herd::from_counts([60, 24, 20, 12, 6, 4, 2]);

/// A player holding at least one of each of these wins.
pub const WINNING_SET: [Animal; 5] = Animal::MAIN;

/// ---- Dice ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Face {
    Rabbit,
    Sheep,
    Pig,
    Cow,
    Horse,
    Fox,
    Wolf,
}

impl Face {
    /// The animal shown on this face; `None` for predators.
    pub fn animal(self) -> Option<Animal> {
        match self {
            Face::Rabbit => Some(Animal::Rabbit),
            Face::Sheep => Some(Animal::Sheep),
            Face::Pig => Some(Animal::Pig),
            Face::Cow => Some(Animal::Cow),
            Face::Horse => Some(Animal::Horse),
            Face::Fox | Face::Wolf => None,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.animal() {
            Some(a) => f.write_str(a.name()),
            None if *self == Face::Fox => f.write_str("fox"),
            None => f.write_str("wolf"),
        }
    }
}

pub const RED_DIE: [Face; 12] = [
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Fox,
    Face::Pig,
    Face::Pig,
    Face::Horse,
    Face::Sheep,
    Face::Sheep,
];

pub const BLUE_DIE: [Face; 12] = [
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Rabbit,
    Face::Pig,
    Face::Sheep,
    Face::Sheep,
    Face::Sheep,
    Face::Wolf,
    Face::Cow,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceRoll {
    pub red: Face,
    pub blue: Face,
}

impl DiceRoll {
    /// Draws one uniform face from each die.
    pub fn throw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        DiceRoll {
            red: RED_DIE[rng.gen_range(0..RED_DIE.len())],
            blue: BLUE_DIE[rng.gen_range(0..BLUE_DIE.len())],
        }
    }

    pub fn fox(&self) -> bool {
        self.red == Face::Fox
    }

    pub fn wolf(&self) -> bool {
        self.blue == Face::Wolf
    }

    /// How many of the two faces show `animal`.
    pub fn count(&self, animal: Animal) -> u32 {
        [self.red, self.blue]
            .iter()
            .filter(|f| f.animal() == Some(animal))
            .count() as u32
    }
}

/// ---- Exchanges ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ExchangeKind {
    RabbitToSheep,
    SheepToPig,
    PigToCow,
    CowToHorse,
    SheepToSmallDog,
    CowToBigDog,
    SheepToRabbit,
    PigToSheep,
    CowToPig,
    HorseToCow,
    SmallDogToSheep,
    BigDogToCow,
}

impl ExchangeKind {
    pub fn rule(self) -> &'static ExchangeRule {
        &EXCHANGE_RULES[self as usize]
    }

    pub fn key(self) -> &'static str {
        match self {
            ExchangeKind::RabbitToSheep => "rabbitToSheep",
            ExchangeKind::SheepToPig => "sheepToPig",
            ExchangeKind::PigToCow => "pigToCow",
            ExchangeKind::CowToHorse => "cowToHorse",
            ExchangeKind::SheepToSmallDog => "sheepToSmallDog",
            ExchangeKind::CowToBigDog => "cowToBigDog",
            ExchangeKind::SheepToRabbit => "sheepToRabbit",
            ExchangeKind::PigToSheep => "pigToSheep",
            ExchangeKind::CowToPig => "cowToPig",
            ExchangeKind::HorseToCow => "horseToCow",
            ExchangeKind::SmallDogToSheep => "smallDogToSheep",
            ExchangeKind::BigDogToCow => "bigDogToCow",
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExchange(pub String);

impl fmt::Display for UnknownExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown exchange type `{}`", self.0)
    }
}

impl std::error::Error for UnknownExchange {}

impl FromStr for ExchangeKind {
    type Err = UnknownExchange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EXCHANGE_RULES
            .iter()
            .map(|r| r.kind)
            .find(|k| k.key() == s)
            .ok_or_else(|| UnknownExchange(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRule {
    pub kind: ExchangeKind,
    pub cost: &'static [(Animal, u32)],
    pub reward: &'static [(Animal, u32)],
}

impl ExchangeRule {
    /// Player-side check: enough of every cost animal, and at least one
    /// rabbit left over when rabbits are paid.
    pub fn can_afford(&self, herd: &Herd) -> bool {
        self.cost.iter().all(|&(animal, qty)| {
            herd[animal] >= qty && (animal != Animal::Rabbit || herd[animal] - qty >= 1)
        })
    }
}

/// Indexed by `ExchangeKind as usize`.
pub static EXCHANGE_RULES: [ExchangeRule; 12] = [
    ExchangeRule {
        kind: ExchangeKind::RabbitToSheep,
        cost: &[(Animal::Rabbit, 6)],
        reward: &[(Animal::Sheep, 1)],
    },
    ExchangeRule {
        kind: ExchangeKind::SheepToPig,
        cost: &[(Animal::Sheep, 2)],
        reward: &[(Animal::Pig, 1)],
    },
    ExchangeRule {
        kind: ExchangeKind::PigToCow,
        cost: &[(Animal::Pig, 3)],
        reward: &[(Animal::Cow, 1)],
    },
    ExchangeRule {
        kind: ExchangeKind::CowToHorse,
        cost: &[(Animal::Cow, 2)],
        reward: &[(Animal::Horse, 1)],
    },
    ExchangeRule {
        kind: ExchangeKind::SheepToSmallDog,
        cost: &[(Animal::Sheep, 1)],
        reward: &[(Animal::SmallDog, 1)],
    },
    ExchangeRule {
        kind: ExchangeKind::CowToBigDog,
        cost: &[(Animal::Cow, 1)],
        reward: &[(Animal::BigDog, 1)],
    },
    ExchangeRule {
        kind: ExchangeKind::SheepToRabbit,
        cost: &[(Animal::Sheep, 1)],
        reward: &[(Animal::Rabbit, 6)],
    },
    ExchangeRule {
        kind: ExchangeKind::PigToSheep,
        cost: &[(Animal::Pig, 1)],
        reward: &[(Animal::Sheep, 2)],
    },
    ExchangeRule {
        kind: ExchangeKind::CowToPig,
        cost: &[(Animal::Cow, 1)],
        reward: &[(Animal::Pig, 3)],
    },
    ExchangeRule {
        kind: ExchangeKind::HorseToCow,
        cost: &[(Animal::Horse, 1)],
        reward: &[(Animal::Cow, 2)],
    },
    ExchangeRule {
        kind: ExchangeKind::SmallDogToSheep,
        cost: &[(Animal::SmallDog, 1)],
        reward: &[(Animal::Sheep, 1)],
    },
    ExchangeRule {
        kind: ExchangeKind::BigDogToCow,
        cost: &[(Animal::BigDog, 1)],
        reward: &[(Animal::Cow, 1)],
    },
];

/// Whether any rule in the table is affordable; decides if the exchange
/// phase is skipped for a turn.
pub fn can_make_any_exchange(herd: &Herd) -> bool {
    EXCHANGE_RULES.iter().any(|rule| rule.can_afford(herd))
}

pub fn is_winning_herd(herd: &Herd) -> bool {
    herd.has_each(&WINNING_SET)
}
