//! Per-room game state and the action handlers that mutate it.
//!
//! Handlers never talk to sockets. Each returns the envelopes that must go
//! out, in order, and the room store delivers them while it still holds the
//! room's lock.

use crate::config::MAX_NAME_LEN;
use crate::error::ActionError;
use std::collections::HashMap;
use superfarmer_protocol::*;
use tracing::{info, warn};
use uuid::Uuid;

/// Where an outbound message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every member of the room at the time the message was produced.
    Room(Vec<Uuid>),
    Player(Uuid),
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub to: Audience,
    pub msg: ServerToClient,
}

/// Source of dice throws, swapped for a scripted one in tests.
pub trait DiceSource: Send + Sync {
    fn throw(&self) -> DiceRoll;
}

pub struct RandomDice;

impl DiceSource for RandomDice {
    fn throw(&self) -> DiceRoll {
        DiceRoll::throw(&mut rand::thread_rng())
    }
}

/// One inbound action, already bound to its actor and room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join { name: String },
    Start,
    Exchange { exchange_type: String },
    FinishExchange,
    RollDice,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub animals: Herd,
    pub exchanges_used: u32,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub id: String,
    pub bank: Herd,
    pub players: HashMap<Uuid, Player>,
    // join order
    pub turn_order: Vec<Uuid>,
    pub phase: Phase,
    pub started: bool,
    pub current_turn_index: usize,
    pub last_dice: Option<DiceRoll>,
}

/// Trims a requested display name and caps its length.
pub fn display_name(raw: &str) -> Result<String, ActionError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ActionError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        warn!(len = name.chars().count(), "display name too long; truncating");
        return Ok(name.chars().take(MAX_NAME_LEN).collect());
    }
    Ok(name.to_string())
}

impl Game {
    pub fn new(id: impl Into<String>) -> Self {
        Game {
            id: id.into(),
            bank: STARTING_BANK,
            players: HashMap::new(),
            turn_order: Vec::new(),
            phase: Phase::Waiting,
            started: false,
            current_turn_index: 0,
            last_dice: None,
        }
    }

    pub fn apply(
        &mut self,
        actor: Uuid,
        cmd: Command,
        dice: &dyn DiceSource,
    ) -> Result<Vec<Envelope>, ActionError> {
        match cmd {
            Command::Join { name } => self.join(actor, &name),
            Command::Start => self.start(actor),
            Command::Exchange { exchange_type } => self.exchange(actor, &exchange_type),
            Command::FinishExchange => self.finish_exchange(actor),
            Command::RollDice => self.roll_dice(actor, dice),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.turn_order.is_empty()
    }

    pub fn current_player_id(&self) -> Option<Uuid> {
        self.turn_order.get(self.current_turn_index).copied()
    }

    fn is_turn_of(&self, actor: Uuid, phase: Phase) -> bool {
        self.phase == phase && self.current_player_id() == Some(actor)
    }

    /* ---------------- join / start ---------------- */

    pub fn join(&mut self, actor: Uuid, name: &str) -> Result<Vec<Envelope>, ActionError> {
        if self.started {
            return Err(ActionError::JoinAfterStart);
        }
        let name = display_name(name)?;

        self.players.insert(
            actor,
            Player {
                id: actor,
                name: name.clone(),
                animals: Herd::default(),
                exchanges_used: 0,
            },
        );
        if !self.turn_order.contains(&actor) {
            self.turn_order.push(actor);
        }
        info!(room = %self.id, player = %name, seats = self.turn_order.len(), "player joined");

        let mut out = Vec::new();
        self.broadcast_message(&mut out, format!("{name} joined the game."));
        self.broadcast_state(&mut out);
        Ok(out)
    }

    pub fn start(&mut self, actor: Uuid) -> Result<Vec<Envelope>, ActionError> {
        if self.started {
            return Err(ActionError::AlreadyStarted);
        }
        if self.turn_order.len() < 2 {
            return Err(ActionError::NotEnoughPlayers);
        }
        if !self.players.contains_key(&actor) {
            return Err(ActionError::NotSeated);
        }
        let seats = self.turn_order.len() as u32;
        if self.bank[Animal::Rabbit] < seats {
            return Err(ActionError::BankShort(Animal::Rabbit));
        }

        self.started = true;
        for id in &self.turn_order {
            if let Some(p) = self.players.get_mut(id) {
                p.animals[Animal::Rabbit] += 1;
                self.bank[Animal::Rabbit] -= 1;
            }
        }
        self.current_turn_index = 0;
        let opening = self.open_turn().unwrap_or_default();
        info!(room = %self.id, seats, phase = %self.phase, "game started");

        let mut out = Vec::new();
        self.broadcast_message(
            &mut out,
            format!("Game has started! Each player received 1 rabbit.\n{opening}"),
        );
        self.broadcast_state(&mut out);
        Ok(out)
    }

    /* ---------------- exchange phase ---------------- */

    pub fn exchange(&mut self, actor: Uuid, exchange_type: &str) -> Result<Vec<Envelope>, ActionError> {
        if !self.is_turn_of(actor, Phase::Exchange) {
            return Err(ActionError::NotYourExchange);
        }
        let Some(player) = self.players.get_mut(&actor) else {
            return Err(ActionError::NotYourExchange);
        };
        if player.exchanges_used >= MAX_EXCHANGES_PER_TURN {
            return Err(ActionError::ExchangeLimit);
        }
        let kind: ExchangeKind = exchange_type
            .parse()
            .map_err(|_| ActionError::UnknownExchange)?;
        let rule = kind.rule();

        for &(animal, qty) in rule.cost {
            let held = player.animals[animal];
            if held < qty {
                return Err(ActionError::PlayerShort(animal));
            }
            if animal == Animal::Rabbit && held - qty < 1 {
                return Err(ActionError::RabbitFloor);
            }
        }
        for &(animal, qty) in rule.reward {
            if self.bank[animal] < qty {
                return Err(ActionError::BankShort(animal));
            }
        }

        // cost first, then reward
        for &(animal, qty) in rule.cost {
            player.animals[animal] -= qty;
            self.bank[animal] += qty;
        }
        for &(animal, qty) in rule.reward {
            self.bank[animal] -= qty;
            player.animals[animal] += qty;
        }
        player.exchanges_used += 1;

        let mut out = Vec::new();
        self.broadcast_state(&mut out);
        send_to(&mut out, actor, format!("Exchange completed: {kind}."));
        Ok(out)
    }

    pub fn finish_exchange(&mut self, actor: Uuid) -> Result<Vec<Envelope>, ActionError> {
        if !self.is_turn_of(actor, Phase::Exchange) {
            return Err(ActionError::NotYourFinish);
        }
        self.phase = Phase::Roll;

        let mut out = Vec::new();
        self.broadcast_state(&mut out);
        send_to(&mut out, actor, "Exchange phase finished. Please roll the dice.");
        Ok(out)
    }

    /* ---------------- roll phase ---------------- */

    /// Throws only once the actor is known to hold the roll; a rejected roll
    /// leaves the dice source untouched.
    pub fn roll_dice(&mut self, actor: Uuid, dice: &dyn DiceSource) -> Result<Vec<Envelope>, ActionError> {
        if !self.is_turn_of(actor, Phase::Roll) {
            return Err(ActionError::NotYourRoll);
        }
        self.resolve_roll(actor, dice.throw())
    }

    /// Resolves one throw for the current player: predators first, pair
    /// collection only when neither predator showed.
    pub fn resolve_roll(&mut self, actor: Uuid, roll: DiceRoll) -> Result<Vec<Envelope>, ActionError> {
        if !self.is_turn_of(actor, Phase::Roll) {
            return Err(ActionError::NotYourRoll);
        }
        let Some(player) = self.players.get_mut(&actor) else {
            return Err(ActionError::NotYourRoll);
        };

        self.last_dice = Some(roll);
        let mut summary = vec![format!("{} rolled: {} & {}", player.name, roll.red, roll.blue)];

        if roll.wolf() {
            summary.push(wolf_attack(&mut self.bank, &mut player.animals, roll.fox()));
        }
        if roll.fox() {
            summary.push(fox_attack(&mut self.bank, &mut player.animals));
        }
        if !roll.wolf() && !roll.fox() {
            collect_pairs(&mut self.bank, &mut player.animals, roll, &mut summary);
        }

        self.phase = Phase::EndTurn;
        let name = player.name.clone();
        let won = is_winning_herd(&player.animals);
        if won {
            summary.push(format!(
                "{name} has at least one of each main animal. {name} wins!"
            ));
            self.phase = Phase::GameOver;
            info!(room = %self.id, winner = %name, "game over");
        } else {
            summary.push(format!("{name}'s turn is over."));
        }

        let mut out = Vec::new();
        self.broadcast_message(&mut out, summary.join("\n"));
        self.broadcast_state(&mut out);
        if !won {
            self.next_turn(&mut out);
        }
        Ok(out)
    }

    /// Passes the turn to the next seat in join order.
    pub fn next_turn(&mut self, out: &mut Vec<Envelope>) {
        if self.turn_order.is_empty() {
            return;
        }
        self.current_turn_index = (self.current_turn_index + 1) % self.turn_order.len();
        if let Some(line) = self.open_turn() {
            self.broadcast_message(out, line);
        }
        self.broadcast_state(out);
    }

    /// Resets the current player's exchange counter and opens their turn in
    /// `Exchange`, or straight in `Roll` when no rule is affordable.
    fn open_turn(&mut self) -> Option<String> {
        let id = self.current_player_id()?;
        let player = self.players.get_mut(&id)?;
        player.exchanges_used = 0;
        if can_make_any_exchange(&player.animals) {
            self.phase = Phase::Exchange;
            Some(format!("It is now {}'s turn (Exchange phase).", player.name))
        } else {
            self.phase = Phase::Roll;
            Some(format!(
                "{}'s turn (Exchange phase skipped - no possible exchanges).",
                player.name
            ))
        }
    }

    /* ---------------- departures ---------------- */

    /// Drops a seat. Returns `None` when `id` was not a member.
    ///
    /// The departing herd goes back to the bank. When the current seat
    /// leaves, the index only wraps; the new current player's turn is not
    /// reopened.
    pub fn remove_player(&mut self, id: Uuid) -> Option<Vec<Envelope>> {
        let player = self.players.remove(&id)?;
        if let Some(pos) = self.turn_order.iter().position(|p| *p == id) {
            self.turn_order.remove(pos);
            if pos < self.current_turn_index {
                self.current_turn_index -= 1;
            }
            if self.current_turn_index >= self.turn_order.len() {
                self.current_turn_index = 0;
            }
        }
        for (animal, count) in player.animals.iter() {
            self.bank[animal] += count;
        }
        info!(room = %self.id, player = %player.name, seats = self.turn_order.len(), "player left");

        let mut out = Vec::new();
        if !self.is_empty() {
            self.broadcast_message(&mut out, format!("{} left the game.", player.name));
            self.broadcast_state(&mut out);
        }
        Some(out)
    }

    /* ---------------- public snapshot ---------------- */

    pub fn snapshot(&self) -> PublicGame {
        PublicGame {
            game_id: self.id.clone(),
            bank: self.bank,
            players: self
                .turn_order
                .iter()
                .filter_map(|id| self.players.get(id))
                .map(|p| PublicPlayer {
                    id: p.id,
                    name: p.name.clone(),
                    animals: p.animals,
                    exchanges_used: p.exchanges_used,
                })
                .collect(),
            turn_order: self.turn_order.clone(),
            current_turn: self.current_player_id(),
            phase: self.phase,
            started: self.started,
            last_dice: self.last_dice,
        }
    }

    pub fn summary(&self) -> RoomSummary {
        let name_of = |id: &Uuid| self.players.get(id).map(|p| p.name.clone());
        RoomSummary {
            room_id: self.id.clone(),
            players: self.turn_order.iter().filter_map(name_of).collect(),
            started: self.started,
            phase: self.phase,
            current_turn: self.current_player_id().as_ref().and_then(name_of),
        }
    }

    fn broadcast_state(&self, out: &mut Vec<Envelope>) {
        out.push(Envelope {
            to: Audience::Room(self.turn_order.clone()),
            msg: ServerToClient::GameState {
                snapshot: self.snapshot(),
            },
        });
    }

    fn broadcast_message(&self, out: &mut Vec<Envelope>, text: impl Into<String>) {
        out.push(Envelope {
            to: Audience::Room(self.turn_order.clone()),
            msg: ServerToClient::Message { text: text.into() },
        });
    }
}

fn send_to(out: &mut Vec<Envelope>, id: Uuid, text: impl Into<String>) {
    out.push(Envelope {
        to: Audience::Player(id),
        msg: ServerToClient::Message { text: text.into() },
    });
}

/* ---------------- predators & pairs ---------------- */

fn wolf_attack(bank: &mut Herd, herd: &mut Herd, with_fox: bool) -> String {
    if herd[Animal::BigDog] > 0 {
        herd[Animal::BigDog] -= 1;
        bank[Animal::BigDog] += 1;
        let guarded = if with_fox { "your animals" } else { "you" };
        return format!("Wolf attacked! Big Dog protected {guarded} but was lost.");
    }
    for animal in [Animal::Cow, Animal::Sheep, Animal::Pig] {
        bank[animal] += herd[animal];
        herd[animal] = 0;
    }
    "Wolf attacked! You lost all cows, sheep, and pigs.".to_string()
}

fn fox_attack(bank: &mut Herd, herd: &mut Herd) -> String {
    if herd[Animal::SmallDog] > 0 {
        herd[Animal::SmallDog] -= 1;
        bank[Animal::SmallDog] += 1;
        return "Fox attacked! Small Dog protected your rabbits but was lost.".to_string();
    }
    if herd[Animal::Rabbit] > 1 {
        let lost = herd[Animal::Rabbit] - 1;
        bank[Animal::Rabbit] += lost;
        herd[Animal::Rabbit] = 1;
        "Fox attacked! You lost all rabbits except one.".to_string()
    } else {
        "Fox attacked! You only had one rabbit, so it remains.".to_string()
    }
}

/// Pays out one animal per complete pair of (held + rolled), capped by the
/// bank. Rolled faces are never added themselves.
fn collect_pairs(bank: &mut Herd, herd: &mut Herd, roll: DiceRoll, summary: &mut Vec<String>) {
    let mut shown = false;
    for animal in Animal::MAIN {
        let rolled = roll.count(animal);
        if rolled == 0 {
            continue;
        }
        shown = true;
        let pairs = (herd[animal] + rolled) / 2;
        if pairs == 0 {
            continue;
        }
        let gain = pairs.min(bank[animal]);
        if gain > 0 {
            bank[animal] -= gain;
            herd[animal] += gain;
            let plural = if gain > 1 { "s" } else { "" };
            summary.push(format!(
                "Received {gain} {animal}{plural} from the bank ({pairs} pairs total)."
            ));
        } else {
            summary.push(format!("Had {pairs} pairs of {animal} but bank has none left."));
        }
    }
    // only reachable with no animal face showing
    if !shown {
        summary.push("No animals gained this turn.".to_string());
    }
}
