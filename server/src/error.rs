use superfarmer_protocol::{Animal, ServerToClient};
use thiserror::Error;

/// Why an action was rejected. The display text is what the actor sees;
/// a rejected action never mutates the room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Game already in progress. Cannot join.")]
    JoinAfterStart,
    #[error("Name cannot be empty.")]
    EmptyName,
    #[error("Game already started.")]
    AlreadyStarted,
    #[error("Need at least 2 players to start the game.")]
    NotEnoughPlayers,
    #[error("You are not seated in this game.")]
    NotSeated,
    #[error("Not your turn or wrong phase for exchange.")]
    NotYourExchange,
    #[error("Not your turn or wrong phase to finish exchange.")]
    NotYourFinish,
    #[error("Not your turn or wrong phase to roll dice.")]
    NotYourRoll,
    #[error("Maximum exchanges used this turn.")]
    ExchangeLimit,
    #[error("Invalid exchange type.")]
    UnknownExchange,
    #[error("Not enough {0} for this exchange.")]
    PlayerShort(Animal),
    #[error("Must keep at least 1 rabbit after exchange.")]
    RabbitFloor,
    #[error("Bank does not have enough {0}.")]
    BankShort(Animal),
}

impl ActionError {
    /// Rejections reach the actor as a plain message, not as `Error`.
    pub fn to_client(&self) -> ServerToClient {
        ServerToClient::Message {
            text: self.to_string(),
        }
    }
}
