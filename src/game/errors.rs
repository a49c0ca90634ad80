use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Chips;

/// Rejections for a submitted player action. The table state is left
/// untouched whenever one of these is returned.
#[derive(Clone, Debug, Deserialize, Error, Eq, PartialEq, Serialize)]
pub enum ActionError {
    #[error("it is not your turn to act")]
    OutOfTurn,
    #[error("you are not in the hand")]
    NotInHand,
    #[error("raise to {target} does not exceed the current bet of {current}")]
    RaiseBelowCall { target: Chips, current: Chips },
    #[error("raise to {target} is below the minimum of {minimum}")]
    RaiseBelowMinimum { target: Chips, minimum: Chips },
    #[error("raise to {target} exceeds your remaining {stack} chips")]
    RaiseExceedsStack { target: Chips, stack: Chips },
}

#[derive(Clone, Debug, Deserialize, Error, Eq, PartialEq, Serialize)]
pub enum EngineError {
    #[error("the deck ran out of cards")]
    DeckExhausted,
    #[error("all seats are taken")]
    SeatsFull,
    #[error("not enough funded seats to start a hand")]
    InsufficientSeats,
    #[error(transparent)]
    Action(#[from] ActionError),
}
