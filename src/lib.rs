//! A nine-seat no-limit Texas Hold'em table engine.
//!
//! The crate splits into two layers:
//!
//! - [`game`]: the synchronous core. Cards and the deck, the betting
//!   state machine, layered side pots, the hand lifecycle, and the
//!   timeout supervisor, all operating on one [`game::TableState`].
//! - [`table`]: the async shell. Each table is an actor task that owns
//!   its state; players talk to it through a [`table::TableHandle`] and
//!   a [`table::TableManager`] routes requests by table id.
//!
//! Chips are conserved by construction: bets move from stacks to street
//! bets, street bets sweep into the pot, and settlement pays the pot
//! back out, with any undistributable remainder surfaced instead of
//! invented away.

pub mod game;
pub mod table;

pub use game::entities::{
    AppliedAction, BlindLevel, Card, Chips, Deck, Phase, PlayerAction, PlayerName, Rank, Seat,
    SeatIndex, SeatRole, SeatStatus, Suit,
};
pub use game::errors::{ActionError, EngineError};
pub use game::functional::{HandCategory, HandValue, evaluate, winners};
pub use game::state::{TableEvent, TableSettings, TableSnapshot, TableState};
pub use game::timeout::TimeoutSupervisor;
pub use table::{TableConfig, TableHandle, TableId, TableManager, TableRequestError};
