use std::time::Instant;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::game::entities::{PlayerAction, SeatIndex};
use crate::game::errors::EngineError;
use crate::game::state::TableSnapshot;

pub type TableId = u32;

/// Messages a table actor accepts on its inbox.
#[derive(Debug)]
pub enum TableMessage {
    JoinSeat {
        name: String,
        respond_to: oneshot::Sender<Result<SeatIndex, EngineError>>,
    },
    SubmitAction {
        seat_idx: SeatIndex,
        action: PlayerAction,
        respond_to: oneshot::Sender<Result<(), EngineError>>,
    },
    GetSnapshot {
        /// Seat whose hole cards stay visible; `None` redacts everything.
        viewer: Option<SeatIndex>,
        respond_to: oneshot::Sender<TableSnapshot>,
    },
    /// Injected time for deterministic tests; the actor normally ticks
    /// itself from its interval.
    Tick {
        now: Instant,
    },
    Close {
        respond_to: oneshot::Sender<()>,
    },
}

/// Failures when talking to a table through its handle.
#[derive(Debug, Error)]
pub enum TableRequestError {
    #[error("the table has shut down")]
    Closed,
    #[error("no table with id {0}")]
    UnknownTable(TableId),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
