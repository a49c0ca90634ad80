//! The table engine core: cards, betting, pots, hand lifecycle, and the
//! timers that keep a hand moving. Everything here is synchronous and
//! single-threaded; the `table` module wraps it in an actor.

pub mod betting;
pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod lifecycle;
pub mod pot;
pub mod state;
pub mod timeout;

pub use betting::{advance_turn, apply_action, force_fold, street_closed};
pub use errors::{ActionError, EngineError};
pub use lifecycle::{progress, try_start_hand};
pub use state::{TableEvent, TableSettings, TableSnapshot, TableState};
pub use timeout::TimeoutSupervisor;
