//! Async table actors: one task per table, one inbox per task. The
//! handle is the only way in, which makes the engine single-writer.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use manager::TableManager;
pub use messages::{TableId, TableMessage, TableRequestError};
