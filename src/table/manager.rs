//! Registry of running table actors.

use std::collections::HashMap;
use std::time::Instant;

use super::actor::{TableActor, TableHandle};
use super::config::TableConfig;
use super::messages::{TableId, TableRequestError};
use crate::game::entities::{PlayerAction, SeatIndex};
use crate::game::state::TableSnapshot;

/// Owns the handles for every live table and routes requests by id.
#[derive(Default)]
pub struct TableManager {
    tables: HashMap<TableId, TableHandle>,
    next_id: TableId,
}

impl TableManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the config, spawns the actor, and returns the new id.
    pub fn create_table(&mut self, config: TableConfig) -> Result<TableId, String> {
        config.validate()?;
        let id = self.next_id;
        self.next_id += 1;
        let (actor, handle) = TableActor::new(id, config);
        tokio::spawn(actor.run());
        self.tables.insert(id, handle);
        Ok(id)
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn handle(&self, table_id: TableId) -> Result<&TableHandle, TableRequestError> {
        self.tables
            .get(&table_id)
            .ok_or(TableRequestError::UnknownTable(table_id))
    }

    pub async fn join_seat(
        &self,
        table_id: TableId,
        name: &str,
    ) -> Result<SeatIndex, TableRequestError> {
        self.handle(table_id)?.join_seat(name).await
    }

    pub async fn submit_action(
        &self,
        table_id: TableId,
        seat_idx: SeatIndex,
        action: PlayerAction,
    ) -> Result<(), TableRequestError> {
        self.handle(table_id)?.submit_action(seat_idx, action).await
    }

    pub async fn snapshot(
        &self,
        table_id: TableId,
        viewer: Option<SeatIndex>,
    ) -> Result<TableSnapshot, TableRequestError> {
        self.handle(table_id)?.snapshot(viewer).await
    }

    pub async fn tick(&self, table_id: TableId, now: Instant) -> Result<(), TableRequestError> {
        self.handle(table_id)?.tick(now).await
    }

    /// Shuts the actor down and drops the handle.
    pub async fn close_table(&mut self, table_id: TableId) -> Result<(), TableRequestError> {
        let handle = self
            .tables
            .remove(&table_id)
            .ok_or(TableRequestError::UnknownTable(table_id))?;
        handle.close().await
    }
}
