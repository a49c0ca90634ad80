//! Table actor implementation with async message handling.
//!
//! Each table runs as one task that owns its `TableState` outright. All
//! reads and writes flow through the inbox, so the engine core never
//! needs locks.

use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;

use super::config::TableConfig;
use super::messages::{TableId, TableMessage, TableRequestError};
use crate::game::entities::{Phase, PlayerAction, SeatIndex};
use crate::game::errors::EngineError;
use crate::game::state::{TableSnapshot, TableState};
use crate::game::timeout::TimeoutSupervisor;
use crate::game::{betting, lifecycle};

/// Table actor handle for sending messages
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    async fn send(&self, message: TableMessage) -> Result<(), TableRequestError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableRequestError::Closed)
    }

    /// Takes the first vacant seat and returns its index.
    pub async fn join_seat(&self, name: &str) -> Result<SeatIndex, TableRequestError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableMessage::JoinSeat {
            name: name.to_string(),
            respond_to,
        })
        .await?;
        let result = response.await.map_err(|_| TableRequestError::Closed)?;
        Ok(result?)
    }

    pub async fn submit_action(
        &self,
        seat_idx: SeatIndex,
        action: PlayerAction,
    ) -> Result<(), TableRequestError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableMessage::SubmitAction {
            seat_idx,
            action,
            respond_to,
        })
        .await?;
        let result = response.await.map_err(|_| TableRequestError::Closed)?;
        Ok(result?)
    }

    /// A view of the table with everyone else's hole cards redacted.
    pub async fn snapshot(
        &self,
        viewer: Option<SeatIndex>,
    ) -> Result<TableSnapshot, TableRequestError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableMessage::GetSnapshot { viewer, respond_to })
            .await?;
        response.await.map_err(|_| TableRequestError::Closed)
    }

    /// Drives the table clock from outside. Tests use this with
    /// synthetic instants instead of waiting on the interval.
    pub async fn tick(&self, now: Instant) -> Result<(), TableRequestError> {
        self.send(TableMessage::Tick { now }).await
    }

    pub async fn close(&self) -> Result<(), TableRequestError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableMessage::Close { respond_to }).await?;
        response.await.map_err(|_| TableRequestError::Closed)
    }
}

/// Table actor managing a single table
pub struct TableActor {
    id: TableId,
    config: TableConfig,
    state: TableState,
    supervisor: TimeoutSupervisor,
    inbox: mpsc::Receiver<TableMessage>,
    /// When the finished hand ended; the next one starts after the
    /// configured delay.
    game_over_since: Option<Instant>,
    is_closed: bool,
}

impl TableActor {
    pub fn new(id: TableId, config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let state = TableState::new(config.settings.clone());
        let supervisor = TimeoutSupervisor::new(&config.settings);
        let actor = Self {
            id,
            config,
            state,
            supervisor,
            inbox,
            game_over_since: None,
            is_closed: false,
        };
        let handle = TableHandle::new(sender, id);
        (actor, handle)
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table {} '{}' starting", self.id, self.config.name);

        let mut tick_interval = interval(self.config.tick_interval);

        loop {
            tokio::select! {
                Some(message) = self.inbox.recv() => {
                    self.handle_message(message);
                    if self.is_closed {
                        break;
                    }
                }

                _ = tick_interval.tick() => {
                    self.tick(Instant::now());
                }
            }
        }

        log::info!("Table {} '{}' closed", self.id, self.config.name);
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::JoinSeat { name, respond_to } => {
                let result = self.state.join(&name);
                if let Ok(seat_idx) = &result {
                    self.supervisor.note_activity(*seat_idx, Instant::now());
                }
                let _ = respond_to.send(result);
            }

            TableMessage::SubmitAction {
                seat_idx,
                action,
                respond_to,
            } => {
                let result = self.handle_action(seat_idx, action);
                let _ = respond_to.send(result);
            }

            TableMessage::GetSnapshot { viewer, respond_to } => {
                if let Some(seat_idx) = viewer {
                    self.supervisor.note_activity(seat_idx, Instant::now());
                }
                let _ = respond_to.send(self.state.snapshot().redacted_for(viewer));
            }

            TableMessage::Tick { now } => {
                self.tick(now);
            }

            TableMessage::Close { respond_to } => {
                self.is_closed = true;
                let _ = respond_to.send(());
            }
        }

        self.drain_events();
    }

    fn handle_action(
        &mut self,
        seat_idx: SeatIndex,
        action: PlayerAction,
    ) -> Result<(), EngineError> {
        let now = Instant::now();
        betting::apply_action(&mut self.state, seat_idx, action)?;
        self.supervisor.note_activity(seat_idx, now);
        lifecycle::progress(&mut self.state)?;
        self.supervisor.watch_turn(&self.state, now);
        Ok(())
    }

    /// Advance game state (called periodically)
    fn tick(&mut self, now: Instant) {
        // Liveness expiry is tracked in every phase; a silent seat at a
        // waiting table still has to give its seat up.
        if let Err(err) = self.supervisor.tick(&mut self.state, now) {
            log::error!("table {}: tick failed: {err}", self.id);
        }

        match self.state.phase {
            Phase::Waiting => {
                self.try_start_hand(now);
            }

            Phase::GameOver => {
                let since = *self.game_over_since.get_or_insert(now);
                if now.duration_since(since) >= self.state.settings().next_hand_delay {
                    self.try_start_hand(now);
                }
            }

            _ => {}
        }

        self.drain_events();
    }

    fn try_start_hand(&mut self, now: Instant) {
        // Silent players give their seats up only between hands.
        self.supervisor.apply_pending_vacancies(&mut self.state);
        self.game_over_since = None;
        match lifecycle::try_start_hand(&mut self.state, now) {
            Ok(true) => self.supervisor.watch_turn(&self.state, now),
            Ok(false) => {}
            Err(err) => log::error!("table {}: failed to start hand: {err}", self.id),
        }
    }

    fn drain_events(&mut self) {
        for event in self.state.drain_events() {
            log::info!("table {}: {event}", self.id);
        }
    }
}
