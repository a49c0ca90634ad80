//! Turn and liveness timers. The supervisor never owns the clock; the
//! actor feeds it monotonic instants on every tick, which keeps forced
//! folds deterministic under test.

use std::time::{Duration, Instant};

use super::betting;
use super::errors::EngineError;
use super::lifecycle;
use super::state::{TableEvent, TableSettings, TableState};

#[derive(Debug)]
pub struct TimeoutSupervisor {
    action_timeout: Duration,
    liveness_timeout: Duration,
    /// The seat currently on the clock and its deadline.
    armed: Option<(usize, Instant)>,
    /// Last time each seat was heard from.
    last_seen: Vec<Option<Instant>>,
    /// Seats to vacate at the next hand boundary.
    pending_vacate: Vec<bool>,
}

impl TimeoutSupervisor {
    #[must_use]
    pub fn new(settings: &TableSettings) -> Self {
        Self {
            action_timeout: settings.action_timeout,
            liveness_timeout: settings.liveness_timeout,
            armed: None,
            last_seen: vec![None; settings.max_seats],
            pending_vacate: vec![false; settings.max_seats],
        }
    }

    /// Records that the player in `seat_idx` did something (joined,
    /// acted, asked for a view). Resets their liveness window.
    pub fn note_activity(&mut self, seat_idx: usize, now: Instant) {
        if let Some(slot) = self.last_seen.get_mut(seat_idx) {
            *slot = Some(now);
        }
    }

    /// Re-arms the action clock whenever the turn moves to a new seat,
    /// and clears it when no one is on the clock.
    pub fn watch_turn(&mut self, state: &TableState, now: Instant) {
        match state.turn_idx {
            Some(seat_idx) => {
                let stale = match self.armed {
                    Some((armed_idx, _)) => armed_idx != seat_idx,
                    None => true,
                };
                if stale {
                    self.armed = Some((seat_idx, now + self.action_timeout));
                }
            }
            None => self.armed = None,
        }
    }

    /// Fires expired timers. Disarming happens before the fold is
    /// applied, so a repeated tick over the same deadline folds at most
    /// once.
    pub fn tick(&mut self, state: &mut TableState, now: Instant) -> Result<(), EngineError> {
        if let Some((seat_idx, deadline)) = self.armed
            && now >= deadline
        {
            self.armed = None;
            if state.turn_idx == Some(seat_idx) && betting::force_fold(state, seat_idx) {
                if let Some(name) = state.seats[seat_idx].name.clone() {
                    log::warn!("seat {seat_idx} ({name}) ran out the action clock");
                    state.push_event(TableEvent::TimedOut { name });
                }
                lifecycle::progress(state)?;
            }
        }

        for seat_idx in 0..state.seats.len() {
            if self.pending_vacate[seat_idx] {
                continue;
            }
            let Some(seen) = self.last_seen[seat_idx] else {
                continue;
            };
            if !state.seats[seat_idx].is_occupied() {
                self.last_seen[seat_idx] = None;
                continue;
            }
            if now.duration_since(seen) >= self.liveness_timeout {
                self.pending_vacate[seat_idx] = true;
                if betting::force_fold(state, seat_idx) {
                    if let Some(name) = state.seats[seat_idx].name.clone() {
                        state.push_event(TableEvent::TimedOut { name });
                    }
                    lifecycle::progress(state)?;
                }
            }
        }

        self.watch_turn(state, now);
        Ok(())
    }

    /// Removes seats whose players went silent. Must only run between
    /// hands; mid-hand the seat stays (folded) so pots settle cleanly.
    pub fn apply_pending_vacancies(&mut self, state: &mut TableState) {
        for seat_idx in 0..state.seats.len() {
            if !self.pending_vacate[seat_idx] {
                continue;
            }
            self.pending_vacate[seat_idx] = false;
            self.last_seen[seat_idx] = None;
            let name = state.seats[seat_idx].name.clone();
            state.seats[seat_idx].vacate();
            if let Some(name) = name {
                state.push_event(TableEvent::Vacated { name });
            }
        }
    }
}
