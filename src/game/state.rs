//! Table state, settings, events, and the snapshot contract.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use super::constants;
use super::entities::{
    AppliedAction, BlindLevel, Card, Chips, Deck, Phase, PlayerName, Seat, SeatIndex, SeatStatus,
};
use super::errors::EngineError;
use super::functional::HandValue;

/// Tunable parameters for a table. The defaults reproduce the standard
/// tournament structure: nine seats, 60k starting stacks, ten-minute
/// blind levels with antes from level three.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableSettings {
    pub max_seats: usize,
    pub starting_stack: Chips,
    pub blind_schedule: Vec<BlindLevel>,
    pub level_duration: Duration,
    pub max_rebuys: u8,
    pub action_timeout: Duration,
    pub liveness_timeout: Duration,
    pub next_hand_delay: Duration,
}

impl Default for TableSettings {
    fn default() -> Self {
        let blind_schedule = [
            (100, 200, 0),
            (200, 400, 0),
            (300, 600, 600),
            (400, 800, 800),
            (500, 1000, 1000),
            (1000, 2000, 2000),
            (2000, 4000, 4000),
            (5000, 10000, 10000),
        ]
        .into_iter()
        .map(|(small, big, ante)| BlindLevel { small, big, ante })
        .collect();
        Self {
            max_seats: constants::MAX_SEATS,
            starting_stack: constants::DEFAULT_STARTING_STACK,
            blind_schedule,
            level_duration: Duration::from_secs(constants::DEFAULT_LEVEL_SECS),
            max_rebuys: constants::MAX_REBUYS,
            action_timeout: Duration::from_secs(constants::DEFAULT_ACTION_TIMEOUT_SECS),
            liveness_timeout: Duration::from_secs(constants::DEFAULT_LIVENESS_TIMEOUT_SECS),
            next_hand_delay: Duration::from_secs(constants::DEFAULT_NEXT_HAND_DELAY_SECS),
        }
    }
}

/// Things that happened at the table, drained and logged by the actor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TableEvent {
    JoinedTable {
        name: PlayerName,
        seat_idx: SeatIndex,
    },
    HandStarted {
        hand: u64,
        level: usize,
        blinds: BlindLevel,
    },
    PostedBlind {
        name: PlayerName,
        amount: Chips,
    },
    PostedAnte {
        name: PlayerName,
        amount: Chips,
    },
    Acted {
        name: PlayerName,
        action: AppliedAction,
    },
    StreetDealt {
        phase: Phase,
        board: Vec<Card>,
    },
    WonPot {
        name: PlayerName,
        amount: Chips,
        /// None when everyone else folded and no hand was shown.
        hand: Option<HandValue>,
    },
    TimedOut {
        name: PlayerName,
    },
    Rebought {
        name: PlayerName,
        entry: u8,
    },
    Eliminated {
        name: PlayerName,
    },
    Vacated {
        name: PlayerName,
    },
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::JoinedTable { name, seat_idx } => {
                write!(f, "{name} took seat {seat_idx}")
            }
            Self::HandStarted {
                hand,
                level,
                blinds,
            } => {
                write!(f, "hand #{hand} started at level {level} ({blinds})")
            }
            Self::PostedBlind { name, amount } => write!(f, "{name} posted blind {amount}"),
            Self::PostedAnte { name, amount } => write!(f, "{name} posted ante {amount}"),
            Self::Acted { name, action } => write!(f, "{name} {action}"),
            Self::StreetDealt { phase, board } => {
                write!(f, "{phase} dealt, board:")?;
                for card in board {
                    write!(f, " {card}")?;
                }
                Ok(())
            }
            Self::WonPot { name, amount, hand } => match hand {
                Some(hand) => write!(f, "{name} won {amount} with {hand}"),
                None => write!(f, "{name} won {amount} uncontested"),
            },
            Self::TimedOut { name } => write!(f, "{name} timed out and was folded"),
            Self::Rebought { name, entry } => write!(f, "{name} rebought (entry {entry})"),
            Self::Eliminated { name } => write!(f, "{name} was eliminated"),
            Self::Vacated { name } => write!(f, "{name} left the table"),
        }
    }
}

/// The single authoritative state of one table. Only the owning actor
/// mutates it.
#[derive(Debug)]
pub struct TableState {
    pub seats: Vec<Seat>,
    pub phase: Phase,
    pub board: Vec<Card>,
    /// Chips swept from completed streets. Street bets still in front of
    /// seats are not included until the street closes.
    pub pot: Chips,
    /// Total street bet each live seat must match.
    pub current_bet: Chips,
    /// Smallest amount by which a raise must exceed `current_bet`.
    pub min_raise: Chips,
    pub turn_idx: Option<SeatIndex>,
    pub dealer_idx: SeatIndex,
    /// Index into the blind schedule, fixed at hand start.
    pub blind_level: usize,
    pub hand_counter: u64,
    pub(crate) deck: Deck,
    pub(crate) events: VecDeque<TableEvent>,
    pub(crate) settings: TableSettings,
    /// When the table clock started, i.e. when the first hand began.
    pub(crate) clock_start: Option<Instant>,
}

/// A schedule with no levels cannot post blinds; substitute the default
/// schedule instead of indexing into nothing later.
fn sanitize_settings(mut settings: TableSettings) -> TableSettings {
    if settings.blind_schedule.is_empty() {
        log::warn!("empty blind schedule, substituting the default");
        settings.blind_schedule = TableSettings::default().blind_schedule;
    }
    settings
}

impl TableState {
    #[must_use]
    pub fn new(settings: TableSettings) -> Self {
        let settings = sanitize_settings(settings);
        let seats = (0..settings.max_seats).map(|_| Seat::vacant()).collect();
        Self {
            seats,
            phase: Phase::Waiting,
            board: Vec::with_capacity(constants::BOARD_CARDS),
            pot: 0,
            current_bet: 0,
            min_raise: 0,
            turn_idx: None,
            dealer_idx: 0,
            blind_level: 0,
            hand_counter: 0,
            deck: Deck::default(),
            events: VecDeque::new(),
            settings,
            clock_start: None,
        }
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Seats the player at the first vacant position. Joiners start on
    /// standby and are dealt in from the next hand.
    pub fn join(&mut self, name: &str) -> Result<SeatIndex, EngineError> {
        let name = PlayerName::new(name);
        let Some(seat_idx) = self.seats.iter().position(|seat| !seat.is_occupied()) else {
            return Err(EngineError::SeatsFull);
        };
        let seat = &mut self.seats[seat_idx];
        *seat = Seat::vacant();
        seat.name = Some(name.clone());
        seat.stack = self.settings.starting_stack;
        seat.status = SeatStatus::Standby;
        self.push_event(TableEvent::JoinedTable { name, seat_idx });
        Ok(seat_idx)
    }

    /// Blinds for the current level.
    #[must_use]
    pub fn blinds(&self) -> BlindLevel {
        let idx = self
            .blind_level
            .min(self.settings.blind_schedule.len().saturating_sub(1));
        self.settings.blind_schedule[idx]
    }

    /// First seat clockwise from `from` matching the predicate, scanning
    /// all the way around (and so able to land back on `from`).
    pub(crate) fn next_seat<F>(&self, from: SeatIndex, pred: F) -> Option<SeatIndex>
    where
        F: Fn(&Seat) -> bool,
    {
        let n = self.seats.len();
        (1..=n)
            .map(|offset| (from + offset) % n)
            .find(|&idx| pred(&self.seats[idx]))
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_alive()).count()
    }

    /// Occupied seats with chips, i.e. seats a new hand can deal in.
    #[must_use]
    pub fn funded_count(&self) -> usize {
        self.seats
            .iter()
            .filter(|seat| seat.is_occupied() && seat.stack > 0)
            .count()
    }

    pub(crate) fn push_event(&mut self, event: TableEvent) {
        self.events.push_back(event);
    }

    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        self.events.drain(..).collect()
    }

    /// Moves all street bets into the pot at the end of a street.
    pub(crate) fn sweep_bets(&mut self) {
        for seat in &mut self.seats {
            self.pot += seat.bet;
            seat.bet = 0;
        }
    }

    /// Every chip at the table: stacks, street bets, and the pot. Constant
    /// across a hand except for rebuys.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        self.seats
            .iter()
            .map(|seat| seat.stack + seat.bet)
            .sum::<Chips>()
            + self.pot
    }

    /// Serializable snapshot of everything needed to resume the table.
    /// The deck is intentionally absent; restoring reshuffles the unseen
    /// cards.
    #[must_use]
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            seats: self.seats.clone(),
            phase: self.phase,
            board: self.board.clone(),
            pot: self.pot,
            current_bet: self.current_bet,
            min_raise: self.min_raise,
            turn_idx: self.turn_idx,
            dealer_idx: self.dealer_idx,
            blind_level: self.blind_level,
            hand_counter: self.hand_counter,
        }
    }

    /// Rebuilds a table from a snapshot. The deck is reshuffled from the
    /// cards not visible in the snapshot, and the level clock restarts at
    /// the restored level.
    #[must_use]
    pub fn from_snapshot(snapshot: TableSnapshot, settings: TableSettings) -> Self {
        let settings = sanitize_settings(settings);
        let mut seen: Vec<Card> = snapshot.board.clone();
        for seat in &snapshot.seats {
            seen.extend_from_slice(&seat.hole_cards);
        }
        Self {
            seats: snapshot.seats,
            phase: snapshot.phase,
            board: snapshot.board,
            pot: snapshot.pot,
            current_bet: snapshot.current_bet,
            min_raise: snapshot.min_raise,
            turn_idx: snapshot.turn_idx,
            dealer_idx: snapshot.dealer_idx,
            blind_level: snapshot.blind_level,
            hand_counter: snapshot.hand_counter,
            deck: Deck::shuffled_excluding(&seen),
            events: VecDeque::new(),
            settings,
            clock_start: None,
        }
    }
}

/// The persisted shape of a table. Hole cards are included; use
/// [`TableSnapshot::redacted_for`] before showing it to a player.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub seats: Vec<Seat>,
    pub phase: Phase,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub turn_idx: Option<SeatIndex>,
    pub dealer_idx: SeatIndex,
    pub blind_level: usize,
    pub hand_counter: u64,
}

impl TableSnapshot {
    /// Strips every hole card except the viewer's own.
    #[must_use]
    pub fn redacted_for(mut self, viewer: Option<SeatIndex>) -> Self {
        for (idx, seat) in self.seats.iter_mut().enumerate() {
            if Some(idx) != viewer {
                seat.hole_cards.clear();
            }
        }
        self
    }
}
