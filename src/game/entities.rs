use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants;
use super::errors::EngineError;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Card rank, 2..=14. The ace is always 14; the evaluator handles the
/// wheel straight without a dual-valued ace.
pub type Rank = u8;

pub const ACE: Rank = 14;

/// Short symbol for a rank ("A", "K", ..., "2").
pub fn rank_symbol(rank: Rank) -> String {
    match rank {
        14 => "A".to_string(),
        13 => "K".to_string(),
        12 => "Q".to_string(),
        11 => "J".to_string(),
        r => r.to_string(),
    }
}

/// A card is a tuple of a rank (2..=14, ace high) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Rank, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = format!("{}{}", rank_symbol(self.0), self.1);
        write!(f, "{repr:>3}")
    }
}

fn fresh_cards() -> Vec<Card> {
    let mut cards = Vec::with_capacity(constants::DECK_SIZE);
    for rank in 2..=ACE {
        for suit in Suit::ALL {
            cards.push(Card(rank, suit));
        }
    }
    cards
}

/// An ordered, consumable sequence of distinct cards. A fresh deck is
/// built and shuffled for every hand.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            cards: fresh_cards(),
            next: 0,
        }
    }
}

impl Deck {
    /// All 52 cards in a uniformly random order (Fisher-Yates).
    #[must_use]
    pub fn shuffled() -> Self {
        let mut deck = Self::default();
        deck.cards.shuffle(&mut rand::rng());
        deck
    }

    /// A shuffled deck with the given cards removed. Used when restoring
    /// a table from a snapshot so already-visible cards can't be redealt.
    #[must_use]
    pub fn shuffled_excluding(exclude: &[Card]) -> Self {
        let mut cards = fresh_cards();
        cards.retain(|card| !exclude.contains(card));
        cards.shuffle(&mut rand::rng());
        Self { cards, next: 0 }
    }

    /// Removes and returns `n` cards from the front of the deck.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, EngineError> {
        if self.remaining() < n {
            return Err(EngineError::DeckExhausted);
        }
        let cards = self.cards[self.next..self.next + n].to_vec();
        self.next += n;
        Ok(cards)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

/// Type alias for whole chips. All bets and stacks are whole chips.
pub type Chips = u32;

/// Type alias for seat positions at the table.
pub type SeatIndex = usize;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Where a seat stands in the current hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SeatStatus {
    /// Nobody sits here.
    Vacant,
    /// Seated but not contesting the current hand.
    Standby,
    /// Contesting the hand. All-in seats stay alive with stack 0.
    Alive,
    /// Forfeited the hand.
    Folded,
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Vacant => "vacant",
            Self::Standby => "standby",
            Self::Alive => "alive",
            Self::Folded => "folded",
        };
        write!(f, "{repr}")
    }
}

/// Per-hand role. Roles are cleared and reassigned every hand; heads-up
/// merges the dealer and small blind onto one seat.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum SeatRole {
    #[default]
    None,
    Dealer,
    SmallBlind,
    BigBlind,
    DealerSmallBlind,
}

impl fmt::Display for SeatRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::None => "",
            Self::Dealer => "D",
            Self::SmallBlind => "SB",
            Self::BigBlind => "BB",
            Self::DealerSmallBlind => "D/SB",
        };
        write!(f, "{repr}")
    }
}

/// One of nine positions at the table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seat {
    pub name: Option<PlayerName>,
    pub stack: Chips,
    pub hole_cards: Vec<Card>,
    /// Chips committed on the current street.
    pub bet: Chips,
    /// Total chips committed this hand, across all streets and antes.
    pub contribution: Chips,
    pub status: SeatStatus,
    pub role: SeatRole,
    pub has_acted: bool,
    /// Entries consumed beyond the initial buy-in.
    pub entries_used: u8,
}

impl Seat {
    #[must_use]
    pub fn vacant() -> Self {
        Self {
            name: None,
            stack: 0,
            hole_cards: Vec::with_capacity(constants::HOLE_CARDS),
            bet: 0,
            contribution: 0,
            status: SeatStatus::Vacant,
            role: SeatRole::None,
            has_acted: false,
            entries_used: 0,
        }
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.name.is_some()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.status == SeatStatus::Alive
    }

    /// Alive with chips behind, i.e. still owed a turn.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.is_alive() && self.stack > 0
    }

    /// Moves up to `amount` from the stack into the street bet, capped at
    /// the stack. Returns the amount actually paid.
    pub fn pay(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.bet += paid;
        self.contribution += paid;
        paid
    }

    /// Clears the transient per-hand fields and recomputes the status for
    /// a fresh hand.
    pub fn reset_for_hand(&mut self) {
        self.hole_cards.clear();
        self.bet = 0;
        self.contribution = 0;
        self.role = SeatRole::None;
        self.has_acted = false;
        self.status = if self.name.is_none() {
            SeatStatus::Vacant
        } else if self.stack > 0 {
            SeatStatus::Alive
        } else {
            SeatStatus::Standby
        };
    }

    /// Recycles the seat for a new occupant.
    pub fn vacate(&mut self) {
        *self = Self::vacant();
    }
}

/// An intent submitted by a player (or forced by the supervisor).
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlayerAction {
    Fold,
    /// Checks when nothing is owed, otherwise calls (capped at the stack).
    CheckOrCall,
    /// Raises so the seat's total street bet becomes the given amount.
    RaiseTo(Chips),
    /// Shorthand for raising to `bet + stack`, or calling for the whole
    /// stack when that doesn't exceed the bet to match.
    AllIn,
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "fold".to_string(),
            Self::CheckOrCall => "check/call".to_string(),
            Self::RaiseTo(amount) => format!("raise to {amount}"),
            Self::AllIn => "all-in".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// What an accepted action turned out to be once chips moved.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppliedAction {
    Fold,
    Check,
    Call(Chips),
    /// Raise to this total street bet.
    Raise(Chips),
    /// All-in for this total street bet.
    AllIn(Chips),
}

impl fmt::Display for AppliedAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds".to_string(),
            Self::Check => "checks".to_string(),
            Self::Call(amount) => format!("calls {amount}"),
            Self::Raise(target) => format!("raises to {target}"),
            Self::AllIn(target) => format!("goes all-in for {target}"),
        };
        write!(f, "{repr}")
    }
}

/// Hand lifecycle phase. Phases only ever advance; GameOver loops back to
/// Preflop through an explicit next-hand start.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Phase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    GameOver,
}

impl Phase {
    /// True while a betting round can be open.
    #[must_use]
    pub fn is_betting(&self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::GameOver => "game over",
        };
        write!(f, "{repr}")
    }
}

/// One rung of the blind schedule.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlindLevel {
    pub small: Chips,
    pub big: Chips,
    pub ante: Chips,
}

impl fmt::Display for BlindLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ante > 0 {
            write!(f, "{}/{} ante {}", self.small, self.big, self.ante)
        } else {
            write!(f, "{}/{}", self.small, self.big)
        }
    }
}
