//! Pure hand-evaluation functions. Everything in here is deterministic
//! and side-effect free; the state machine calls into it at showdown.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Card, Rank, rank_symbol};

/// Hand category, ordered weakest to strongest so the derived `Ord`
/// compares categories directly.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// The strength of a best five-card hand. Derived `Ord` compares the
/// category first and then the tiebreak ranks lexicographically, which
/// is exactly the poker comparison when the tiebreaks are laid out in
/// significance order.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub category: HandCategory,
    /// Ranks in decreasing significance, category dependent. A flush
    /// carries all five ranks; quads carry the quad rank then the kicker.
    pub tiebreaks: Vec<Rank>,
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.tiebreaks.first() {
            Some(&high) => write!(f, "{}, {} high", self.category, rank_symbol(high)),
            None => write!(f, "{}", self.category),
        }
    }
}

/// Highest rank of a straight within `ranks`, which must be sorted
/// descending. Returns `Some(5)` for the wheel (A-2-3-4-5).
fn straight_high(ranks: &[Rank]) -> Option<Rank> {
    let mut unique = ranks.to_vec();
    unique.dedup();
    if unique.len() != 5 {
        return None;
    }
    if unique[0] - unique[4] == 4 {
        return Some(unique[0]);
    }
    if unique == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

/// Evaluates exactly five cards.
fn evaluate_five(cards: &[Card; 5]) -> HandValue {
    let mut ranks: Vec<Rank> = cards.iter().map(|card| card.0).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|card| card.1 == cards[0].1);
    let straight = straight_high(&ranks);

    if let Some(high) = straight {
        let category = if is_flush {
            HandCategory::StraightFlush
        } else {
            HandCategory::Straight
        };
        return HandValue {
            category,
            tiebreaks: vec![high],
        };
    }

    // Group equal ranks: (count, rank), sorted so the biggest group of
    // the highest rank leads.
    let mut groups: Vec<(u8, Rank)> = Vec::with_capacity(5);
    for &rank in &ranks {
        match groups.iter_mut().find(|(_, r)| *r == rank) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, rank)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let counts: Vec<u8> = groups.iter().map(|(count, _)| *count).collect();
    let group_ranks: Vec<Rank> = groups.iter().map(|(_, rank)| *rank).collect();

    match counts.as_slice() {
        [4, 1] => HandValue {
            category: HandCategory::FourOfAKind,
            tiebreaks: group_ranks,
        },
        [3, 2] => HandValue {
            category: HandCategory::FullHouse,
            tiebreaks: group_ranks,
        },
        [3, 1, 1] => HandValue {
            category: HandCategory::ThreeOfAKind,
            tiebreaks: group_ranks,
        },
        [2, 2, 1] => HandValue {
            category: HandCategory::TwoPair,
            tiebreaks: group_ranks,
        },
        [2, 1, 1, 1] => HandValue {
            category: HandCategory::OnePair,
            tiebreaks: group_ranks,
        },
        _ if is_flush => HandValue {
            category: HandCategory::Flush,
            tiebreaks: ranks,
        },
        _ => HandValue {
            category: HandCategory::HighCard,
            tiebreaks: ranks,
        },
    }
}

/// Evaluates the best five-card hand available within `cards` by trying
/// every five-card combination. Works for 5, 6, or 7 cards (a seat's two
/// hole cards plus up to five board cards).
///
/// # Panics
///
/// Panics if fewer than five cards are given.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    let n = cards.len();
    assert!(n >= 5, "need at least five cards to evaluate");

    let mut best: Option<HandValue> = None;
    for a in 0..n {
        for b in (a + 1)..n {
            for c in (b + 1)..n {
                for d in (c + 1)..n {
                    for e in (d + 1)..n {
                        let combo = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let value = evaluate_five(&combo);
                        match best {
                            Some(ref current) if *current >= value => {}
                            _ => best = Some(value),
                        }
                    }
                }
            }
        }
    }
    // n >= 5 guarantees at least one combination was evaluated.
    best.unwrap_or(HandValue {
        category: HandCategory::HighCard,
        tiebreaks: Vec::new(),
    })
}

/// Indices of all hands tied for the maximum.
#[must_use]
pub fn winners(values: &[HandValue]) -> Vec<usize> {
    let Some(mut best) = values.first() else {
        return Vec::new();
    };
    for value in values {
        if value > best {
            best = value;
        }
    }
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| *value == best)
        .map(|(i, _)| i)
        .collect()
}
