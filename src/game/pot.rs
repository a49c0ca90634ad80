//! Side-pot construction and showdown settlement.
//!
//! Pots are never tracked incrementally during the hand. They are
//! rebuilt from per-seat total contributions at settlement time, which
//! makes layered all-in scenarios a pure function of the final
//! contribution vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::entities::{Card, Chips, Seat, SeatIndex};
use super::functional::{self, HandValue};

/// One contribution layer: the chips in it and the seats that can win it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pot {
    pub amount: Chips,
    /// Seat indices still contesting this layer.
    pub eligible: Vec<SeatIndex>,
}

/// A single payout at showdown.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PotAward {
    pub seat_idx: SeatIndex,
    pub amount: Chips,
    pub hand: HandValue,
}

/// The full outcome of a showdown. `unawarded` is nonzero only when a
/// layer had no eligible seat, which indicates a bookkeeping bug; the
/// chips are surfaced rather than silently assigned.
#[derive(Clone, Debug, Default)]
pub struct Settlement {
    pub awards: Vec<PotAward>,
    pub unawarded: Chips,
}

/// Builds the main pot and side pots from per-seat contributions.
///
/// Each distinct contribution level closes a layer. A layer's amount is
/// `(level - previous level) * number of seats contributing at least
/// level`, and only seats that are still alive and contributed at least
/// that much are eligible to win it. Folded seats fund layers but are
/// never eligible.
#[must_use]
pub fn build_pots(seats: &[Seat]) -> Vec<Pot> {
    let levels: BTreeSet<Chips> = seats
        .iter()
        .map(|seat| seat.contribution)
        .filter(|&c| c > 0)
        .collect();

    let mut pots = Vec::with_capacity(levels.len());
    let mut prev = 0;
    for level in levels {
        let layer = level - prev;
        let contributors = seats
            .iter()
            .filter(|seat| seat.contribution >= level)
            .count() as Chips;
        let eligible: Vec<SeatIndex> = seats
            .iter()
            .enumerate()
            .filter(|(_, seat)| seat.is_alive() && seat.contribution >= level)
            .map(|(i, _)| i)
            .collect();
        pots.push(Pot {
            amount: layer * contributors,
            eligible,
        });
        prev = level;
    }
    pots
}

/// Settles every pot at showdown against the board.
///
/// Each pot goes to the best hand among its eligible seats; ties split
/// evenly, with indivisible chips handed out one at a time clockwise
/// starting from the first seat after the dealer.
#[must_use]
pub fn settle_showdown(seats: &[Seat], board: &[Card], dealer_idx: SeatIndex) -> Settlement {
    let mut settlement = Settlement::default();
    let n = seats.len();

    for pot in build_pots(seats) {
        if pot.eligible.is_empty() {
            log::error!(
                "pot of {} chips has no eligible seat, withholding it",
                pot.amount
            );
            settlement.unawarded += pot.amount;
            continue;
        }

        let values: Vec<HandValue> = pot
            .eligible
            .iter()
            .map(|&idx| {
                let mut cards = seats[idx].hole_cards.clone();
                cards.extend_from_slice(board);
                functional::evaluate(&cards)
            })
            .collect();

        let winner_positions = functional::winners(&values);
        let mut winner_idxs: Vec<SeatIndex> = winner_positions
            .iter()
            .map(|&pos| pot.eligible[pos])
            .collect();

        // Clockwise from the seat after the dealer decides who receives
        // the indivisible chips.
        let first = (dealer_idx + 1) % n;
        winner_idxs.sort_unstable_by_key(|&idx| (idx + n - first) % n);

        let n_winners = winner_idxs.len() as Chips;
        let share = pot.amount / n_winners;
        let odd = pot.amount % n_winners;

        for (order, &seat_idx) in winner_idxs.iter().enumerate() {
            let extra = Chips::from((order as Chips) < odd);
            let value_pos = pot
                .eligible
                .iter()
                .position(|&e| e == seat_idx)
                .unwrap_or(0);
            settlement.awards.push(PotAward {
                seat_idx,
                amount: share + extra,
                hand: values[value_pos].clone(),
            });
        }
    }

    settlement
}
