//! Hand lifecycle: starting hands, advancing streets, and settling.

use std::time::Instant;

use super::betting::{self, street_closed};
use super::constants;
use super::entities::{Phase, SeatRole};
use super::errors::EngineError;
use super::pot;
use super::state::{TableEvent, TableState};

/// Tries to start the next hand. Returns `Ok(false)` when fewer than two
/// funded seats remain, in which case the table parks in `Waiting`.
///
/// Busted seats are restocked (up to the rebuy cap) or vacated before
/// the funded-seat count is taken. The blind level is fixed here from
/// the table clock and never changes mid-hand.
pub fn try_start_hand(state: &mut TableState, now: Instant) -> Result<bool, EngineError> {
    apply_rebuys(state);

    if state.funded_count() < 2 {
        state.phase = Phase::Waiting;
        state.turn_idx = None;
        return Ok(false);
    }

    let clock_start = *state.clock_start.get_or_insert(now);
    let elapsed_levels =
        (now.duration_since(clock_start).as_secs() / state.settings().level_duration.as_secs().max(1)) as usize;
    // Levels never regress, even across a snapshot restore.
    state.blind_level = elapsed_levels
        .max(state.blind_level)
        .min(state.settings().blind_schedule.len().saturating_sub(1));

    state.hand_counter += 1;
    state.board.clear();
    state.pot = 0;
    for seat in &mut state.seats {
        seat.reset_for_hand();
    }
    state.deck = super::entities::Deck::shuffled();

    let blinds = state.blinds();
    state.push_event(TableEvent::HandStarted {
        hand: state.hand_counter,
        level: state.blind_level + 1,
        blinds,
    });

    // The button moves to the next alive seat clockwise.
    state.dealer_idx = state
        .next_seat(state.dealer_idx, |seat| seat.is_alive())
        .ok_or(EngineError::InsufficientSeats)?;

    collect_antes(state);

    // Heads-up merges the button and the small blind; the merged seat
    // acts first preflop.
    let heads_up = state.alive_count() == 2;
    let (sb_idx, bb_idx, first_to_act) = if heads_up {
        let bb = state
            .next_seat(state.dealer_idx, |seat| seat.is_alive())
            .ok_or(EngineError::InsufficientSeats)?;
        state.seats[state.dealer_idx].role = SeatRole::DealerSmallBlind;
        state.seats[bb].role = SeatRole::BigBlind;
        (state.dealer_idx, bb, state.dealer_idx)
    } else {
        let sb = state
            .next_seat(state.dealer_idx, |seat| seat.is_alive())
            .ok_or(EngineError::InsufficientSeats)?;
        let bb = state
            .next_seat(sb, |seat| seat.is_alive())
            .ok_or(EngineError::InsufficientSeats)?;
        let first = state
            .next_seat(bb, |seat| seat.is_alive())
            .ok_or(EngineError::InsufficientSeats)?;
        state.seats[state.dealer_idx].role = SeatRole::Dealer;
        state.seats[sb].role = SeatRole::SmallBlind;
        state.seats[bb].role = SeatRole::BigBlind;
        (sb, bb, first)
    };

    post_blind(state, sb_idx, blinds.small);
    post_blind(state, bb_idx, blinds.big);

    // A short all-in blind does not lower the bet to match.
    state.current_bet = blinds.big;
    state.min_raise = blinds.big;

    for idx in 0..state.seats.len() {
        if !state.seats[idx].is_alive() {
            continue;
        }
        match state.deck.deal(constants::HOLE_CARDS) {
            Ok(cards) => state.seats[idx].hole_cards = cards,
            Err(err) => {
                abort_hand(state);
                return Err(err);
            }
        }
    }

    state.phase = Phase::Preflop;
    mark_all_in_acted(state);
    let n = state.seats.len();
    betting::advance_turn(state, (first_to_act + n - 1) % n);

    // Blinds may have put everyone all-in; run the hand out immediately.
    progress(state)?;
    Ok(true)
}

/// Restocks or removes busted seats at the hand boundary.
fn apply_rebuys(state: &mut TableState) {
    let starting_stack = state.settings().starting_stack;
    let max_rebuys = state.settings().max_rebuys;
    for idx in 0..state.seats.len() {
        let seat = &mut state.seats[idx];
        if !seat.is_occupied() || seat.stack > 0 {
            continue;
        }
        if seat.entries_used < max_rebuys {
            seat.entries_used += 1;
            seat.stack = starting_stack;
            let entry = seat.entries_used;
            if let Some(name) = seat.name.clone() {
                state.push_event(TableEvent::Rebought { name, entry });
            }
        } else {
            let name = seat.name.clone();
            seat.vacate();
            if let Some(name) = name {
                state.push_event(TableEvent::Eliminated { name });
            }
        }
    }
}

/// Antes go straight to the pot and never count toward calling.
fn collect_antes(state: &mut TableState) {
    let ante = state.blinds().ante;
    if ante == 0 {
        return;
    }
    for idx in 0..state.seats.len() {
        let seat = &mut state.seats[idx];
        if !seat.is_alive() {
            continue;
        }
        let paid = ante.min(seat.stack);
        seat.stack -= paid;
        seat.contribution += paid;
        state.pot += paid;
        if paid > 0
            && let Some(name) = state.seats[idx].name.clone()
        {
            state.push_event(TableEvent::PostedAnte { name, amount: paid });
        }
    }
}

fn post_blind(state: &mut TableState, seat_idx: usize, amount: super::entities::Chips) {
    let paid = state.seats[seat_idx].pay(amount);
    if paid > 0
        && let Some(name) = state.seats[seat_idx].name.clone()
    {
        state.push_event(TableEvent::PostedBlind { name, amount: paid });
    }
}

/// All-in seats owe no further action this street.
fn mark_all_in_acted(state: &mut TableState) {
    for seat in &mut state.seats {
        if seat.is_alive() && seat.stack == 0 {
            seat.has_acted = true;
        }
    }
}

/// Voids the current hand after an unrecoverable dealing failure. Every
/// seat gets its full contribution back and the table parks in Waiting.
fn abort_hand(state: &mut TableState) {
    log::error!("hand #{} aborted, refunding contributions", state.hand_counter);
    for seat in &mut state.seats {
        seat.stack += seat.contribution;
        seat.bet = 0;
        seat.contribution = 0;
        seat.hole_cards.clear();
    }
    state.pot = 0;
    state.board.clear();
    state.current_bet = 0;
    state.min_raise = 0;
    state.turn_idx = None;
    state.phase = Phase::Waiting;
}

/// Advances the hand as far as the current bets allow: closes finished
/// streets, deals the next one, and settles the hand when it ends.
/// Betting rounds with a pending turn are left untouched.
pub fn progress(state: &mut TableState) -> Result<(), EngineError> {
    if !state.phase.is_betting() {
        return Ok(());
    }

    // Everyone else folded: the last seat standing takes everything,
    // no cards shown.
    if state.alive_count() == 1 {
        state.sweep_bets();
        let winner = state
            .seats
            .iter()
            .position(|seat| seat.is_alive())
            .ok_or(EngineError::InsufficientSeats)?;
        let amount = state.pot;
        state.seats[winner].stack += amount;
        state.pot = 0;
        if let Some(name) = state.seats[winner].name.clone() {
            state.push_event(TableEvent::WonPot {
                name,
                amount,
                hand: None,
            });
        }
        state.turn_idx = None;
        state.phase = Phase::GameOver;
        return Ok(());
    }

    while state.phase.is_betting() && street_closed(state) {
        state.sweep_bets();
        match state.phase {
            Phase::Preflop => deal_street(state, 3, Phase::Flop)?,
            Phase::Flop => deal_street(state, 1, Phase::Turn)?,
            Phase::Turn => deal_street(state, 1, Phase::River)?,
            Phase::River => {
                showdown(state);
                return Ok(());
            }
            _ => return Ok(()),
        }
    }
    Ok(())
}

fn deal_street(state: &mut TableState, n_cards: usize, next: Phase) -> Result<(), EngineError> {
    match state.deck.deal(n_cards) {
        Ok(cards) => state.board.extend(cards),
        Err(err) => {
            abort_hand(state);
            return Err(err);
        }
    }
    state.phase = next;
    state.current_bet = 0;
    state.min_raise = state.blinds().big;
    for seat in &mut state.seats {
        if seat.can_act() {
            seat.has_acted = false;
        }
    }
    mark_all_in_acted(state);
    betting::advance_turn(state, state.dealer_idx);
    state.push_event(TableEvent::StreetDealt {
        phase: next,
        board: state.board.clone(),
    });
    Ok(())
}

fn showdown(state: &mut TableState) {
    let settlement = pot::settle_showdown(&state.seats, &state.board, state.dealer_idx);
    for award in settlement.awards {
        state.seats[award.seat_idx].stack += award.amount;
        if let Some(name) = state.seats[award.seat_idx].name.clone() {
            state.push_event(TableEvent::WonPot {
                name,
                amount: award.amount,
                hand: Some(award.hand),
            });
        }
    }
    state.pot = settlement.unawarded;
    state.turn_idx = None;
    state.phase = Phase::GameOver;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::PlayerAction;
    use crate::game::state::TableSettings;

    fn fresh_table(players: usize) -> TableState {
        let mut state = TableState::new(TableSettings::default());
        for i in 0..players {
            state.join(&format!("p{i}")).unwrap();
        }
        state
    }

    /// Index of the seat holding the given per-hand role.
    fn seat_with_role(state: &TableState, role: SeatRole) -> usize {
        state
            .seats
            .iter()
            .position(|seat| seat.role == role)
            .unwrap()
    }

    #[test]
    fn test_hand_does_not_start_short_handed() {
        let mut state = fresh_table(1);
        assert!(!try_start_hand(&mut state, Instant::now()).unwrap());
        assert_eq!(state.phase, Phase::Waiting);
    }

    #[test]
    fn test_three_handed_roles_and_first_actor() {
        let mut state = fresh_table(3);
        assert!(try_start_hand(&mut state, Instant::now()).unwrap());
        assert_eq!(state.phase, Phase::Preflop);

        // The button rotates past vacant seats, so the blinds are found
        // by role rather than by index arithmetic.
        let dealer = state.dealer_idx;
        let sb = seat_with_role(&state, SeatRole::SmallBlind);
        let bb = seat_with_role(&state, SeatRole::BigBlind);
        assert_eq!(state.seats[dealer].role, SeatRole::Dealer);
        assert_eq!(sb, state.next_seat(dealer, |seat| seat.is_alive()).unwrap());
        assert_eq!(bb, state.next_seat(sb, |seat| seat.is_alive()).unwrap());
        // Under the gun is the dealer three-handed.
        assert_eq!(state.turn_idx, Some(dealer));

        let blinds = state.blinds();
        assert_eq!(state.seats[sb].bet, blinds.small);
        assert_eq!(state.seats[bb].bet, blinds.big);
        assert_eq!(state.current_bet, blinds.big);
        assert_eq!(state.min_raise, blinds.big);
        for idx in [dealer, sb, bb] {
            assert_eq!(state.seats[idx].hole_cards.len(), 2);
        }
    }

    #[test]
    fn test_heads_up_dealer_posts_small_blind_and_acts_first() {
        let mut state = fresh_table(2);
        assert!(try_start_hand(&mut state, Instant::now()).unwrap());
        let dealer = state.dealer_idx;
        let other = seat_with_role(&state, SeatRole::BigBlind);
        assert_ne!(dealer, other);
        assert_eq!(state.seats[dealer].role, SeatRole::DealerSmallBlind);
        assert_eq!(state.seats[dealer].bet, state.blinds().small);
        assert_eq!(state.seats[other].bet, state.blinds().big);
        assert_eq!(state.turn_idx, Some(dealer));
    }

    #[test]
    fn test_big_blind_gets_the_option_preflop() {
        let mut state = fresh_table(2);
        try_start_hand(&mut state, Instant::now()).unwrap();
        let dealer = state.dealer_idx;
        let bb = seat_with_role(&state, SeatRole::BigBlind);

        // Dealer limps in; the big blind still owes an action.
        betting::apply_action(&mut state, dealer, PlayerAction::CheckOrCall).unwrap();
        progress(&mut state).unwrap();
        assert_eq!(state.phase, Phase::Preflop);
        assert_eq!(state.turn_idx, Some(bb));

        // Big blind checks the option and the flop comes.
        betting::apply_action(&mut state, bb, PlayerAction::CheckOrCall).unwrap();
        progress(&mut state).unwrap();
        assert_eq!(state.phase, Phase::Flop);
        assert_eq!(state.board.len(), 3);
        // Postflop heads-up the big blind acts first.
        assert_eq!(state.turn_idx, Some(bb));
    }

    #[test]
    fn test_all_fold_awards_pot_without_a_board() {
        let mut state = fresh_table(3);
        try_start_hand(&mut state, Instant::now()).unwrap();
        let total = state.total_chips();
        let bb = seat_with_role(&state, SeatRole::BigBlind);

        // Everyone folds to the blind; the blind never gets a turn.
        while state.phase.is_betting() {
            let seat_idx = state.turn_idx.unwrap();
            assert_ne!(seat_idx, bb);
            betting::apply_action(&mut state, seat_idx, PlayerAction::Fold).unwrap();
            progress(&mut state).unwrap();
        }

        assert_eq!(state.phase, Phase::GameOver);
        assert!(state.board.is_empty());
        assert_eq!(state.pot, 0);
        // The big blind collected both blinds.
        let blinds = state.blinds();
        assert_eq!(
            state.seats[bb].stack,
            state.settings().starting_stack + blinds.small
        );
        assert_eq!(state.total_chips(), total);
    }

    #[test]
    fn test_busted_seat_rebuys_then_is_eliminated() {
        let mut state = fresh_table(2);
        state.seats[0].stack = 0;
        state.seats[0].entries_used = 0;
        apply_rebuys(&mut state);
        assert_eq!(state.seats[0].stack, state.settings().starting_stack);
        assert_eq!(state.seats[0].entries_used, 1);

        state.seats[0].stack = 0;
        state.seats[0].entries_used = constants::MAX_REBUYS;
        apply_rebuys(&mut state);
        assert!(!state.seats[0].is_occupied());
    }

    #[test]
    fn test_blind_level_advances_with_the_clock() {
        let mut state = fresh_table(2);
        let start = Instant::now();
        try_start_hand(&mut state, start).unwrap();
        assert_eq!(state.blind_level, 0);

        // Finish the running hand so the next one can start.
        state.phase = Phase::GameOver;
        let later = start + state.settings().level_duration * 3;
        try_start_hand(&mut state, later).unwrap();
        assert_eq!(state.blind_level, 3);
        assert_eq!(state.blinds(), state.settings().blind_schedule[3]);
    }

    #[test]
    fn test_blind_level_saturates_at_schedule_end() {
        let mut state = fresh_table(2);
        let start = Instant::now();
        try_start_hand(&mut state, start).unwrap();
        state.phase = Phase::GameOver;
        let later = start + state.settings().level_duration * 1000;
        try_start_hand(&mut state, later).unwrap();
        assert_eq!(
            state.blind_level,
            state.settings().blind_schedule.len() - 1
        );
    }

    #[test]
    fn test_antes_fund_the_pot_directly() {
        let mut state = fresh_table(3);
        state.blind_level = 2; // 300/600 ante 600
        // Prevent the clock from recomputing the level downward.
        let start = Instant::now();
        try_start_hand(&mut state, start).unwrap();
        assert_eq!(state.blind_level, 2);
        assert_eq!(state.pot, 1800);
        // Antes do not count toward the bet to match.
        assert_eq!(state.current_bet, 600);
        let dealer = state.dealer_idx;
        assert_eq!(state.seats[dealer].contribution, 600);
        assert_eq!(state.seats[dealer].bet, 0);
    }
}
