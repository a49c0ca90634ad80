//! The betting round state machine: validating and applying actions,
//! closing streets, and rotating the turn.

use super::entities::{AppliedAction, Chips, PlayerAction, SeatIndex, SeatStatus};
use super::errors::ActionError;
use super::state::{TableEvent, TableState};

/// A street is closed once every alive seat has acted and is either
/// matching the current bet or all-in.
#[must_use]
pub fn street_closed(state: &TableState) -> bool {
    state
        .seats
        .iter()
        .filter(|seat| seat.is_alive())
        .all(|seat| seat.has_acted && (seat.bet == state.current_bet || seat.stack == 0))
}

/// Validates and applies a player action. On any error the state is
/// untouched.
pub fn apply_action(
    state: &mut TableState,
    seat_idx: SeatIndex,
    action: PlayerAction,
) -> Result<AppliedAction, ActionError> {
    if state.turn_idx != Some(seat_idx) {
        return Err(ActionError::OutOfTurn);
    }
    if !state.seats[seat_idx].is_alive() {
        return Err(ActionError::NotInHand);
    }

    let bet = state.seats[seat_idx].bet;
    let stack = state.seats[seat_idx].stack;

    let applied = match action {
        PlayerAction::Fold => {
            state.seats[seat_idx].status = SeatStatus::Folded;
            AppliedAction::Fold
        }
        PlayerAction::CheckOrCall => {
            let owed = state.current_bet.saturating_sub(bet);
            let paid = state.seats[seat_idx].pay(owed);
            if paid == 0 {
                AppliedAction::Check
            } else if state.seats[seat_idx].stack == 0 {
                AppliedAction::AllIn(state.seats[seat_idx].bet)
            } else {
                AppliedAction::Call(paid)
            }
        }
        PlayerAction::RaiseTo(target) => raise_to(state, seat_idx, target)?,
        PlayerAction::AllIn => {
            let target = bet + stack;
            if target > state.current_bet {
                raise_to(state, seat_idx, target)?
            } else {
                state.seats[seat_idx].pay(stack);
                AppliedAction::AllIn(target)
            }
        }
    };

    state.seats[seat_idx].has_acted = true;
    if let Some(name) = state.seats[seat_idx].name.clone() {
        log::debug!("seat {seat_idx} ({name}) {applied}");
        state.push_event(TableEvent::Acted {
            name,
            action: applied,
        });
    }
    advance_turn(state, seat_idx);
    Ok(applied)
}

/// Raises the seat's total street bet to `target`. An all-in for less
/// than a full raise is allowed; any other short raise is rejected.
fn raise_to(
    state: &mut TableState,
    seat_idx: SeatIndex,
    target: Chips,
) -> Result<AppliedAction, ActionError> {
    let bet = state.seats[seat_idx].bet;
    let stack = state.seats[seat_idx].stack;
    let all_in = target == bet + stack;

    if target <= state.current_bet {
        return Err(ActionError::RaiseBelowCall {
            target,
            current: state.current_bet,
        });
    }
    if target > bet + stack {
        return Err(ActionError::RaiseExceedsStack { target, stack });
    }
    let minimum = state.current_bet + state.min_raise;
    if target < minimum && !all_in {
        return Err(ActionError::RaiseBelowMinimum { target, minimum });
    }

    state.seats[seat_idx].pay(target - bet);
    let raised_by = target - state.current_bet;
    state.current_bet = target;
    state.min_raise = state.min_raise.max(raised_by);

    // A raise reopens the action for everyone else still able to act.
    for (idx, seat) in state.seats.iter_mut().enumerate() {
        if idx != seat_idx && seat.can_act() {
            seat.has_acted = false;
        }
    }

    if all_in {
        Ok(AppliedAction::AllIn(target))
    } else {
        Ok(AppliedAction::Raise(target))
    }
}

/// Moves the turn to the next seat owed an action, clockwise from
/// `from`. All-in seats are marked acted and skipped. When nobody is
/// owed a turn, the turn goes to `None` and the lifecycle closes the
/// street.
pub fn advance_turn(state: &mut TableState, from: SeatIndex) {
    let n = state.seats.len();
    for offset in 1..=n {
        let idx = (from + offset) % n;
        let seat = &mut state.seats[idx];
        if !seat.is_alive() {
            continue;
        }
        if seat.stack == 0 {
            seat.has_acted = true;
            continue;
        }
        if !seat.has_acted {
            state.turn_idx = Some(idx);
            return;
        }
    }
    state.turn_idx = None;
}

/// Folds a seat on the engine's behalf (timeouts, disconnects). Returns
/// whether anything changed.
pub fn force_fold(state: &mut TableState, seat_idx: SeatIndex) -> bool {
    if !state.seats[seat_idx].is_alive() {
        return false;
    }
    state.seats[seat_idx].status = SeatStatus::Folded;
    state.seats[seat_idx].has_acted = true;
    if state.turn_idx == Some(seat_idx) {
        advance_turn(state, seat_idx);
    }
    true
}
