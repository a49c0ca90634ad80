/// End-to-end hand scenarios driving the engine through its public
/// operations, plus an actor round-trip over the real message channel.
use std::time::Instant;

use holdem_table::game::{
    betting::apply_action,
    entities::{Card, Phase, PlayerAction, SeatRole, SeatStatus, Suit},
    errors::ActionError,
    lifecycle::{progress, try_start_hand},
    state::{TableSettings, TableState},
    timeout::TimeoutSupervisor,
};
use holdem_table::table::{TableActor, TableConfig};

fn table_with_players(n: usize) -> TableState {
    let mut state = TableState::new(TableSettings::default());
    for i in 0..n {
        state.join(&format!("p{i}")).unwrap();
    }
    state
}

/// Calls or checks for whoever is on turn until the hand ends.
fn check_down(state: &mut TableState) {
    while state.phase.is_betting() {
        let seat_idx = state.turn_idx.expect("a betting phase needs a turn");
        apply_action(state, seat_idx, PlayerAction::CheckOrCall).unwrap();
        progress(state).unwrap();
    }
}

#[test]
fn test_full_hand_conserves_chips() {
    let mut state = table_with_players(4);
    try_start_hand(&mut state, Instant::now()).unwrap();
    let total = state.total_chips();
    assert_eq!(total, 4 * state.settings().starting_stack);

    check_down(&mut state);

    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.board.len(), 5);
    assert_eq!(state.pot, 0);
    assert_eq!(state.total_chips(), total);
}

#[test]
fn test_consecutive_hands_rotate_the_button() {
    let mut state = table_with_players(3);
    try_start_hand(&mut state, Instant::now()).unwrap();
    let first_dealer = state.dealer_idx;
    check_down(&mut state);

    try_start_hand(&mut state, Instant::now()).unwrap();
    assert_eq!(state.dealer_idx, (first_dealer + 1) % state.seats.len());
    assert_eq!(state.hand_counter, 2);
}

#[test]
fn test_everyone_folds_to_the_big_blind() {
    let mut state = table_with_players(4);
    try_start_hand(&mut state, Instant::now()).unwrap();
    let total = state.total_chips();

    let bb = state
        .seats
        .iter()
        .position(|seat| seat.role == SeatRole::BigBlind)
        .unwrap();

    while state.phase.is_betting() {
        let seat_idx = state.turn_idx.unwrap();
        assert_ne!(seat_idx, bb, "the hand must end before the blind acts");
        apply_action(&mut state, seat_idx, PlayerAction::Fold).unwrap();
        progress(&mut state).unwrap();
    }

    assert_eq!(state.phase, Phase::GameOver);
    assert!(state.board.is_empty());
    let blinds = state.blinds();
    assert_eq!(
        state.seats[bb].stack,
        state.settings().starting_stack + blinds.small
    );
    assert_eq!(state.total_chips(), total);
}

#[test]
fn test_rigged_showdown_pays_the_best_hand() {
    let mut state = table_with_players(2);
    try_start_hand(&mut state, Instant::now()).unwrap();
    let dealer = state.dealer_idx;
    let other = (dealer + 1) % state.seats.len();

    // Play to the river, then pin the cards before the final checks.
    for _ in 0..3 {
        let seat_idx = state.turn_idx.unwrap();
        apply_action(&mut state, seat_idx, PlayerAction::CheckOrCall).unwrap();
        progress(&mut state).unwrap();
        let seat_idx = state.turn_idx.unwrap();
        apply_action(&mut state, seat_idx, PlayerAction::CheckOrCall).unwrap();
        progress(&mut state).unwrap();
    }
    assert_eq!(state.phase, Phase::River);

    state.board = vec![
        Card(2, Suit::Club),
        Card(7, Suit::Diamond),
        Card(9, Suit::Heart),
        Card(11, Suit::Spade),
        Card(13, Suit::Club),
    ];
    // The dealer holds aces, the other seat a pair of threes.
    state.seats[dealer].hole_cards = vec![Card(14, Suit::Club), Card(14, Suit::Spade)];
    state.seats[other].hole_cards = vec![Card(3, Suit::Club), Card(3, Suit::Spade)];

    let dealer_stack = state.seats[dealer].stack;
    let pot_total = state.pot
        + state.seats[dealer].bet
        + state.seats[other].bet;

    check_down(&mut state);

    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.seats[dealer].stack, dealer_stack + pot_total);
    assert_eq!(state.pot, 0);
}

#[test]
fn test_rejected_raise_leaves_the_state_untouched() {
    let mut state = table_with_players(3);
    try_start_hand(&mut state, Instant::now()).unwrap();
    let actor = state.turn_idx.unwrap();

    let stacks: Vec<_> = state.seats.iter().map(|seat| seat.stack).collect();
    let current_bet = state.current_bet;
    let min_raise = state.min_raise;

    // Big blind is 200, so the minimum raise target is 400.
    let err = apply_action(&mut state, actor, PlayerAction::RaiseTo(300)).unwrap_err();
    assert_eq!(
        err,
        ActionError::RaiseBelowMinimum {
            target: 300,
            minimum: 400
        }
    );

    let after: Vec<_> = state.seats.iter().map(|seat| seat.stack).collect();
    assert_eq!(after, stacks);
    assert_eq!(state.current_bet, current_bet);
    assert_eq!(state.min_raise, min_raise);
    assert_eq!(state.turn_idx, Some(actor));
}

#[test]
fn test_all_in_runout_deals_the_board_without_actions() {
    let mut state = table_with_players(2);
    try_start_hand(&mut state, Instant::now()).unwrap();
    let first = state.turn_idx.unwrap();
    let second = (first + 1) % state.seats.len();

    apply_action(&mut state, first, PlayerAction::AllIn).unwrap();
    progress(&mut state).unwrap();
    apply_action(&mut state, second, PlayerAction::CheckOrCall).unwrap();
    progress(&mut state).unwrap();

    // No further input: the board ran out and the hand settled.
    assert_eq!(state.phase, Phase::GameOver);
    assert_eq!(state.board.len(), 5);
    assert_eq!(state.pot, 0);
    assert_eq!(
        state.total_chips(),
        2 * state.settings().starting_stack
    );
}

#[test]
fn test_timeout_folds_exactly_once_per_deadline() {
    let settings = TableSettings::default();
    let mut state = table_with_players(3);
    let mut supervisor = TimeoutSupervisor::new(&settings);

    let start = Instant::now();
    try_start_hand(&mut state, start).unwrap();
    supervisor.watch_turn(&state, start);
    let on_clock = state.turn_idx.unwrap();

    let deadline = start + settings.action_timeout;
    supervisor.tick(&mut state, deadline).unwrap();
    assert_eq!(state.seats[on_clock].status, SeatStatus::Folded);
    let next_up = state.turn_idx.unwrap();

    // Ticking again at the same instant must not fold the next seat.
    supervisor.tick(&mut state, deadline).unwrap();
    supervisor.tick(&mut state, deadline).unwrap();
    assert_eq!(state.turn_idx, Some(next_up));
    assert_eq!(state.seats[next_up].status, SeatStatus::Alive);
}

#[test]
fn test_busted_player_rebuys_twice_then_leaves() {
    let mut state = table_with_players(2);

    // Bust seat 0 three times across hand boundaries.
    for expected_entry in 1..=2u8 {
        state.seats[0].stack = 0;
        state.phase = Phase::GameOver;
        try_start_hand(&mut state, Instant::now()).unwrap();
        assert_eq!(state.seats[0].entries_used, expected_entry);
        assert!(state.seats[0].stack > 0);
        check_down(&mut state);
    }

    state.seats[0].stack = 0;
    state.phase = Phase::GameOver;
    // Only one funded player remains, so no hand starts.
    assert!(!try_start_hand(&mut state, Instant::now()).unwrap());
    assert!(!state.seats[0].is_occupied());
    assert_eq!(state.phase, Phase::Waiting);
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let mut state = table_with_players(3);
    try_start_hand(&mut state, Instant::now()).unwrap();

    let snapshot = state.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: holdem_table::game::state::TableSnapshot =
        serde_json::from_str(&json).unwrap();
    assert_eq!(restored, snapshot);

    // A table rebuilt from the snapshot carries the same chips and can
    // finish the hand.
    let mut rebuilt = TableState::from_snapshot(restored, TableSettings::default());
    assert_eq!(rebuilt.total_chips(), state.total_chips());
    assert_eq!(rebuilt.phase, Phase::Preflop);
    assert_eq!(rebuilt.turn_idx, state.turn_idx);
    check_down(&mut rebuilt);
    assert_eq!(rebuilt.phase, Phase::GameOver);
}

#[tokio::test]
async fn test_actor_plays_a_hand_over_the_channel() {
    let (actor, handle) = TableActor::new(7, TableConfig::default());
    tokio::spawn(actor.run());

    let alice = handle.join_seat("alice").await.unwrap();
    let bob = handle.join_seat("bob").await.unwrap();
    handle.tick(Instant::now()).await.unwrap();

    let view = handle.snapshot(None).await.unwrap();
    assert_eq!(view.phase, Phase::Preflop);

    // Whoever is on turn shoves, the other calls; the actor runs the
    // board out on its own.
    let first = view.turn_idx.unwrap();
    let second = if first == alice { bob } else { alice };
    handle.submit_action(first, PlayerAction::AllIn).await.unwrap();
    handle
        .submit_action(second, PlayerAction::CheckOrCall)
        .await
        .unwrap();

    let view = handle.snapshot(None).await.unwrap();
    assert_eq!(view.phase, Phase::GameOver);
    assert_eq!(view.board.len(), 5);
    let stacks: u32 = view.seats.iter().map(|seat| seat.stack).sum();
    assert_eq!(stacks, 2 * TableSettings::default().starting_stack);

    handle.close().await.unwrap();
}
