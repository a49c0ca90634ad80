/// Number of seats at a table.
pub const MAX_SEATS: usize = 9;
/// Hole cards dealt to each live seat.
pub const HOLE_CARDS: usize = 2;
/// Community cards on a full board.
pub const BOARD_CARDS: usize = 5;
/// Cards in a fresh deck.
pub const DECK_SIZE: usize = 52;
/// Re-entries allowed after busting before the seat is vacated.
pub const MAX_REBUYS: u8 = 2;
/// Longest allowed player name.
pub const MAX_NAME_LENGTH: usize = 16;
/// Chips a player sits down with (and receives per rebuy).
pub const DEFAULT_STARTING_STACK: u32 = 60_000;
/// Seconds each blind level lasts.
pub const DEFAULT_LEVEL_SECS: u64 = 600;
/// Seconds a seat gets to act before being force-folded.
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 30;
/// Seconds of silence before a seat is marked for vacancy.
pub const DEFAULT_LIVENESS_TIMEOUT_SECS: u64 = 180;
/// Pause between a hand finishing and the next one starting.
pub const DEFAULT_NEXT_HAND_DELAY_SECS: u64 = 5;
