use thiserror::Error;

use crate::card::Card;
use crate::state::Seat;

/// Errors that can occur when manipulating the game state.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("not {0}'s turn")]
    NotPlayersTurn(Seat),
    #[error("invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),
    #[error("round is already over")]
    RoundOver,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("no deal with a legal opening call after {attempts} attempts")]
    DealExhausted { attempts: usize },
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error("snapshot store failed: {0}")]
    Snapshot(String),
}

impl GameError {
    /// Validation failures leave the state untouched and can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GameError::InvalidMove(_) | GameError::NotPlayersTurn(_))
    }
}

/// Details of rejected moves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("a call is only allowed as the opener's first action")]
    CallNotAllowed,
    #[error("{0} is not a legal call for this hand")]
    InvalidCall(u8),
    #[error("the opener must call before playing")]
    CallRequired,
    #[error("card {0} is not in hand")]
    CardNotInHand(Card),
    #[error("the first move must use a card matching the call {call}")]
    MustMatchCall { call: u8 },
    #[error("board index {0} is out of range")]
    BoardIndex(usize),
    #[error("board index {0} selected more than once")]
    DuplicateSelection(usize),
    #[error("board entry {0} is not a stack")]
    NotAStack(usize),
    #[error("board entry {0} is a stack and cannot be selected here")]
    StackNotAllowed(usize),
    #[error("stack of {declared} cannot be captured with a {value}")]
    StackValueMismatch { declared: u8, value: u8 },
    #[error("nothing on the board matches")]
    NothingToPickUp,
    #[error("combined value {total} is not a multiple of {value}")]
    NotDivisible { total: u32, value: u8 },
    #[error("at most {max} stacks may be on the board")]
    StackLimit { max: usize },
    #[error("{count} cards chosen, at most {max} allowed")]
    TooManyCards { count: usize, max: usize },
    #[error("declared value {0} is outside 9..=13")]
    DeclaredValueOutOfRange(u8),
    #[error("a declared value is required")]
    MissingDeclaredValue,
    #[error("declared value must equal the call {call}")]
    DeclaredMustMatchCall { call: u8 },
    #[error("a card of value {value} must remain in hand")]
    MissingPermissionCard { value: u8 },
    #[error("a stack needs at least one board entry")]
    NothingToStack,
    #[error("tight stacks cannot change value")]
    TightStack,
    #[error("no declared value divides {total}")]
    NoDeclaredValue { total: u32 },
    #[error("no cards left in hand")]
    EmptyHand,
}
