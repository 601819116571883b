use crate::action::Move;
use crate::state::SeatView;

/// Interface for move producers. Whatever a bot returns is submitted through
/// the same validation path as a human move.
pub trait Bot {
    fn select_move(&mut self, view: &SeatView, legal_moves: &[Move]) -> Move;
}
