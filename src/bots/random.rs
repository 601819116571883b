use rand::Rng;
use rand::seq::SliceRandom;

use crate::action::Move;
use crate::bot::Bot;
use crate::state::SeatView;

/// Seat that plays any legal move with equal odds. Drives simulations and
/// the random-play property tests.
pub struct RandomBot<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomBot<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Bot for RandomBot<R> {
    fn select_move(&mut self, _view: &SeatView, legal_moves: &[Move]) -> Move {
        legal_moves
            .choose(&mut self.rng)
            .cloned()
            .expect("a seat in turn can always call or throw a card away")
    }
}
