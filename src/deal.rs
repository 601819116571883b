//! Dealing: the opening deal with its legal-call retry and the one-shot
//! second deal.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::card::{Card, DECK_SIZE, valid_calls};
use crate::error::GameError;
use crate::state::{BoardEntry, GameState, SEATS, Seat};

pub const FIRST_DEAL: usize = 4;
pub const BOARD_DEAL: usize = 4;
pub const SECOND_DEAL: usize = 8;
pub const DEFAULT_MAX_DEAL_ATTEMPTS: usize = 50;
/// Move count at which the remaining cards are dealt.
pub const SECOND_DEAL_MOVE: u32 = 4;

/// Shuffles `deck` and deals until the opener holds a legal call.
///
/// Each rejected deal is reshuffled from scratch. Running out of attempts is
/// a configuration error for this round start.
pub fn start_round<R: Rng + ?Sized>(
    deck: Vec<Card>,
    rng: &mut R,
    max_attempts: usize,
) -> Result<GameState, GameError> {
    if deck.len() != DECK_SIZE {
        return Err(GameError::InvalidConfiguration("deck must hold 52 cards"));
    }
    if max_attempts == 0 {
        return Err(GameError::InvalidConfiguration(
            "deal attempts must be positive",
        ));
    }
    let mut deck = deck;
    for attempt in 1..=max_attempts {
        deck.shuffle(rng);
        match deal_opening(deck.clone()) {
            Ok(state) => {
                info!(
                    attempt,
                    call_options = ?valid_calls(state.hand(Seat::OPENER)),
                    "round dealt"
                );
                return Ok(state);
            }
            Err(GameError::DealExhausted { .. }) => {
                debug!(attempt, "opener has no legal call, redealing");
            }
            Err(err) => return Err(err),
        }
    }
    warn!(max_attempts, "giving up on round start");
    Err(GameError::DealExhausted {
        attempts: max_attempts,
    })
}

/// Deals `deck` as-is, front first: four cards to each seat in seat order,
/// then four loose cards to the board.
///
/// Fails with `DealExhausted { attempts: 1 }` when the opener cannot call.
pub fn deal_opening(mut deck: Vec<Card>) -> Result<GameState, GameError> {
    if deck.len() != DECK_SIZE {
        return Err(GameError::InvalidConfiguration("deck must hold 52 cards"));
    }
    let mut hands: [Vec<Card>; SEATS] = Default::default();
    for hand in hands.iter_mut() {
        hand.extend(deck.drain(..FIRST_DEAL));
    }
    let board = deck
        .drain(..BOARD_DEAL)
        .map(BoardEntry::Card)
        .collect::<Vec<_>>();

    if valid_calls(&hands[Seat::OPENER.index()]).is_empty() {
        return Err(GameError::DealExhausted { attempts: 1 });
    }

    let state = GameState {
        hands,
        board,
        deck,
        current_turn: Seat::OPENER,
        move_count: 1,
        call: None,
        collected: Default::default(),
        team_points: [0; 2],
        seep_counts: [0; 2],
        last_collector: None,
        remaining_dealt: false,
        board_revealed: false,
    };
    state.check_conservation()?;
    Ok(state)
}

/// Deals the rest of the deck, eight cards per seat.
///
/// Returns `false` without touching the state when this already happened.
pub fn deal_remaining(state: &mut GameState) -> bool {
    if state.remaining_dealt {
        debug!("remaining cards already dealt");
        return false;
    }
    for seat in Seat::ALL {
        let take = SECOND_DEAL.min(state.deck.len());
        let cards = state.deck.drain(..take);
        state.hands[seat.index()].extend(cards);
    }
    state.remaining_dealt = true;
    info!(move_count = state.move_count, "remaining cards dealt");
    true
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::card::{Rank, Suit, full_deck};

    #[test]
    fn opening_deal_layout() -> Result<(), GameError> {
        let mut deck = full_deck();
        // Put the nine of spades into the opener's hand.
        let nine = deck
            .iter()
            .position(|c| *c == Card::new(Rank::Nine, Suit::Spades))
            .expect("nine present");
        deck.swap(4, nine);
        let state = deal_opening(deck)?;
        for seat in Seat::ALL {
            assert_eq!(state.hand(seat).len(), FIRST_DEAL);
        }
        assert_eq!(state.board.len(), BOARD_DEAL);
        assert_eq!(state.deck.len(), 32);
        assert_eq!(state.current_turn, Seat::Plyr2);
        assert_eq!(state.move_count, 1);
        assert!(state.call.is_none());
        Ok(())
    }

    #[test]
    fn opening_deal_without_call_is_rejected() {
        // Unshuffled: plyr2 gets 5♠..8♠, no legal call.
        let result = deal_opening(full_deck());
        assert!(matches!(result, Err(GameError::DealExhausted { attempts: 1 })));
    }

    #[test]
    fn start_round_always_gives_opener_a_call() -> Result<(), GameError> {
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let state = start_round(full_deck(), &mut rng, DEFAULT_MAX_DEAL_ATTEMPTS)?;
            assert!(!valid_calls(state.hand(Seat::Plyr2)).is_empty());
        }
        Ok(())
    }

    #[test]
    fn start_round_rejects_bad_configuration() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            start_round(full_deck(), &mut rng, 0),
            Err(GameError::InvalidConfiguration(_))
        ));
        let mut short = full_deck();
        short.pop();
        assert!(matches!(
            start_round(short, &mut rng, 5),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn start_round_gives_up_after_the_attempt_bound() {
        // Only aces through eights, so no shuffle hands the opener a call.
        let deck: Vec<Card> = full_deck()
            .into_iter()
            .filter(|card| card.face_value() < 9)
            .cycle()
            .take(DECK_SIZE)
            .collect();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            start_round(deck, &mut rng, 3),
            Err(GameError::DealExhausted { attempts: 3 })
        ));
    }

    #[test]
    fn remaining_cards_are_dealt_once() -> Result<(), GameError> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = start_round(full_deck(), &mut rng, DEFAULT_MAX_DEAL_ATTEMPTS)?;
        assert!(deal_remaining(&mut state));
        assert!(state.deck.is_empty());
        for seat in Seat::ALL {
            assert_eq!(state.hand(seat).len(), FIRST_DEAL + SECOND_DEAL);
        }
        let before = state.clone();
        assert!(!deal_remaining(&mut state));
        assert_eq!(state, before);
        state.check_conservation()
    }
}
