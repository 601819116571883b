//! Property tests over cards, deals and random play.

use std::env;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use seep::card::{Rank, Suit};
use seep::{
    BoardEntry, Bot, Card, GameBuilder, GameState, Move, RandomBot, Seat, Stack, apply_move,
    full_deck, legal_moves, start_round, valid_calls,
};

fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(24);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn any_card() -> impl Strategy<Value = Card> {
    (0..Rank::ALL.len(), 0..Suit::ALL.len())
        .prop_map(|(rank, suit)| Card::new(Rank::ALL[rank], Suit::ALL[suit]))
}

fn tight_stacks(state: &GameState) -> Vec<Stack> {
    state
        .board
        .iter()
        .filter_map(BoardEntry::as_stack)
        .filter(|stack| stack.is_tight())
        .cloned()
        .collect()
}

/// After a move, a previously tight stack is either gone from the board or
/// still tight inside whatever stack now holds its cards.
fn tight_stays_tight(before: &[Stack], after: &GameState) -> bool {
    before.iter().all(|old| {
        let first = old.members[0];
        after.board.iter().all(|entry| match entry {
            BoardEntry::Stack(stack) if stack.members.contains(&first) => stack.is_tight(),
            _ => true,
        })
    })
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn score_value_is_zero_one_face_or_six(card in any_card()) {
        let score = card.score_value();
        prop_assert!(
            score == 0 || score == 1 || score == 6 || score == card.face_value(),
            "unexpected score {} for {}", score, card
        );
        if card.suit == Suit::Spades {
            prop_assert_eq!(score, card.face_value());
        }
    }

    #[test]
    fn round_start_always_leaves_a_call(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = start_round(full_deck(), &mut rng, 50).expect("a valid deal");
        prop_assert!(!valid_calls(state.hand(Seat::Plyr2)).is_empty());
        prop_assert!(state.check_conservation().is_ok());
        prop_assert!(!state.board_revealed);
        prop_assert_eq!(state.current_turn, Seat::Plyr2);
    }

    #[test]
    fn random_play_conserves_cards_and_keeps_stacks_tight(seed in any::<u64>()) {
        let game = GameBuilder::new().with_seed(seed).build().expect("game");
        let mut state = game.state().clone();
        let mut bot = RandomBot::new(StdRng::seed_from_u64(seed ^ 0xA5A5));
        let mut steps = 0;
        while !state.is_round_over() {
            let legal = legal_moves(&state);
            prop_assert!(!legal.is_empty(), "no legal move at step {}", steps);
            let seat = state.current_turn;
            let mv = bot.select_move(&state.view(seat), &legal);
            if let Some(card) = mv.hand_card() {
                prop_assert!(state.hand(seat).contains(&card));
            }
            let tight = tight_stacks(&state);
            let next = apply_move(&state, &mv).expect("legal moves apply");
            prop_assert!(next.check_conservation().is_ok());
            prop_assert!(next.stack_count() <= 2);
            prop_assert!(tight_stays_tight(&tight, &next));
            if !matches!(mv, Move::Call(_)) {
                prop_assert_eq!(next.move_count, state.move_count + 1);
                prop_assert_eq!(next.current_turn, seat.next());
            }
            state = next;
            steps += 1;
        }
        prop_assert!(state.deck.is_empty());
        prop_assert!(state.hands.iter().all(Vec::is_empty));
    }
}
