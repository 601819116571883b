use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Move submitted by the seat in turn. Table entries are board indices.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Move {
    /// Opening call of a value in 9..=13.
    Call(u8),
    /// Drop a hand card on the board as a loose card.
    ThrowAway(Card),
    /// Capture board entries with a hand card.
    Pickup { card: Card, selected: Vec<usize> },
    /// Form a new stack from a hand card and loose board cards.
    CreateStack {
        card: Card,
        selected: Vec<usize>,
        declared_value: Option<u8>,
    },
    /// Add a hand card (and loose board cards) to the stack at `target`.
    AddToStack {
        target: usize,
        card: Card,
        selected: Vec<usize>,
    },
}

impl Move {
    /// Hand card played by this move, if any.
    pub fn hand_card(&self) -> Option<Card> {
        match self {
            Move::Call(_) => None,
            Move::ThrowAway(card)
            | Move::Pickup { card, .. }
            | Move::CreateStack { card, .. }
            | Move::AddToStack { card, .. } => Some(*card),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Move::Call(_) => "call",
            Move::ThrowAway(_) => "throw_away",
            Move::Pickup { .. } => "pickup",
            Move::CreateStack { .. } => "create_stack",
            Move::AddToStack { .. } => "add_to_stack",
        }
    }
}
