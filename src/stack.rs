use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::{Card, MAX_CALL, MIN_CALL, face_total, score_total};
use crate::state::Seat;

pub const MAX_STACKS: usize = 2;
/// Member count at which a stack becomes tight, and the cap on manually
/// chosen cards when forming or modifying one.
pub const MAX_STACK_CARDS: usize = 4;

/// Cards merged on the board under a declared value.
///
/// Members are always flat; merging two stacks concatenates their members.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub declared_value: u8,
    pub creator: Seat,
    pub members: Vec<Card>,
}

impl Stack {
    pub fn new(declared_value: u8, creator: Seat, members: Vec<Card>) -> Self {
        debug_assert!((MIN_CALL..=MAX_CALL).contains(&declared_value));
        Self {
            declared_value,
            creator,
            members,
        }
    }

    pub fn total_face_value(&self) -> u32 {
        face_total(&self.members)
    }

    /// A tight stack can no longer change its declared value.
    pub fn is_tight(&self) -> bool {
        self.members.len() >= MAX_STACK_CARDS
            || self.total_face_value() >= 2 * u32::from(self.declared_value)
    }

    pub fn is_loose(&self) -> bool {
        !self.is_tight()
    }

    pub fn score(&self) -> u32 {
        score_total(&self.members)
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stack of {} (by {}):", self.declared_value, self.creator)?;
        for (idx, card) in self.members.iter().enumerate() {
            if idx == 0 {
                write!(f, " {card}")?;
            } else {
                write!(f, " + {card}")?;
            }
        }
        Ok(())
    }
}

/// Largest value in `MIN_CALL..=MAX_CALL` that evenly divides `total`.
pub fn largest_declared_value(total: u32) -> Option<u8> {
    (MIN_CALL..=MAX_CALL)
        .rev()
        .find(|value| total > 0 && total % u32::from(*value) == 0)
}
