use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::{Card, DECK_SIZE, score_total};
use crate::error::GameError;
use crate::stack::Stack;

pub const SEATS: usize = 4;

/// One of the four fixed seats. Play rotates plyr1 → plyr2 → plyr3 → plyr4.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    Plyr1,
    Plyr2,
    Plyr3,
    Plyr4,
}

impl Seat {
    pub const ALL: [Seat; SEATS] = [Seat::Plyr1, Seat::Plyr2, Seat::Plyr3, Seat::Plyr4];

    /// Seat that makes the opening call and acts first.
    pub const OPENER: Seat = Seat::Plyr2;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Seat {
        Seat::ALL[(self.index() + 1) % SEATS]
    }

    /// Seats sitting opposite each other play as a team.
    pub fn team(self) -> Team {
        match self {
            Seat::Plyr1 | Seat::Plyr3 => Team::Team1,
            Seat::Plyr2 | Seat::Plyr4 => Team::Team2,
        }
    }

    pub fn partner(self) -> Seat {
        Seat::ALL[(self.index() + 2) % SEATS]
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plyr{}", self.index() + 1)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Team {
    Team1,
    Team2,
}

impl Team {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn seats(self) -> [Seat; 2] {
        match self {
            Team::Team1 => [Seat::Plyr1, Seat::Plyr3],
            Team::Team2 => [Seat::Plyr2, Seat::Plyr4],
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Team1 => write!(f, "team1"),
            Team::Team2 => write!(f, "team2"),
        }
    }
}

/// Entry on the board: a loose card or a stack.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BoardEntry {
    Card(Card),
    Stack(Stack),
}

impl BoardEntry {
    /// Value the entry counts for when combined: face value for a card,
    /// declared value for a stack.
    pub fn value(&self) -> u32 {
        match self {
            BoardEntry::Card(card) => u32::from(card.face_value()),
            BoardEntry::Stack(stack) => u32::from(stack.declared_value),
        }
    }

    pub fn as_stack(&self) -> Option<&Stack> {
        match self {
            BoardEntry::Stack(stack) => Some(stack),
            BoardEntry::Card(_) => None,
        }
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, BoardEntry::Stack(_))
    }

    pub fn cards(&self) -> &[Card] {
        match self {
            BoardEntry::Card(card) => std::slice::from_ref(card),
            BoardEntry::Stack(stack) => &stack.members,
        }
    }

    pub fn into_cards(self) -> Vec<Card> {
        match self {
            BoardEntry::Card(card) => vec![card],
            BoardEntry::Stack(stack) => stack.members,
        }
    }
}

impl fmt::Display for BoardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardEntry::Card(card) => write!(f, "{card}"),
            BoardEntry::Stack(stack) => write!(f, "{stack}"),
        }
    }
}

/// Phase of a round, derived from the state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    /// The opener has not called yet.
    Calling,
    /// Regular play.
    Acting,
    /// Hands and deck are exhausted.
    RoundEnd,
}

/// Complete state of one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub hands: [Vec<Card>; SEATS],
    pub board: Vec<BoardEntry>,
    /// Undealt cards; the front is the top of the deck.
    pub deck: Vec<Card>,
    pub current_turn: Seat,
    pub move_count: u32,
    pub call: Option<u8>,
    pub collected: [Vec<Card>; SEATS],
    pub team_points: [i32; 2],
    pub seep_counts: [u8; 2],
    pub last_collector: Option<Seat>,
    pub remaining_dealt: bool,
    pub board_revealed: bool,
}

impl GameState {
    pub fn phase(&self) -> Phase {
        if self.hands.iter().all(Vec::is_empty) && self.deck.is_empty() {
            Phase::RoundEnd
        } else if self.move_count <= 1 && self.call.is_none() {
            Phase::Calling
        } else {
            Phase::Acting
        }
    }

    pub fn is_round_over(&self) -> bool {
        matches!(self.phase(), Phase::RoundEnd)
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat.index()]
    }

    pub fn collected(&self, seat: Seat) -> &[Card] {
        &self.collected[seat.index()]
    }

    pub fn points(&self, team: Team) -> i32 {
        self.team_points[team.index()]
    }

    pub fn seep_count(&self, team: Team) -> u8 {
        self.seep_counts[team.index()]
    }

    pub fn stack_count(&self) -> usize {
        self.board.iter().filter(|entry| entry.is_stack()).count()
    }

    /// Every card currently on the board, stacks flattened.
    pub fn board_cards(&self) -> Vec<Card> {
        self.board
            .iter()
            .flat_map(|entry| entry.cards().iter().copied())
            .collect()
    }

    /// Score value of the cards a team has collected so far.
    pub fn collected_score(&self, team: Team) -> u32 {
        team.seats()
            .iter()
            .map(|seat| score_total(self.collected(*seat)))
            .sum()
    }

    /// Checks that deck, hands, board and collected piles together hold each
    /// of the 52 cards exactly once.
    pub fn check_conservation(&self) -> Result<(), GameError> {
        let mut seen = HashSet::with_capacity(DECK_SIZE);
        let all = self
            .deck
            .iter()
            .chain(self.hands.iter().flatten())
            .chain(self.board.iter().flat_map(|entry| entry.cards().iter()))
            .chain(self.collected.iter().flatten());
        for card in all {
            if !seen.insert(*card) {
                return Err(GameError::InvariantViolation(format!(
                    "card {card} observed twice"
                )));
            }
        }
        if seen.len() != DECK_SIZE {
            return Err(GameError::InvariantViolation(format!(
                "expected {DECK_SIZE} cards in play, found {}",
                seen.len()
            )));
        }
        Ok(())
    }

    /// Snapshot of what `seat` is allowed to see.
    pub fn view(&self, seat: Seat) -> SeatView {
        let board = if self.board_revealed {
            self.board.clone()
        } else {
            Vec::new()
        };
        SeatView {
            seat,
            phase: self.phase(),
            current_turn: self.current_turn,
            move_count: self.move_count,
            call: self.call,
            hand: self.hand(seat).to_vec(),
            board,
            board_revealed: self.board_revealed,
            hand_sizes: std::array::from_fn(|idx| self.hands[idx].len()),
            collected_counts: std::array::from_fn(|idx| self.collected[idx].len()),
            deck_count: self.deck.len(),
            team_points: self.team_points,
            seep_counts: self.seep_counts,
        }
    }
}

/// Per-seat snapshot handed to bots and renderers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: Seat,
    pub phase: Phase,
    pub current_turn: Seat,
    pub move_count: u32,
    pub call: Option<u8>,
    pub hand: Vec<Card>,
    pub board: Vec<BoardEntry>,
    pub board_revealed: bool,
    pub hand_sizes: [usize; SEATS],
    pub collected_counts: [usize; SEATS],
    pub deck_count: usize,
    pub team_points: [i32; 2],
    pub seep_counts: [u8; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seats_rotate_and_pair_across() {
        assert_eq!(Seat::Plyr4.next(), Seat::Plyr1);
        assert_eq!(Seat::Plyr2.partner(), Seat::Plyr4);
        assert_eq!(Seat::Plyr1.team(), Seat::Plyr3.team());
        assert_ne!(Seat::Plyr1.team(), Seat::Plyr2.team());
        assert_eq!(Seat::Plyr3.to_string(), "plyr3");
    }
}
