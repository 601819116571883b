use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DECK_SIZE: usize = 52;
pub const MIN_CALL: u8 = 9;
pub const MAX_CALL: u8 = 13;

/// Suit of a card. Only spades carry their face value as score.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

/// Card rank; the discriminant is the face value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Rank {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        Rank::ALL.get(usize::from(value).checked_sub(1)?).copied()
    }
}

/// A single card of the standard 52-card deck.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Ace=1 through King=13.
    #[inline]
    pub fn face_value(&self) -> u8 {
        self.rank.value()
    }

    /// Points this card is worth in a collected pile.
    ///
    /// Every spade scores its face value, any other ace scores 1 and the ten of
    /// diamonds scores 6. Everything else is worth nothing.
    pub fn score_value(&self) -> u8 {
        match (self.suit, self.rank) {
            (Suit::Spades, rank) => rank.value(),
            (_, Rank::Ace) => 1,
            (Suit::Diamonds, Rank::Ten) => 6,
            _ => 0,
        }
    }
}

/// Builds the 52-card deck in suit-major order (unshuffled).
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(rank, suit));
        }
    }
    deck
}

/// Sum of face values.
pub fn face_total(cards: &[Card]) -> u32 {
    cards.iter().map(|card| u32::from(card.face_value())).sum()
}

/// Sum of score values.
pub fn score_total(cards: &[Card]) -> u32 {
    cards.iter().map(|card| u32::from(card.score_value())).sum()
}

/// Values a seat may call with this hand: distinct face values in
/// `MIN_CALL..=MAX_CALL`, ascending.
pub fn valid_calls(hand: &[Card]) -> Vec<u8> {
    let mut calls: Vec<u8> = hand
        .iter()
        .map(Card::face_value)
        .filter(|value| (MIN_CALL..=MAX_CALL).contains(value))
        .collect();
    calls.sort_unstable();
    calls.dedup();
    calls
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Ace => write!(f, "A"),
            Rank::Jack => write!(f, "J"),
            Rank::Queen => write!(f, "Q"),
            Rank::King => write!(f, "K"),
            rank => write!(f, "{}", rank.value()),
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Card {
    /// Formats as `10♦`, `A♠`, `Q♥`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Parses `10d`, `Td`, `A♠`, `q♥` and similar.
impl FromStr for Card {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let suit_ch = s
            .chars()
            .last()
            .ok_or_else(|| String::from("empty card string"))?;
        let rank_part = &s[..s.len() - suit_ch.len_utf8()];

        let suit = match suit_ch {
            's' | 'S' | '♠' => Suit::Spades,
            'h' | 'H' | '♥' => Suit::Hearts,
            'd' | 'D' | '♦' => Suit::Diamonds,
            'c' | 'C' | '♣' => Suit::Clubs,
            _ => return Err(format!("invalid suit: {suit_ch}")),
        };

        let rank = match rank_part.to_ascii_uppercase().as_str() {
            "A" | "1" => Rank::Ace,
            "T" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            digits => digits
                .parse::<u8>()
                .ok()
                .and_then(Rank::from_value)
                .ok_or_else(|| format!("invalid rank: {rank_part}"))?,
        };

        Ok(Card { rank, suit })
    }
}
