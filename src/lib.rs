//! Rules engine for Seep, a four-player, two-team capture card game.

pub mod action;
pub mod bot;
pub mod bots;
pub mod card;
pub mod combination;
pub mod deal;
pub mod error;
pub mod game;
pub mod rules;
pub mod score;
pub mod stack;
pub mod state;
pub mod visualize;

pub use crate::action::Move;
pub use crate::bot::Bot;
pub use crate::bots::{HumanBot, RandomBot};
pub use crate::card::{Card, Rank, Suit, full_deck, valid_calls};
pub use crate::deal::{deal_remaining, start_round};
pub use crate::error::{GameError, InvalidMove};
pub use crate::game::{Game, GameBuilder, GameConfig, MemoryStore, SnapshotStore, TurnObserver};
pub use crate::rules::{apply_move, legal_moves, validate_move};
pub use crate::score::{Outcome, RoundResult, RoundStatus, TeamScores, check_round_end};
pub use crate::stack::Stack;
pub use crate::state::{BoardEntry, GameState, Phase, Seat, SeatView, Team};
pub use crate::visualize::{VisualOptions, describe_move, render_view};
