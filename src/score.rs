//! Seep bonuses, end-of-round settlement and final team scores.
//!
//! Current scoring rule:
//!   team score = seep points + score value of both teammates' collected piles
//! A seep is worth 50 points while the team has fewer than two on its counter;
//! a sweep beyond that takes 50 points away and lowers the counter again.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::state::{GameState, Seat, Team};

pub const SEEP_BONUS: i32 = 50;
pub const MAX_SEEP_STREAK: u8 = 2;

/// Applies the seep rule for `seat`'s team after it cleared the board.
/// Returns the point change.
pub fn apply_seep(state: &mut GameState, seat: Seat) -> i32 {
    let team = seat.team().index();
    let delta = if state.seep_counts[team] < MAX_SEEP_STREAK {
        state.seep_counts[team] += 1;
        SEEP_BONUS
    } else {
        state.seep_counts[team] -= 1;
        -SEEP_BONUS
    };
    state.team_points[team] += delta;
    info!(
        %seat,
        delta,
        seep_count = state.seep_counts[team],
        "board cleared"
    );
    delta
}

/// Hands leftover board cards to the last collector once hands and deck are
/// empty. No seep is scored for this sweep.
///
/// Returns `true` when the round is over.
pub fn settle_round(state: &mut GameState) -> bool {
    if !state.is_round_over() {
        return false;
    }
    if state.board.is_empty() {
        return true;
    }
    match state.last_collector {
        Some(seat) => {
            let leftovers: Vec<_> = state
                .board
                .drain(..)
                .flat_map(|entry| entry.into_cards())
                .collect();
            debug!(%seat, count = leftovers.len(), "leftover board cards awarded");
            state.collected[seat.index()].extend(leftovers);
        }
        None => debug!("no pickups this round, leftovers stay on the board"),
    }
    true
}

/// Final points per team.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamScores {
    pub team1: i32,
    pub team2: i32,
}

impl TeamScores {
    pub fn of(&self, team: Team) -> i32 {
        match team {
            Team::Team1 => self.team1,
            Team::Team2 => self.team2,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    Winner(Team),
    Tie,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundResult {
    pub scores: TeamScores,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundStatus {
    InProgress,
    Finished(RoundResult),
}

/// Team score as it stands: seep points plus collected card scores.
pub fn team_score(state: &GameState, team: Team) -> i32 {
    let collected = i32::try_from(state.collected_score(team)).unwrap_or(i32::MAX);
    state.points(team) + collected
}

pub fn current_scores(state: &GameState) -> TeamScores {
    TeamScores {
        team1: team_score(state, Team::Team1),
        team2: team_score(state, Team::Team2),
    }
}

/// Reports whether the round is over and, if so, who won.
pub fn check_round_end(state: &GameState) -> RoundStatus {
    if !state.is_round_over() {
        return RoundStatus::InProgress;
    }
    let scores = current_scores(state);
    let outcome = match scores.team1.cmp(&scores.team2) {
        std::cmp::Ordering::Greater => Outcome::Winner(Team::Team1),
        std::cmp::Ordering::Less => Outcome::Winner(Team::Team2),
        std::cmp::Ordering::Equal => Outcome::Tie,
    };
    RoundStatus::Finished(RoundResult { scores, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, full_deck};
    use crate::state::BoardEntry;

    fn finished_state() -> GameState {
        GameState {
            hands: Default::default(),
            board: Vec::new(),
            deck: Vec::new(),
            current_turn: Seat::Plyr1,
            move_count: 49,
            call: Some(9),
            collected: Default::default(),
            team_points: [0; 2],
            seep_counts: [0; 2],
            last_collector: None,
            remaining_dealt: true,
            board_revealed: true,
        }
    }

    #[test]
    fn seep_bonus_reverses_after_two() {
        let mut state = finished_state();
        assert_eq!(apply_seep(&mut state, Seat::Plyr1), 50);
        assert_eq!(state.seep_count(Team::Team1), 1);
        assert_eq!(apply_seep(&mut state, Seat::Plyr3), 50);
        assert_eq!(state.seep_count(Team::Team1), 2);
        assert_eq!(state.points(Team::Team1), 100);
        assert_eq!(apply_seep(&mut state, Seat::Plyr1), -50);
        assert_eq!(state.seep_count(Team::Team1), 1);
        assert_eq!(state.points(Team::Team1), 50);
        assert_eq!(state.points(Team::Team2), 0);
    }

    #[test]
    fn leftovers_go_to_last_collector() {
        let mut state = finished_state();
        let deck = full_deck();
        state.collected[Seat::Plyr2.index()] = deck[..48].to_vec();
        state.board = deck[48..].iter().copied().map(BoardEntry::Card).collect();
        state.last_collector = Some(Seat::Plyr4);
        assert!(settle_round(&mut state));
        assert!(state.board.is_empty());
        assert_eq!(state.collected(Seat::Plyr4).len(), 4);
        assert_eq!(state.seep_count(Team::Team2), 0);
        assert!(state.check_conservation().is_ok());
    }

    #[test]
    fn winner_has_higher_total() {
        let mut state = finished_state();
        let deck = full_deck();
        // All spades (91 points) to team1, the rest (9 points) to team2.
        let (spades, rest): (Vec<Card>, Vec<Card>) = deck
            .into_iter()
            .partition(|c| c.suit == crate::card::Suit::Spades);
        state.collected[Seat::Plyr1.index()] = spades;
        state.collected[Seat::Plyr2.index()] = rest;
        state.team_points = [0, 100];
        match check_round_end(&state) {
            RoundStatus::Finished(result) => {
                assert_eq!(result.scores.team1, 91);
                assert_eq!(result.scores.team2, 109);
                assert_eq!(result.outcome, Outcome::Winner(Team::Team2));
            }
            RoundStatus::InProgress => panic!("round should be finished"),
        }
    }

    #[test]
    fn equal_scores_tie() {
        let state = finished_state();
        match check_round_end(&state) {
            RoundStatus::Finished(result) => assert_eq!(result.outcome, Outcome::Tie),
            RoundStatus::InProgress => panic!("round should be finished"),
        }
    }
}
