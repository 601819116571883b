//! Move validation and application.
//!
//! Every move is planned against the current state first; only a fully
//! validated plan is committed, and it is committed to a copy. A rejected move
//! therefore never leaves a trace.

use std::collections::BTreeSet;

use tracing::{debug, error};

use crate::action::Move;
use crate::card::{Card, MAX_CALL, MIN_CALL, valid_calls};
use crate::combination::{expand_pickup, expand_stack};
use crate::deal::{SECOND_DEAL_MOVE, deal_remaining};
use crate::error::{GameError, InvalidMove};
use crate::score::{apply_seep, settle_round};
use crate::stack::{MAX_STACK_CARDS, MAX_STACKS, Stack, largest_declared_value};
use crate::state::{BoardEntry, GameState, Phase, Seat};

/// Applies `mv` for the seat in turn and returns the resulting state.
pub fn apply_move(state: &GameState, mv: &Move) -> Result<GameState, GameError> {
    let next = transition(state, mv)?;
    debug!(
        seat = %state.current_turn,
        kind = mv.kind(),
        move_count = next.move_count,
        board = next.board.len(),
        "move applied"
    );
    Ok(next)
}

/// Checks `mv` without producing a new state.
pub fn validate_move(state: &GameState, mv: &Move) -> Result<(), GameError> {
    transition(state, mv).map(|_| ())
}

/// Every move the seat in turn could legally make, restricted to simple
/// selections: at most one loose card chosen by hand.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    if state.is_round_over() {
        return Vec::new();
    }
    let seat = state.current_turn;
    let hand = state.hand(seat);
    if matches!(state.phase(), Phase::Calling) {
        if seat != Seat::OPENER {
            return Vec::new();
        }
        return valid_calls(hand).into_iter().map(Move::Call).collect();
    }

    let loose: Vec<usize> = state
        .board
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.is_stack())
        .map(|(idx, _)| idx)
        .collect();
    let stacks: Vec<usize> = state
        .board
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_stack())
        .map(|(idx, _)| idx)
        .collect();
    let declared_values: Vec<Option<u8>> = if is_first_move(state) {
        vec![None]
    } else {
        (MIN_CALL..=MAX_CALL).map(Some).collect()
    };

    let mut candidates = Vec::new();
    for &card in hand {
        candidates.push(Move::ThrowAway(card));
        candidates.push(Move::Pickup {
            card,
            selected: Vec::new(),
        });
        for &idx in &loose {
            candidates.push(Move::Pickup {
                card,
                selected: vec![idx],
            });
            for declared_value in &declared_values {
                candidates.push(Move::CreateStack {
                    card,
                    selected: vec![idx],
                    declared_value: *declared_value,
                });
            }
        }
        for &target in &stacks {
            candidates.push(Move::AddToStack {
                target,
                card,
                selected: Vec::new(),
            });
            for &idx in &loose {
                candidates.push(Move::AddToStack {
                    target,
                    card,
                    selected: vec![idx],
                });
            }
        }
    }

    candidates
        .into_iter()
        .filter(|mv| transition(state, mv).is_ok())
        .collect()
}

fn transition(state: &GameState, mv: &Move) -> Result<GameState, GameError> {
    if state.is_round_over() {
        return Err(GameError::RoundOver);
    }
    let seat = state.current_turn;
    let mut next = state.clone();

    match mv {
        Move::Call(value) => {
            check_call(state, *value)?;
            next.call = Some(*value);
            next.board_revealed = true;
        }
        Move::ThrowAway(card) => {
            check_acting(state)?;
            check_in_hand(state, *card)?;
            if is_first_move(state) {
                check_matches_call(state, *card)?;
            }
            take_from_hand(&mut next, *card);
            next.board.push(BoardEntry::Card(*card));
        }
        Move::Pickup { card, selected } => {
            let capture = plan_pickup(state, *card, selected)?;
            commit_pickup(&mut next, capture);
        }
        Move::CreateStack {
            card,
            selected,
            declared_value,
        } => {
            let plan = plan_create_stack(state, *card, selected, *declared_value)?;
            commit_stack(&mut next, plan);
        }
        Move::AddToStack {
            target,
            card,
            selected,
        } => {
            let plan = plan_add_to_stack(state, *target, *card, selected)?;
            commit_stack(&mut next, plan);
        }
    }

    if !matches!(mv, Move::Call(_)) {
        next.move_count += 1;
        next.current_turn = seat.next();
        if next.move_count >= SECOND_DEAL_MOVE && !next.remaining_dealt {
            deal_remaining(&mut next);
        }
        settle_round(&mut next);
    }

    if let Err(err) = next.check_conservation() {
        error!(%seat, kind = mv.kind(), %err, "card conservation broken");
        return Err(err);
    }
    Ok(next)
}

fn is_first_move(state: &GameState) -> bool {
    state.move_count == 1
}

fn check_call(state: &GameState, value: u8) -> Result<(), InvalidMove> {
    if state.move_count != 1 || state.current_turn != Seat::OPENER || state.call.is_some() {
        return Err(InvalidMove::CallNotAllowed);
    }
    if !valid_calls(state.hand(Seat::OPENER)).contains(&value) {
        return Err(InvalidMove::InvalidCall(value));
    }
    Ok(())
}

fn check_acting(state: &GameState) -> Result<(), InvalidMove> {
    if matches!(state.phase(), Phase::Calling) {
        return Err(InvalidMove::CallRequired);
    }
    Ok(())
}

fn check_in_hand(state: &GameState, card: Card) -> Result<(), InvalidMove> {
    if state.hand(state.current_turn).contains(&card) {
        Ok(())
    } else {
        Err(InvalidMove::CardNotInHand(card))
    }
}

fn check_matches_call(state: &GameState, card: Card) -> Result<(), InvalidMove> {
    let call = state.call.ok_or(InvalidMove::CallRequired)?;
    if card.face_value() != call {
        return Err(InvalidMove::MustMatchCall { call });
    }
    Ok(())
}

fn check_selection(state: &GameState, selected: &[usize]) -> Result<(), InvalidMove> {
    let mut seen = BTreeSet::new();
    for &idx in selected {
        if idx >= state.board.len() {
            return Err(InvalidMove::BoardIndex(idx));
        }
        if !seen.insert(idx) {
            return Err(InvalidMove::DuplicateSelection(idx));
        }
    }
    Ok(())
}

fn check_loose_only(state: &GameState, selected: &[usize]) -> Result<(), InvalidMove> {
    match selected.iter().find(|idx| state.board[**idx].is_stack()) {
        Some(idx) => Err(InvalidMove::StackNotAllowed(*idx)),
        None => Ok(()),
    }
}

/// The acting seat must keep a card of `value` besides the one it plays.
fn check_retains(state: &GameState, played: Card, value: u8) -> Result<(), InvalidMove> {
    let retains = state
        .hand(state.current_turn)
        .iter()
        .any(|card| *card != played && card.face_value() == value);
    if retains {
        Ok(())
    } else {
        Err(InvalidMove::MissingPermissionCard { value })
    }
}

fn selection_value(state: &GameState, indices: impl IntoIterator<Item = usize>) -> u32 {
    indices.into_iter().map(|idx| state.board[idx].value()).sum()
}

fn take_from_hand(state: &mut GameState, card: Card) {
    let hand = &mut state.hands[state.current_turn.index()];
    if let Some(pos) = hand.iter().position(|held| *held == card) {
        hand.remove(pos);
    }
}

struct Capture {
    card: Card,
    entries: BTreeSet<usize>,
}

fn plan_pickup(state: &GameState, card: Card, selected: &[usize]) -> Result<Capture, InvalidMove> {
    check_acting(state)?;
    check_in_hand(state, card)?;
    check_selection(state, selected)?;
    if is_first_move(state) {
        check_matches_call(state, card)?;
    }
    let value = card.face_value();

    let entries = expand_pickup(&state.board, selected, value);
    if entries.is_empty() {
        return Err(InvalidMove::NothingToPickUp);
    }
    for idx in &entries {
        if let Some(stack) = state.board[*idx].as_stack() {
            if stack.declared_value != value {
                return Err(InvalidMove::StackValueMismatch {
                    declared: stack.declared_value,
                    value,
                });
            }
        }
    }
    let total = selection_value(state, entries.iter().copied());
    if total % u32::from(value) != 0 {
        return Err(InvalidMove::NotDivisible { total, value });
    }
    Ok(Capture { card, entries })
}

fn commit_pickup(state: &mut GameState, capture: Capture) {
    let seat = state.current_turn;
    take_from_hand(state, capture.card);

    let mut captured = vec![capture.card];
    let mut kept = Vec::with_capacity(state.board.len());
    for (idx, entry) in state.board.drain(..).enumerate() {
        if capture.entries.contains(&idx) {
            captured.extend(entry.into_cards());
        } else {
            kept.push(entry);
        }
    }
    state.board = kept;
    state.collected[seat.index()].extend(captured);
    state.last_collector = Some(seat);

    if state.board.is_empty() {
        apply_seep(state, seat);
    }
}

/// A stack to place on the board and the entries it replaces.
struct StackPlan {
    card: Card,
    consumed: BTreeSet<usize>,
    stack: Stack,
    /// Board index the stack takes; `None` appends it.
    position: Option<usize>,
}

fn plan_create_stack(
    state: &GameState,
    card: Card,
    selected: &[usize],
    declared_value: Option<u8>,
) -> Result<StackPlan, InvalidMove> {
    check_acting(state)?;
    check_in_hand(state, card)?;
    check_selection(state, selected)?;
    check_loose_only(state, selected)?;

    let chosen = 1 + selected.len();
    if chosen > MAX_STACK_CARDS {
        return Err(InvalidMove::TooManyCards {
            count: chosen,
            max: MAX_STACK_CARDS,
        });
    }

    let declared = if is_first_move(state) {
        let call = state.call.ok_or(InvalidMove::CallRequired)?;
        if declared_value.is_some_and(|value| value != call) {
            return Err(InvalidMove::DeclaredMustMatchCall { call });
        }
        call
    } else {
        let value = declared_value.ok_or(InvalidMove::MissingDeclaredValue)?;
        if !(MIN_CALL..=MAX_CALL).contains(&value) {
            return Err(InvalidMove::DeclaredValueOutOfRange(value));
        }
        value
    };

    let combined = u32::from(card.face_value()) + selection_value(state, selected.iter().copied());
    if combined % u32::from(declared) != 0 {
        return Err(InvalidMove::NotDivisible {
            total: combined,
            value: declared,
        });
    }
    check_retains(state, card, declared)?;

    let consumed = expand_stack(&state.board, selected, declared, None);
    if consumed.is_empty() {
        return Err(InvalidMove::NothingToStack);
    }
    let absorbed: Vec<usize> = consumed
        .iter()
        .copied()
        .filter(|idx| state.board[*idx].is_stack())
        .collect();
    if state.stack_count() - absorbed.len() + 1 > MAX_STACKS {
        return Err(InvalidMove::StackLimit { max: MAX_STACKS });
    }

    let position = absorbed.first().copied();
    let creator = position
        .and_then(|idx| state.board[idx].as_stack())
        .map(|stack| stack.creator)
        .unwrap_or(state.current_turn);
    let stack = Stack::new(declared, creator, gather_members(state, &consumed, card));
    Ok(StackPlan {
        card,
        consumed,
        stack,
        position,
    })
}

fn plan_add_to_stack(
    state: &GameState,
    target: usize,
    card: Card,
    selected: &[usize],
) -> Result<StackPlan, InvalidMove> {
    check_acting(state)?;
    check_in_hand(state, card)?;
    check_selection(state, selected)?;
    let existing = state
        .board
        .get(target)
        .ok_or(InvalidMove::BoardIndex(target))?
        .as_stack()
        .ok_or(InvalidMove::NotAStack(target))?;
    let extra: Vec<usize> = selected
        .iter()
        .copied()
        .filter(|idx| *idx != target)
        .collect();
    check_loose_only(state, &extra)?;

    let contributed = u32::from(card.face_value()) + selection_value(state, extra.iter().copied());
    let declared = if contributed == u32::from(existing.declared_value) {
        existing.declared_value
    } else {
        if existing.is_tight() {
            return Err(InvalidMove::TightStack);
        }
        let count = existing.members.len() + 1 + extra.len();
        if count > MAX_STACK_CARDS {
            return Err(InvalidMove::TooManyCards {
                count,
                max: MAX_STACK_CARDS,
            });
        }
        let total = existing.total_face_value() + contributed;
        largest_declared_value(total).ok_or(InvalidMove::NoDeclaredValue { total })?
    };

    // Teammates may build on their partner's stack without holding the key card.
    if existing.creator != state.current_turn.partner() {
        check_retains(state, card, declared)?;
    }

    let mut consumed = expand_stack(&state.board, &extra, declared, Some(target));
    consumed.insert(target);
    // A stack already carrying the new value keeps its place and its creator.
    let position = consumed
        .iter()
        .copied()
        .find(|idx| *idx != target && state.board[*idx].is_stack())
        .unwrap_or(target);
    let creator = state.board[position]
        .as_stack()
        .map(|stack| stack.creator)
        .unwrap_or(existing.creator);
    let stack = Stack::new(declared, creator, gather_members(state, &consumed, card));
    Ok(StackPlan {
        card,
        consumed,
        stack,
        position: Some(position),
    })
}

/// Board cards of `consumed` in board order, followed by the hand card.
fn gather_members(state: &GameState, consumed: &BTreeSet<usize>, card: Card) -> Vec<Card> {
    let mut members: Vec<Card> = consumed
        .iter()
        .flat_map(|idx| state.board[*idx].cards().iter().copied())
        .collect();
    members.push(card);
    members
}

fn commit_stack(state: &mut GameState, plan: StackPlan) {
    take_from_hand(state, plan.card);
    let StackPlan {
        consumed,
        stack,
        position,
        ..
    } = plan;

    let mut stack = Some(stack);
    let mut board = Vec::with_capacity(state.board.len() + 1);
    for (idx, entry) in state.board.drain(..).enumerate() {
        if Some(idx) == position {
            if let Some(stack) = stack.take() {
                board.push(BoardEntry::Stack(stack));
            }
        } else if !consumed.contains(&idx) {
            board.push(entry);
        }
    }
    if let Some(stack) = stack {
        board.push(BoardEntry::Stack(stack));
    }
    state.board = board;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::full_deck;

    fn card(s: &str) -> Card {
        s.parse().expect("valid card")
    }

    fn loose(cards: &[&str]) -> Vec<BoardEntry> {
        cards.iter().map(|s| BoardEntry::Card(card(s))).collect()
    }

    /// State with the given hands and board; every other card sits in the deck.
    fn state_with(hands: [&[&str]; 4], board: Vec<BoardEntry>, move_count: u32) -> GameState {
        let hands: [Vec<Card>; 4] =
            std::array::from_fn(|idx| hands[idx].iter().map(|s| card(s)).collect());
        let used: Vec<Card> = hands
            .iter()
            .flatten()
            .copied()
            .chain(board.iter().flat_map(|e| e.cards().iter().copied()))
            .collect();
        let deck = full_deck()
            .into_iter()
            .filter(|c| !used.contains(c))
            .collect();
        GameState {
            hands,
            board,
            deck,
            current_turn: Seat::Plyr1,
            move_count,
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
    fn pickup_must_divide_evenly() {
        let state = state_with(
            [&["5s", "2h"], &["3c"], &["3d"], &["3h"]],
            loose(&["7d", "4c"]),
            10,
        );
        let mv = Move::Pickup {
            card: card("5s"),
            selected: vec![0],
        };
        // Nothing on the board completes 7 to a multiple of 5.
        assert!(matches!(
            validate_move(&state, &mv),
            Err(GameError::InvalidMove(InvalidMove::NotDivisible { total: 7, value: 5 }))
        ));
    }

    #[test]
    fn partner_may_modify_stack_without_key_card() -> Result<(), GameError> {
        let board = vec![
            BoardEntry::Stack(Stack::new(10, Seat::Plyr3, vec![card("4d"), card("6d")])),
            BoardEntry::Stack(Stack::new(11, Seat::Plyr2, vec![card("5c"), card("6c")])),
        ];
        let state = state_with([&["2s", "4h"], &["3c"], &["3d"], &["3h"]], board, 10);
        // 10 + 2 = 12 on the partner's stack, no queen needed.
        let next = apply_move(
            &state,
            &Move::AddToStack {
                target: 0,
                card: card("2s"),
                selected: vec![],
            },
        )?;
        let stack = next.board[0].as_stack().expect("stack kept");
        assert_eq!(stack.declared_value, 12);
        assert_eq!(stack.creator, Seat::Plyr3);
        assert_eq!(stack.members.len(), 3);

        // 11 + 4 = 15 has no divisor in range.
        let err = validate_move(
            &state,
            &Move::AddToStack {
                target: 1,
                card: card("4h"),
                selected: vec![],
            },
        );
        assert!(matches!(
            err,
            Err(GameError::InvalidMove(InvalidMove::NoDeclaredValue { total: 15 }))
        ));
        Ok(())
    }

    #[test]
    fn own_stack_modification_needs_key_card() {
        let board = vec![BoardEntry::Stack(Stack::new(
            9,
            Seat::Plyr1,
            vec![card("4d"), card("5d")],
        ))];
        let state = state_with([&["Ah", "3h"], &["3c"], &["3d"], &["3s"]], board, 10);
        let err = validate_move(
            &state,
            &Move::AddToStack {
                target: 0,
                card: card("Ah"),
                selected: vec![],
            },
        );
        assert!(matches!(
            err,
            Err(GameError::InvalidMove(InvalidMove::MissingPermissionCard { value: 10 }))
        ));
    }

    #[test]
    fn rejected_move_leaves_state_untouched() {
        let state = state_with([&["5s"], &["3c"], &["3d"], &["3h"]], loose(&["7d"]), 10);
        let before = state.clone();
        assert!(apply_move(&state, &Move::ThrowAway(card("Kd"))).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn legal_moves_during_calling_are_calls() {
        let mut state = state_with(
            [&["2c"], &["9s", "Kh", "9d", "3c"], &["3d"], &["3h"]],
            loose(&["7d"]),
            1,
        );
        state.call = None;
        state.current_turn = Seat::Plyr2;
        state.board_revealed = false;
        assert_eq!(legal_moves(&state), vec![Move::Call(9), Move::Call(13)]);
    }
}
