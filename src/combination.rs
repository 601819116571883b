//! Auto-expansion of a board selection.
//!
//! A player can never leave a matching card behind: whatever they select by
//! hand is widened to every loose card and stack equal to the target value and
//! to every disjoint group of loose cards summing to it.
//!
//! The search is an exhaustive subset enumeration over the loose cards outside
//! the current selection. It is exponential in the pool size, which stays small
//! in practice (the board rarely holds more than eight loose cards) and is
//! further cut down because face values are at least 1, so no group can hold
//! more cards than the target value.

use std::collections::BTreeSet;

use crate::state::BoardEntry;

/// Expands a pickup made with a card of `hand_value`.
///
/// When the manual selection does not add up to a multiple of the hand value,
/// the smallest group of loose cards that lifts it to the nearest reachable
/// multiple is pulled in first.
pub fn expand_pickup(
    board: &[BoardEntry],
    selected: &[usize],
    hand_value: u8,
) -> BTreeSet<usize> {
    expand(board, selected, hand_value, true, None)
}

/// Expands the cards going into a stack declared at `declared_value`.
///
/// `exclude` keeps the stack being modified out of the search. Other stacks
/// of the same declared value are included, which merges them.
pub fn expand_stack(
    board: &[BoardEntry],
    selected: &[usize],
    declared_value: u8,
    exclude: Option<usize>,
) -> BTreeSet<usize> {
    expand(board, selected, declared_value, false, exclude)
}

fn expand(
    board: &[BoardEntry],
    selected: &[usize],
    target: u8,
    complete_remainder: bool,
    exclude: Option<usize>,
) -> BTreeSet<usize> {
    let target = u32::from(target);
    let mut accepted: BTreeSet<usize> = selected
        .iter()
        .copied()
        .filter(|idx| Some(*idx) != exclude && *idx < board.len())
        .collect();
    if target == 0 {
        return accepted;
    }

    if complete_remainder {
        let selected_total: u32 = accepted.iter().map(|idx| board[*idx].value()).sum();
        let remainder = selected_total % target;
        if remainder != 0 {
            let pool = loose_pool(board, &accepted, exclude);
            let available: u32 = pool.iter().map(|(_, value)| value).sum();
            let mut missing = target - remainder;
            while missing <= available {
                if let Some(group) = smallest_group(&pool, missing) {
                    accepted.extend(group);
                    break;
                }
                missing += target;
            }
        }
    }

    for (idx, entry) in board.iter().enumerate() {
        if Some(idx) == exclude || accepted.contains(&idx) {
            continue;
        }
        if entry.value() == target {
            accepted.insert(idx);
        }
    }

    loop {
        let pool = loose_pool(board, &accepted, exclude);
        match smallest_group(&pool, target) {
            Some(group) => accepted.extend(group),
            None => break,
        }
    }

    accepted
}

/// Loose cards not yet accepted, as `(board index, face value)`.
fn loose_pool(
    board: &[BoardEntry],
    accepted: &BTreeSet<usize>,
    exclude: Option<usize>,
) -> Vec<(usize, u32)> {
    board
        .iter()
        .enumerate()
        .filter(|(idx, entry)| {
            !entry.is_stack() && Some(*idx) != exclude && !accepted.contains(idx)
        })
        .map(|(idx, entry)| (idx, entry.value()))
        .collect()
}

/// Smallest group of pool entries summing exactly to `target`; ties go to
/// the group that comes first in board order.
pub(crate) fn smallest_group(pool: &[(usize, u32)], target: u32) -> Option<Vec<usize>> {
    if target == 0 {
        return None;
    }
    let mut chosen = Vec::new();
    for size in 1..=pool.len() {
        if search(pool, 0, size, target, &mut chosen) {
            return Some(chosen.iter().map(|pos| pool[*pos].0).collect());
        }
    }
    None
}

fn search(
    pool: &[(usize, u32)],
    start: usize,
    size: usize,
    remaining: u32,
    chosen: &mut Vec<usize>,
) -> bool {
    if size == 0 {
        return remaining == 0;
    }
    for pos in start..pool.len() {
        let value = pool[pos].1;
        if value > remaining {
            continue;
        }
        chosen.push(pos);
        if search(pool, pos + 1, size - 1, remaining - value, chosen) {
            return true;
        }
        chosen.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::stack::Stack;
    use crate::state::Seat;

    fn loose(s: &str) -> BoardEntry {
        BoardEntry::Card(s.parse::<Card>().expect("valid card"))
    }

    #[test]
    fn pickup_completes_partial_selection() {
        let board = vec![loose("4d"), loose("5d"), loose("9c")];
        let resolved = expand_pickup(&board, &[0], 9);
        assert_eq!(resolved.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn completion_reaches_a_later_multiple() {
        // 3 cannot become 5, but 3 + 4 + 3 makes 10.
        let board = vec![loose("3h"), loose("4c"), loose("3s")];
        let resolved = expand_pickup(&board, &[0], 5);
        assert_eq!(resolved.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn completion_gives_up_when_no_multiple_is_reachable() {
        let board = vec![loose("7d"), loose("4c")];
        let resolved = expand_pickup(&board, &[0], 5);
        assert_eq!(resolved.into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn pickup_with_empty_selection_takes_all_matches() {
        let board = vec![
            loose("2h"),
            loose("Kc"),
            loose("7s"),
            loose("3d"),
            loose("10h"),
            loose("Jd"),
        ];
        // Only 2+7 reaches 9.
        let resolved = expand_pickup(&board, &[], 9);
        assert_eq!(resolved.into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn disjoint_groups_are_all_taken() {
        let board = vec![
            loose("4h"),
            loose("6c"),
            loose("3s"),
            loose("7d"),
            loose("10s"),
        ];
        let resolved = expand_pickup(&board, &[], 10);
        assert_eq!(resolved.len(), 5);
    }

    #[test]
    fn matching_stacks_are_included_but_never_split() {
        let stack = Stack::new(
            11,
            Seat::Plyr3,
            vec!["5h".parse().expect("card"), "6h".parse().expect("card")],
        );
        let board = vec![BoardEntry::Stack(stack), loose("Jc"), loose("8s")];
        let resolved = expand_pickup(&board, &[], 11);
        assert_eq!(resolved.into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn excluded_stack_is_left_alone() {
        let stack = Stack::new(
            10,
            Seat::Plyr1,
            vec!["4h".parse().expect("card"), "6h".parse().expect("card")],
        );
        let board = vec![BoardEntry::Stack(stack), loose("10c")];
        let resolved = expand_stack(&board, &[], 10, Some(0));
        assert_eq!(resolved.into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn smallest_group_prefers_fewer_cards() {
        let pool = vec![(0, 1), (1, 2), (2, 6), (3, 9)];
        assert_eq!(smallest_group(&pool, 9), Some(vec![3]));
        assert_eq!(smallest_group(&pool, 8), Some(vec![1, 2]));
        assert_eq!(smallest_group(&pool, 20), None);
    }
}
