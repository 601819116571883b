use std::fmt::Write;

use crate::action::Move;
use crate::card::Card;
use crate::state::{BoardEntry, Phase, Seat, SeatView, Team};

/// Customize view rendering for CLI visualization.
#[derive(Clone, Copy, Debug)]
pub struct VisualOptions {
    pub show_stack_members: bool,
    pub show_counts: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            show_stack_members: true,
            show_counts: true,
        }
    }
}

pub fn render_view(view: &SeatView) -> String {
    render_view_with_options(view, VisualOptions::default())
}

pub fn render_view_with_options(view: &SeatView, options: VisualOptions) -> String {
    let mut out = String::new();
    let phase = match view.phase {
        Phase::Calling => "Calling",
        Phase::Acting => "Acting",
        Phase::RoundEnd => "Round over",
    };
    let _ = writeln!(out, "Phase: {phase}  |  Move: {}", view.move_count);
    let call = view
        .call
        .map(|value| value.to_string())
        .unwrap_or_else(|| String::from("--"));
    let _ = writeln!(
        out,
        "Call: {call}  |  Turn: {}{}",
        view.current_turn,
        if view.current_turn == view.seat {
            " (You)"
        } else {
            ""
        }
    );
    for team in [Team::Team1, Team::Team2] {
        let _ = writeln!(
            out,
            "{team}: {} points, {} seeps",
            view.team_points[team.index()],
            view.seep_counts[team.index()]
        );
    }

    if !view.board_revealed {
        let _ = writeln!(out, "Board: (hidden until the call)");
    } else if view.board.is_empty() {
        let _ = writeln!(out, "Board: (empty)");
    } else {
        let _ = writeln!(out, "Board:");
        for (idx, entry) in view.board.iter().enumerate() {
            let text = match entry {
                BoardEntry::Card(card) => card.to_string(),
                BoardEntry::Stack(stack) if options.show_stack_members => {
                    let kind = if stack.is_tight() { "tight" } else { "loose" };
                    format!("{stack} [{kind}]")
                }
                BoardEntry::Stack(stack) => {
                    format!("Stack of {} (by {})", stack.declared_value, stack.creator)
                }
            };
            let _ = writeln!(out, "  [{idx}] {text}");
        }
    }

    if options.show_counts {
        let _ = writeln!(out, "Deck: {}", view.deck_count);
        for seat in Seat::ALL {
            let _ = writeln!(
                out,
                "  {seat}: {} in hand, {} collected",
                view.hand_sizes[seat.index()],
                view.collected_counts[seat.index()]
            );
        }
    }
    let _ = writeln!(out, "Hand: {}", format_cards(&view.hand));
    out
}

pub fn describe_move(view: &SeatView, mv: &Move) -> String {
    match mv {
        Move::Call(value) => format!("Call {value}"),
        Move::ThrowAway(card) => format!("Throw away {card}"),
        Move::Pickup { card, selected } => {
            if selected.is_empty() {
                format!("Pick up with {card}")
            } else {
                format!("Pick up {} with {card}", format_selection(view, selected))
            }
        }
        Move::CreateStack {
            card,
            selected,
            declared_value,
        } => {
            let value = declared_value
                .or(view.call)
                .map(|value| value.to_string())
                .unwrap_or_else(|| String::from("?"));
            format!(
                "Stack {card} + {} as {value}",
                format_selection(view, selected)
            )
        }
        Move::AddToStack {
            target,
            card,
            selected,
        } => {
            let target_desc = view
                .board
                .get(*target)
                .and_then(BoardEntry::as_stack)
                .map(|stack| format!("stack of {}", stack.declared_value))
                .unwrap_or_else(|| format!("board[{target}]"));
            if selected.is_empty() {
                format!("Add {card} to {target_desc}")
            } else {
                format!(
                    "Add {card} + {} to {target_desc}",
                    format_selection(view, selected)
                )
            }
        }
    }
}

fn format_selection(view: &SeatView, selected: &[usize]) -> String {
    selected
        .iter()
        .map(|idx| match view.board.get(*idx) {
            Some(BoardEntry::Card(card)) => card.to_string(),
            Some(BoardEntry::Stack(stack)) => format!("stack of {}", stack.declared_value),
            None => format!("board[{idx}]"),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

fn format_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        return String::from("(empty)");
    }
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
