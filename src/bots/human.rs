use std::io::{self, BufRead, Write};

use crate::action::Move;
use crate::bot::Bot;
use crate::card::Card;
use crate::state::SeatView;
use crate::visualize::{describe_move, render_view};

const HELP: &str = "\
Enter a listed move number, or type a move:
  call <value>                  e.g. call 9
  throw <card>                  e.g. throw 9s
  pick <card> [idx ...]         e.g. pick 9s 0 2
  stack <card> [idx ...] [as <value>]
  add <target> <card> [idx ...]
Board entries are numbered; pickups and stacks pull in every other matching
card on their own. 'q' quits.";

/// Seat driven from standard input.
///
/// Typed moves may select more board entries than the listed ones; the engine
/// validates them like any other move.
pub struct HumanBot {
    name: String,
}

impl HumanBot {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for HumanBot {
    fn default() -> Self {
        Self::new("Human")
    }
}

impl Bot for HumanBot {
    fn select_move(&mut self, view: &SeatView, legal_moves: &[Move]) -> Move {
        println!("\n=== {} ({}) ===", self.name, view.seat);
        println!("{}", render_view(view));
        for (index, mv) in legal_moves.iter().enumerate() {
            println!("  [{index}] {}", describe_move(view, mv));
        }
        let stdin = io::stdin();
        loop {
            print!("{}> ", view.seat);
            let _ = io::stdout().flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => std::process::exit(0),
                Ok(_) => {}
            }
            let input = line.trim();
            match input {
                "" => continue,
                "q" | "quit" => std::process::exit(0),
                "help" | "?" => {
                    println!("{HELP}");
                    continue;
                }
                _ => {}
            }
            if let Ok(choice) = input.parse::<usize>() {
                match legal_moves.get(choice) {
                    Some(mv) => return mv.clone(),
                    None => {
                        println!("No move numbered {choice}.");
                        continue;
                    }
                }
            }
            match parse_move(input) {
                Ok(mv) => return mv,
                Err(reason) => println!("{reason} (type 'help')"),
            }
        }
    }
}

/// Parses the typed move syntax listed in the help text.
pub fn parse_move(input: &str) -> Result<Move, String> {
    let mut words = input.split_whitespace();
    let verb = words.next().ok_or_else(|| String::from("empty input"))?;
    let rest: Vec<&str> = words.collect();
    match verb.to_ascii_lowercase().as_str() {
        "call" => match rest.as_slice() {
            [value] => Ok(Move::Call(parse_number(value)?)),
            _ => Err(String::from("usage: call <value>")),
        },
        "throw" => match rest.as_slice() {
            [card] => Ok(Move::ThrowAway(parse_card(card)?)),
            _ => Err(String::from("usage: throw <card>")),
        },
        "pick" => {
            let (card, indices) = rest.split_first().ok_or("usage: pick <card> [idx ...]")?;
            Ok(Move::Pickup {
                card: parse_card(card)?,
                selected: parse_indices(indices)?,
            })
        }
        "stack" => {
            let (card, tail) = rest.split_first().ok_or("usage: stack <card> [idx ...]")?;
            let (indices, declared_value) = match tail {
                [indices @ .., as_word, value] if as_word.eq_ignore_ascii_case("as") => {
                    (indices, Some(parse_number(value)?))
                }
                indices => (indices, None),
            };
            Ok(Move::CreateStack {
                card: parse_card(card)?,
                selected: parse_indices(indices)?,
                declared_value,
            })
        }
        "add" => match rest.as_slice() {
            [target, card, indices @ ..] => Ok(Move::AddToStack {
                target: parse_number(target)?,
                card: parse_card(card)?,
                selected: parse_indices(indices)?,
            }),
            _ => Err(String::from("usage: add <target> <card> [idx ...]")),
        },
        other => Err(format!("unknown move '{other}'")),
    }
}

fn parse_card(text: &str) -> Result<Card, String> {
    text.parse()
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T, String> {
    text.parse().map_err(|_| format!("'{text}' is not a number"))
}

fn parse_indices(texts: &[&str]) -> Result<Vec<usize>, String> {
    texts.iter().map(|text| parse_number(text)).collect()
}
