use std::error::Error;
use std::process;

use clap::{ArgAction, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use seep::state::SEATS;
use seep::{
    Bot, Game, GameBuilder, GameError, HumanBot, Outcome, RandomBot, RoundStatus, Seat, Team,
    describe_move, render_view,
};

const DEFAULT_SEED: u64 = 0x5EE9_C0DE_0000_0001;

#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Play rounds of Seep between bots or humans.")]
struct Args {
    /// Number of rounds to play
    #[arg(short = 'r', long = "rounds", default_value_t = 1)]
    rounds: usize,

    /// Base RNG seed; each round derives its own deal from it
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Print every view and chosen move
    #[arg(long = "visualize", action = ArgAction::SetTrue)]
    visualize: bool,

    /// Bot specs for plyr1..plyr4: random[:seed] or human[:name]
    #[arg(value_name = "BOT")]
    bots: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let specs = if args.bots.is_empty() {
        vec![String::from("random"); SEATS]
    } else {
        args.bots.clone()
    };
    if specs.len() != SEATS {
        return Err(format!("expected {SEATS} bot specs, received {}", specs.len()).into());
    }

    let mut bots: Vec<Box<dyn Bot>> = Vec::with_capacity(SEATS);
    for (index, spec) in specs.iter().enumerate() {
        bots.push(create_bot(spec, index, args.seed)?);
    }

    let mut wins = [0usize; 2];
    let mut ties = 0usize;
    for round in 0..args.rounds {
        let round_seed = args.seed.wrapping_add(round as u64);
        let mut game = GameBuilder::new().with_seed(round_seed).build()?;
        info!(round, seed = round_seed, "round started");
        play_round(&mut game, &mut bots, args.visualize)?;

        let RoundStatus::Finished(result) = game.status() else {
            return Err(GameError::InvalidConfiguration("round stopped before completion").into());
        };
        match result.outcome {
            Outcome::Winner(team) => {
                wins[team.index()] += 1;
                println!(
                    "Round {}: team1 {} - team2 {}, {team} wins",
                    round + 1,
                    result.scores.team1,
                    result.scores.team2
                );
            }
            Outcome::Tie => {
                ties += 1;
                println!(
                    "Round {}: team1 {} - team2 {}, tie",
                    round + 1,
                    result.scores.team1,
                    result.scores.team2
                );
            }
        }
    }

    if args.rounds > 1 {
        println!(
            "\n{} rounds: {} {} wins, {} {} wins, {ties} ties",
            args.rounds,
            Team::Team1,
            wins[Team::Team1.index()],
            Team::Team2,
            wins[Team::Team2.index()]
        );
    }
    Ok(())
}

fn play_round(
    game: &mut Game,
    bots: &mut [Box<dyn Bot>],
    visualize: bool,
) -> Result<(), GameError> {
    while !game.is_finished() {
        let seat = game.current_turn();
        let view = game.view(seat);
        let legal = game.legal_moves(seat)?;
        if legal.is_empty() {
            return Err(GameError::InvalidConfiguration(
                "no legal moves available for current seat",
            ));
        }
        if visualize {
            println!("{}", render_view(&view));
        }
        let mv = bots[seat.index()].select_move(&view, &legal);
        if visualize {
            println!("{seat} plays: {}\n", describe_move(&view, &mv));
        }
        debug!(%seat, kind = mv.kind(), "bot moved");
        match game.submit(seat, mv) {
            Ok(()) => {}
            // Typed human moves can be rejected; the seat simply tries again.
            Err(err) if err.is_recoverable() => println!("Rejected: {err}"),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn create_bot(spec: &str, index: usize, seed: u64) -> Result<Box<dyn Bot>, Box<dyn Error>> {
    let seat = Seat::ALL[index];
    let spec_lower = spec.to_ascii_lowercase();
    if spec_lower.starts_with("human") {
        let name = spec
            .split_once(':')
            .map(|(_, name)| name.trim().to_string())
            .unwrap_or_else(|| format!("Human {seat}"));
        Ok(Box::new(HumanBot::new(name)))
    } else if spec_lower.starts_with("random") {
        let bot_seed = spec
            .split_once(':')
            .and_then(|(_, value)| value.parse::<u64>().ok())
            .unwrap_or(seed ^ ((index as u64 + 1) * 0x9E37_79B9));
        Ok(Box::new(RandomBot::new(StdRng::seed_from_u64(bot_seed))))
    } else {
        Err(format!("unrecognized bot spec: {spec}").into())
    }
}
