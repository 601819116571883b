use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::action::Move;
use crate::card::{Card, full_deck};
use crate::deal::{DEFAULT_MAX_DEAL_ATTEMPTS, deal_opening, start_round};
use crate::error::{GameError, InvalidMove};
use crate::rules::{apply_move, legal_moves};
use crate::score::{RoundStatus, check_round_end};
use crate::state::{GameState, Phase, Seat, SeatView};

const DEFAULT_SEED: u64 = 0x5EE9_5EE9_5EE9_5EE9;

/// Configuration required to bootstrap a round.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub seed: u64,
    pub max_deal_attempts: usize,
}

impl GameConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_deal_attempts: DEFAULT_MAX_DEAL_ATTEMPTS,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Persists the canonical state after every accepted move.
pub trait SnapshotStore {
    fn save(&mut self, state: &GameState) -> Result<(), GameError>;
    fn load(&self) -> Result<Option<GameState>, GameError>;
}

/// Keeps the latest snapshot as bincode bytes in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    bytes: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_len(&self) -> usize {
        self.bytes.as_ref().map(Vec::len).unwrap_or(0)
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, state: &GameState) -> Result<(), GameError> {
        let bytes = bincode::serde::encode_to_vec(state, bincode::config::standard())
            .map_err(|err| GameError::Snapshot(err.to_string()))?;
        self.bytes = Some(bytes);
        Ok(())
    }

    fn load(&self) -> Result<Option<GameState>, GameError> {
        let Some(bytes) = self.bytes.as_ref() else {
            return Ok(None);
        };
        let (state, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|err| GameError::Snapshot(err.to_string()))?;
        Ok(Some(state))
    }
}

/// Notified whenever a seat becomes the one to act, e.g. to arm a move timer.
pub trait TurnObserver {
    fn turn_started(&mut self, seat: Seat, move_count: u32);
}

/// Builder that enables deterministic deck injection for tests and replays.
pub struct GameBuilder {
    config: GameConfig,
    deck: Option<Vec<Card>>,
    store: Option<Box<dyn SnapshotStore>>,
    observers: Vec<Box<dyn TurnObserver>>,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            deck: None,
            store: None,
            observers: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Deals `deck` front first without shuffling.
    pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
        self.deck = Some(deck);
        self
    }

    pub fn with_max_deal_attempts(mut self, attempts: usize) -> Self {
        self.config.max_deal_attempts = attempts;
        self
    }

    pub fn with_store(mut self, store: impl SnapshotStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_observer(mut self, observer: impl TurnObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        Game::from_builder(self)
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the canonical state of one round and feeds moves through the engine.
///
/// Submissions must be serialized by the caller; the container holds no locks.
pub struct Game {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
    store: Option<Box<dyn SnapshotStore>>,
    observers: Vec<Box<dyn TurnObserver>>,
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        GameBuilder {
            config,
            ..GameBuilder::new()
        }
        .build()
    }

    /// Resumes a round from the latest snapshot in `store`.
    pub fn restore(
        config: GameConfig,
        store: impl SnapshotStore + 'static,
    ) -> Result<Self, GameError> {
        let state = store
            .load()?
            .ok_or(GameError::InvalidConfiguration("no snapshot to restore"))?;
        state.check_conservation()?;
        info!(move_count = state.move_count, turn = %state.current_turn, "round restored");
        Ok(Self {
            config,
            state,
            rng: StdRng::seed_from_u64(config.seed),
            store: Some(Box::new(store)),
            observers: Vec::new(),
        })
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_turn(&self) -> Seat {
        self.state.current_turn
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn view(&self, seat: Seat) -> SeatView {
        self.state.view(seat)
    }

    pub fn status(&self) -> RoundStatus {
        check_round_end(&self.state)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status(), RoundStatus::Finished(_))
    }

    pub fn legal_moves(&self, seat: Seat) -> Result<Vec<Move>, GameError> {
        if self.state.is_round_over() {
            return Ok(Vec::new());
        }
        if seat != self.state.current_turn {
            return Err(GameError::NotPlayersTurn(seat));
        }
        Ok(legal_moves(&self.state))
    }

    /// Runs `mv` for `seat` through the engine and replaces the state on
    /// success. Human, bot and timer moves all come through here.
    pub fn submit(&mut self, seat: Seat, mv: Move) -> Result<(), GameError> {
        if self.state.is_round_over() {
            return Err(GameError::RoundOver);
        }
        if seat != self.state.current_turn {
            return Err(GameError::NotPlayersTurn(seat));
        }
        let next = match apply_move(&self.state, &mv) {
            Ok(next) => next,
            Err(err) => {
                warn!(%seat, kind = mv.kind(), %err, "move rejected");
                return Err(err);
            }
        };
        if let Some(store) = self.store.as_mut() {
            store.save(&next)?;
        }
        self.state = next;

        match self.status() {
            RoundStatus::Finished(result) => {
                info!(
                    team1 = result.scores.team1,
                    team2 = result.scores.team2,
                    outcome = ?result.outcome,
                    "round finished"
                );
            }
            RoundStatus::InProgress => self.notify_turn(),
        }
        Ok(())
    }

    /// Move produced when the seat in turn runs out of time: a throw-away of
    /// a random card from its hand, validated like any other move.
    pub fn timeout_move(&mut self) -> Result<(), GameError> {
        let seat = self.state.current_turn;
        let card = self
            .state
            .hand(seat)
            .choose(&mut self.rng)
            .copied()
            .ok_or(InvalidMove::EmptyHand)?;
        debug!(%seat, %card, "move timed out");
        self.submit(seat, Move::ThrowAway(card))
    }

    fn notify_turn(&mut self) {
        let seat = self.state.current_turn;
        let move_count = self.state.move_count;
        for observer in self.observers.iter_mut() {
            observer.turn_started(seat, move_count);
        }
    }

    fn from_builder(builder: GameBuilder) -> Result<Self, GameError> {
        let GameBuilder {
            config,
            deck,
            mut store,
            observers,
        } = builder;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let state = match deck {
            Some(deck) => deal_opening(deck)?,
            None => start_round(full_deck(), &mut rng, config.max_deal_attempts)?,
        };
        if let Some(store) = store.as_mut() {
            store.save(&state)?;
        }
        let mut game = Game {
            config,
            state,
            rng,
            store,
            observers,
        };
        game.notify_turn();
        Ok(game)
    }
}
