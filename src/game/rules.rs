use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

use super::{
    board::Board,
    card::Suit,
    cluster,
    deck::Deck,
    penalty::{PenaltyTicket, PendingPenalty},
    state::{Anchor, GameEvent, GameSnapshot, GameState, IntegrityError, StatusMessage},
    topology::{self, CellId, CellRole, RankWindow},
};

/// 玩家针对某个格子的猜测。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "String", try_from = "String")]
pub enum GuessToken {
    Higher,
    Lower,
    Inside,
    Outside,
    Red,
    Black,
    Suit(Suit),
}

impl GuessToken {
    pub const SUITS: [GuessToken; 4] = [
        GuessToken::Suit(Suit::Spades),
        GuessToken::Suit(Suit::Hearts),
        GuessToken::Suit(Suit::Clubs),
        GuessToken::Suit(Suit::Diamonds),
    ];
}

impl fmt::Display for GuessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessToken::Higher => f.write_str("higher"),
            GuessToken::Lower => f.write_str("lower"),
            GuessToken::Inside => f.write_str("inside"),
            GuessToken::Outside => f.write_str("outside"),
            GuessToken::Red => f.write_str("red"),
            GuessToken::Black => f.write_str("black"),
            GuessToken::Suit(suit) => f.write_str(suit.name()),
        }
    }
}

impl FromStr for GuessToken {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "higher" => Ok(GuessToken::Higher),
            "lower" => Ok(GuessToken::Lower),
            "inside" => Ok(GuessToken::Inside),
            "outside" => Ok(GuessToken::Outside),
            "red" => Ok(GuessToken::Red),
            "black" => Ok(GuessToken::Black),
            _ => Suit::parse(s)
                .map(GuessToken::Suit)
                .ok_or_else(|| RuleError::UnknownToken {
                    token: s.to_string(),
                }),
        }
    }
}

impl From<GuessToken> for String {
    fn from(token: GuessToken) -> Self {
        token.to_string()
    }
}

impl TryFrom<String> for GuessToken {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum InvalidGuessReason {
    #[error("{role:?} cell accepts {expected:?}")]
    TokenNotAccepted {
        role: CellRole,
        expected: Vec<GuessToken>,
    },
    #[error("higher/lower needs a start card")]
    NoAnchor,
    #[error("start card must already be face-up")]
    StartCardHidden,
    #[error("that guess is not offered yet")]
    OutOfOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("the deck is empty")]
    EmptyDeck,
    #[error("invalid guess on cell {cell}: {reason}")]
    InvalidGuess {
        cell: CellId,
        reason: InvalidGuessReason,
    },
    #[error("the board is locked until the penalty resolves")]
    Locked,
    #[error("the game is finished")]
    GameFinished,
    #[error("cell {cell} does not exist")]
    UnknownCell { cell: CellId },
    #[error("cell {cell} is already face-up")]
    CellAlreadyFaceUp { cell: CellId },
    #[error("`{token}` is not a guess")]
    UnknownToken { token: String },
    #[error("players have not been registered")]
    PlayersNotRegistered,
    #[error("players are already registered")]
    PlayersAlreadyRegistered,
    #[error("at least one player is required")]
    NoPlayers,
    #[error("player names cannot be blank")]
    BlankPlayerName,
    #[error("player `{name}` is already registered")]
    DuplicatePlayer { name: String },
    #[error("{actual} correct guesses in a row, {required} needed to pass")]
    StreakTooShort { required: u32, actual: u32 },
    #[error("no pending penalty matches ticket {ticket}")]
    NoPendingPenalty { ticket: PenaltyTicket },
    #[error("integrity violation: {error}")]
    IntegrityViolation { error: IntegrityError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub snapshot: GameSnapshot,
    pub events: Vec<GameEvent>,
}

impl RuleResolution {
    pub fn new(snapshot: GameSnapshot, events: Vec<GameEvent>) -> Self {
        Self { snapshot, events }
    }
}

pub struct RuleEngine {
    config: EngineConfig,
    rng: SmallRng,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    fn ensure_unlocked(state: &GameState) -> Result<(), RuleError> {
        if state.locked {
            return Err(RuleError::Locked);
        }
        Ok(())
    }

    fn ensure_in_play(state: &GameState) -> Result<(), RuleError> {
        Self::ensure_integrity(state)?;
        Self::ensure_unlocked(state)?;
        if state.finished {
            return Err(RuleError::GameFinished);
        }
        if !state.turns.is_registered() {
            return Err(RuleError::PlayersNotRegistered);
        }
        Ok(())
    }

    /// Shuffles a fresh deck and deals the 21 cells, corners face-up.
    pub fn deal(&mut self) -> Result<GameState, RuleError> {
        let mut deck = Deck::shuffled(&mut self.rng);
        let board = Board::deal(&mut deck)?;
        let mut state = GameState::new(board, deck);
        let face_up: Vec<CellId> = state.board.face_up_ids().collect();
        state.record_event(GameEvent::Dealt { face_up });
        Self::ensure_integrity(&state)?;
        info!("dealt a new board, {} cards left in the deck", state.deck.len());
        Ok(state)
    }

    pub fn register_players<I, S>(
        &mut self,
        state: &mut GameState,
        names: I,
    ) -> Result<Vec<GameEvent>, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::ensure_integrity(state)?;
        Self::ensure_unlocked(state)?;

        let players = state.turns.register(names)?.to_vec();
        info!("registered {} players", players.len());

        let event = GameEvent::PlayersRegistered { players };
        state.record_event(event.clone());
        Ok(vec![event])
    }

    /// Uses the card at `cell` as the higher/lower baseline.
    ///
    /// Face-down cells are accepted unless `require_face_up_start` is set.
    pub fn select_start_card(
        &mut self,
        state: &mut GameState,
        cell: CellId,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_in_play(state)?;

        let selected = *state.board.get(cell).ok_or(RuleError::UnknownCell { cell })?;
        if self.config.require_face_up_start && !selected.face_up {
            return Err(RuleError::InvalidGuess {
                cell,
                reason: InvalidGuessReason::StartCardHidden,
            });
        }

        state.anchor = Some(Anchor {
            cell,
            card: selected.card,
        });
        debug!("start card {} on cell {cell}", selected.card);

        let event = GameEvent::StartCardSelected {
            cell,
            card: selected.card,
        };
        state.record_event(event.clone());
        Ok(vec![event])
    }

    /// Guesses the kind accepted by `cell` given the current board.
    fn accepted_tokens(role: CellRole, window: Option<RankWindow>) -> Vec<GuessToken> {
        match (role, window) {
            (CellRole::Outer, Some(_)) => vec![GuessToken::Inside, GuessToken::Outside],
            (CellRole::Outer, None) => vec![GuessToken::Higher, GuessToken::Lower],
            (CellRole::InnerEdge, _) => vec![GuessToken::Red, GuessToken::Black],
            (CellRole::Center, _) => GuessToken::SUITS.to_vec(),
        }
    }

    /// Guesses the table offers right now for `cell`; empty when the cell cannot be played.
    pub fn available_guesses(&self, state: &GameState, cell: CellId) -> Vec<GuessToken> {
        if state.locked || state.finished || state.board.is_face_up(cell) {
            return Vec::new();
        }
        let Some(role) = topology::role_of(cell) else {
            return Vec::new();
        };

        let unlocked = match role {
            CellRole::Outer => state
                .anchor
                .map(|anchor| topology::is_adjacent(anchor.cell, cell))
                .unwrap_or(false),
            CellRole::InnerEdge => state.all_outer_face_up(),
            CellRole::Center => state.all_inner_face_up(),
        };
        if !unlocked {
            return Vec::new();
        }
        Self::accepted_tokens(role, topology::betweenness(cell, &state.board))
    }

    /// Decides the guess without touching the state.
    fn judge(
        state: &GameState,
        cell: CellId,
        role: CellRole,
        token: GuessToken,
    ) -> Result<bool, RuleError> {
        let window = match role {
            CellRole::Outer => topology::betweenness(cell, &state.board),
            _ => None,
        };
        let expected = Self::accepted_tokens(role, window);
        if !expected.contains(&token) {
            return Err(RuleError::InvalidGuess {
                cell,
                reason: InvalidGuessReason::TokenNotAccepted { role, expected },
            });
        }

        let card = state
            .board
            .get(cell)
            .map(|cell| cell.card)
            .ok_or(RuleError::UnknownCell { cell })?;
        let rank = card.rank();

        let correct = match (token, window) {
            (GuessToken::Inside, Some(window)) => window.contains(rank),
            (GuessToken::Outside, Some(window)) => !window.contains(rank),
            (GuessToken::Higher | GuessToken::Lower, _) => {
                let anchor = state.anchor.ok_or(RuleError::InvalidGuess {
                    cell,
                    reason: InvalidGuessReason::NoAnchor,
                })?;
                let baseline = anchor.card.rank();
                if token == GuessToken::Higher {
                    rank > baseline
                } else {
                    rank < baseline
                }
            }
            (GuessToken::Red, _) => card.is_red(),
            (GuessToken::Black, _) => !card.is_red(),
            (GuessToken::Suit(suit), _) => card.suit == suit,
            (GuessToken::Inside | GuessToken::Outside, None) => {
                return Err(RuleError::InvalidGuess {
                    cell,
                    reason: InvalidGuessReason::TokenNotAccepted { role, expected },
                })
            }
        };
        Ok(correct)
    }

    /// Resolves a guess on `cell`. The cell is revealed whatever the outcome.
    ///
    /// A wrong guess locks the state and leaves a [`PendingPenalty`] that must be
    /// settled with [`RuleEngine::resolve_penalty`] once its delay has elapsed.
    pub fn evaluate_guess(
        &mut self,
        state: &mut GameState,
        cell: CellId,
        token: GuessToken,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_in_play(state)?;

        let role = topology::role_of(cell).ok_or(RuleError::UnknownCell { cell })?;
        if state.board.is_face_up(cell) {
            return Err(RuleError::CellAlreadyFaceUp { cell });
        }
        if self.config.enforce_reveal_order && !self.available_guesses(state, cell).contains(&token)
        {
            return Err(RuleError::InvalidGuess {
                cell,
                reason: InvalidGuessReason::OutOfOrder,
            });
        }

        let correct = Self::judge(state, cell, role, token)?;

        let mut events = Vec::new();
        let card = state
            .board
            .flip_up(cell)
            .ok_or(RuleError::UnknownCell { cell })?;
        events.push(GameEvent::CardRevealed { cell, card });
        info!("cell {cell} guessed {token}: {card} is {}", if correct { "right" } else { "wrong" });

        if correct {
            state.anchor = Some(Anchor { cell, card });
            let streak = state.turns.record_correct();
            events.push(GameEvent::GuessCorrect { cell, streak });

            if role == CellRole::Center && state.all_outer_face_up() && state.all_inner_face_up() {
                state.finished = true;
                state.message = StatusMessage::Finished;
                events.push(GameEvent::GameFinished);
                info!("board completed");
            } else {
                state.message = StatusMessage::CorrectContinue;
            }
        } else {
            let cluster: Vec<CellId> = cluster::connected_face_up(&state.board, cell)
                .into_iter()
                .collect();
            let drinks = cluster.len();
            let ticket = state.next_ticket();
            let delay_ms = self.config.penalty_delay_ms;

            state.turns.reset_streak();
            state.locked = true;
            state.message = StatusMessage::Wrong { drinks };
            state.pending_penalty = Some(PendingPenalty {
                ticket,
                cells: cluster.clone(),
                delay_ms,
            });

            events.push(GameEvent::GuessWrong {
                cell,
                drinks,
                cluster,
            });
            events.push(GameEvent::PenaltyScheduled { ticket, delay_ms });
            debug!("penalty {ticket} scheduled in {delay_ms}ms for {drinks} cells");
        }

        for event in &events {
            state.record_event(event.clone());
        }
        Ok(events)
    }

    /// Returns the penalised cluster to the deck, reshuffles and redeals it.
    ///
    /// Only the ticket of the current pending penalty is accepted, so a repeated
    /// or stale call fails without changing anything.
    pub fn resolve_penalty(
        &mut self,
        state: &mut GameState,
        ticket: PenaltyTicket,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;

        let current = state.pending_penalty.as_ref().map(|pending| pending.ticket);
        if current != Some(ticket) {
            warn!("ignoring penalty {ticket}: not pending");
            return Err(RuleError::NoPendingPenalty { ticket });
        }
        let Some(pending) = state.pending_penalty.take() else {
            return Err(RuleError::NoPendingPenalty { ticket });
        };

        let returned: Vec<_> = pending
            .cells
            .iter()
            .filter_map(|id| state.board.get(*id).map(|cell| cell.card))
            .collect();
        state.deck.return_and_reshuffle(returned, &mut self.rng);
        for id in &pending.cells {
            let card = state.deck.draw()?;
            state.board.redeal(*id, card);
        }

        state.anchor = None;
        state.locked = false;
        state.message = StatusMessage::Ready;

        let events = vec![
            GameEvent::CellsRedealt {
                ticket,
                cells: pending.cells,
            },
            GameEvent::Ready,
        ];
        for event in &events {
            state.record_event(event.clone());
        }
        debug!("penalty {ticket} resolved");
        Ok(events)
    }

    pub fn can_pass(&self, state: &GameState) -> bool {
        !state.locked
            && !state.finished
            && state.turns.is_registered()
            && state.turns.has_earned_pass(self.config.min_streak_to_pass)
    }

    /// Hands the turn on after enough correct guesses in a row.
    pub fn next_player(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_in_play(state)?;

        let required = self.config.min_streak_to_pass;
        if !state.turns.has_earned_pass(required) {
            return Err(RuleError::StreakTooShort {
                required,
                actual: state.turns.streak(),
            });
        }

        let from = state.current_player().unwrap_or_default().to_string();
        state.turns.advance();
        let to = state.current_player().unwrap_or_default().to_string();
        state.anchor = None;
        state.message = StatusMessage::ChooseToStart;
        info!("turn passes from {from} to {to}");

        let event = GameEvent::TurnPassed { from, to };
        state.record_event(event.clone());
        Ok(vec![event])
    }

    pub fn snapshot(&self, state: &GameState) -> GameSnapshot {
        GameSnapshot {
            cells: state.cells().to_vec(),
            players: state.turns.players().to_vec(),
            current_player: state.current_player().map(str::to_string),
            message: state.message,
            locked: state.locked,
            finished: state.finished,
            streak: state.streak(),
            can_pass: self.can_pass(state),
            anchor: state.anchor,
            pending_penalty: state.pending_penalty.as_ref().map(|pending| pending.ticket),
            deck_remaining: state.deck.len(),
        }
    }

    pub fn resolution(&self, state: &GameState, events: Vec<GameEvent>) -> RuleResolution {
        RuleResolution::new(self.snapshot(state), events)
    }
}
