use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::{
    board::{Board, Cell},
    card::Card,
    deck::Deck,
    penalty::{PenaltyTicket, PendingPenalty},
    topology::{CellId, CELL_COUNT, INNER_EDGE_IDS, OUTER_IDS},
    turn::TurnState,
};

const STANDARD_DECK_SIZE: usize = 52;

/// 当前提示信息，序列化为展示层约定的短字符串。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "String", try_from = "String")]
pub enum StatusMessage {
    ChooseToStart,
    CorrectContinue,
    Wrong { drinks: usize },
    Ready,
    Finished,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::ChooseToStart => f.write_str("choose-to-start"),
            StatusMessage::CorrectContinue => f.write_str("correct-continue"),
            StatusMessage::Wrong { drinks } => write!(f, "wrong:{drinks}"),
            StatusMessage::Ready => f.write_str("ready"),
            StatusMessage::Finished => f.write_str("finished"),
        }
    }
}

impl FromStr for StatusMessage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "choose-to-start" => Ok(StatusMessage::ChooseToStart),
            "correct-continue" => Ok(StatusMessage::CorrectContinue),
            "ready" => Ok(StatusMessage::Ready),
            "finished" => Ok(StatusMessage::Finished),
            other => other
                .strip_prefix("wrong:")
                .and_then(|count| count.parse().ok())
                .map(|drinks| StatusMessage::Wrong { drinks })
                .ok_or_else(|| format!("unknown status message `{other}`")),
        }
    }
}

impl From<StatusMessage> for String {
    fn from(message: StatusMessage) -> Self {
        message.to_string()
    }
}

impl TryFrom<String> for StatusMessage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::ChooseToStart
    }
}

/// 上一张猜对（或被选为起点）的牌，高低比较的基准。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Anchor {
    pub cell: CellId,
    pub card: Card,
}

/// 游戏事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    Dealt {
        face_up: Vec<CellId>,
    },
    PlayersRegistered {
        players: Vec<String>,
    },
    StartCardSelected {
        cell: CellId,
        card: Card,
    },
    CardRevealed {
        cell: CellId,
        card: Card,
    },
    GuessCorrect {
        cell: CellId,
        streak: u32,
    },
    GuessWrong {
        cell: CellId,
        drinks: usize,
        cluster: Vec<CellId>,
    },
    PenaltyScheduled {
        ticket: PenaltyTicket,
        delay_ms: u32,
    },
    CellsRedealt {
        ticket: PenaltyTicket,
        cells: Vec<CellId>,
    },
    Ready,
    GameFinished,
    TurnPassed {
        from: String,
        to: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("board holds {count} cells")]
    CellCount { count: usize },
    #[error("cell at index {index} carries id {id}")]
    CellIdMismatch { index: usize, id: CellId },
    #[error("card {card} is present more than once")]
    DuplicateCard { card: Card },
    #[error("board and deck hold {count} cards together")]
    CardCount { count: usize },
}

/// 游戏整体状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub deck: Deck,
    #[serde(default)]
    pub turns: TurnState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub message: StatusMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_penalty: Option<PendingPenalty>,
    #[serde(default)]
    pub penalties_issued: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new(board: Board, deck: Deck) -> Self {
        Self {
            board,
            deck,
            turns: TurnState::default(),
            anchor: None,
            locked: false,
            finished: false,
            message: StatusMessage::ChooseToStart,
            pending_penalty: None,
            penalties_issued: 0,
            event_log: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn cells(&self) -> &[Cell] {
        self.board.cells()
    }

    pub fn current_player(&self) -> Option<&str> {
        self.turns.current_player()
    }

    pub fn streak(&self) -> u32 {
        self.turns.streak()
    }

    pub fn all_outer_face_up(&self) -> bool {
        self.board.all_face_up(&OUTER_IDS)
    }

    pub fn all_inner_face_up(&self) -> bool {
        self.board.all_face_up(&INNER_EDGE_IDS)
    }

    pub(crate) fn next_ticket(&mut self) -> PenaltyTicket {
        self.penalties_issued += 1;
        PenaltyTicket(self.penalties_issued)
    }

    /// Board and deck together must hold the 52-card deck exactly once.
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let cells = self.board.cells();
        if cells.len() != CELL_COUNT {
            return Err(IntegrityError::CellCount { count: cells.len() });
        }
        for (index, cell) in cells.iter().enumerate() {
            if cell.id as usize != index {
                return Err(IntegrityError::CellIdMismatch { index, id: cell.id });
            }
        }

        let mut seen = HashSet::with_capacity(STANDARD_DECK_SIZE);
        for card in cells
            .iter()
            .map(|cell| &cell.card)
            .chain(self.deck.cards().iter())
        {
            if !seen.insert(*card) {
                return Err(IntegrityError::DuplicateCard { card: *card });
            }
        }
        if seen.len() != STANDARD_DECK_SIZE {
            return Err(IntegrityError::CardCount { count: seen.len() });
        }

        Ok(())
    }

    /// Moves `card` onto cell `id`, sending the displaced card to wherever `card` came from.
    #[cfg(test)]
    pub(crate) fn rig_cell(&mut self, id: CellId, card: Card, face_up: bool) {
        let displaced = self.board.get(id).map(|cell| cell.card).expect("cell exists");
        if displaced != card && !self.deck.exchange(card, displaced) {
            let source = self
                .board
                .cells()
                .iter()
                .find(|cell| cell.card == card)
                .map(|cell| cell.id)
                .expect("card is on the board or in the deck");
            if let Some(cell) = self.board.get_mut(source) {
                cell.card = displaced;
            }
        }
        if let Some(cell) = self.board.get_mut(id) {
            cell.card = card;
            cell.face_up = face_up;
        }
    }

    #[cfg(test)]
    pub(crate) fn set_face_up(&mut self, ids: &[CellId], face_up: bool) {
        for id in ids {
            if let Some(cell) = self.board.get_mut(*id) {
                cell.face_up = face_up;
            }
        }
    }
}

/// 展示层读取的只读快照（不含牌堆）。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub cells: Vec<Cell>,
    pub players: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<String>,
    pub message: StatusMessage,
    pub locked: bool,
    pub finished: bool,
    pub streak: u32,
    pub can_pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_penalty: Option<PenaltyTicket>,
    pub deck_remaining: usize,
}
