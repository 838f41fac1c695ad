//! 游戏核心逻辑模块（棋盘拓扑、牌堆、规则引擎等）。

pub mod board;
pub mod card;
pub mod cluster;
pub mod deck;
pub mod penalty;
pub mod rules;
pub mod state;
pub mod topology;
pub mod turn;

pub use board::{Board, Cell};
pub use card::{Card, Suit, Value};
pub use cluster::connected_face_up;
pub use deck::Deck;
pub use penalty::{PenaltyTicket, PendingPenalty};
pub use rules::{GuessToken, InvalidGuessReason, RuleEngine, RuleError, RuleResolution};
pub use state::{Anchor, GameEvent, GameSnapshot, GameState, IntegrityError, StatusMessage};
pub use topology::{CellId, CellRole, RankWindow};
pub use turn::TurnState;
