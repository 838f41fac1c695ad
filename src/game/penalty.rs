use std::fmt;

use serde::{Deserialize, Serialize};

use super::topology::CellId;

/// 惩罚延迟任务的凭据；每次猜错分配一个新值。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PenaltyTicket(pub u64);

impl fmt::Display for PenaltyTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cluster reset waiting for its delay to elapse. While one exists the game is locked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingPenalty {
    pub ticket: PenaltyTicket,
    pub cells: Vec<CellId>,
    pub delay_ms: u32,
}

impl PendingPenalty {
    pub fn drinks(&self) -> usize {
        self.cells.len()
    }
}
