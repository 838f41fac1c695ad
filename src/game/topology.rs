//! 固定的棋盘拓扑：邻接边、四条轴线与格子角色。
//!
//! ```text
//!  0  1  2  3  4
//!  5  .  6  .  7
//!  8  9 10 11 12
//! 13  . 14  . 15
//! 16 17 18 19 20
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::board::Board;

pub type CellId = u8;

pub const CELL_COUNT: usize = 21;
pub const CENTER_ID: CellId = 10;
pub const OUTER_IDS: [CellId; 16] = [0, 1, 2, 3, 4, 5, 7, 8, 12, 13, 15, 16, 17, 18, 19, 20];
pub const INNER_EDGE_IDS: [CellId; 4] = [6, 9, 11, 14];
pub const CORNER_IDS: [CellId; 4] = [0, 4, 16, 20];

pub const EDGES: [(CellId, CellId); 24] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (4, 7),
    (5, 8),
    (6, 9),
    (6, 11),
    (7, 12),
    (8, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (8, 13),
    (12, 15),
    (13, 16),
    (14, 17),
    (14, 19),
    (15, 20),
    (16, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Two horizontal then two vertical axis-lines, each ordered end to end.
pub const LINES: [[CellId; 5]; 4] = [
    [0, 1, 2, 3, 4],
    [16, 17, 18, 19, 20],
    [0, 5, 8, 13, 16],
    [4, 7, 12, 15, 20],
];

/// Row-major 5x5 layout; `None` marks the four empty slots.
pub const GRID: [Option<CellId>; 25] = [
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    None,
    Some(6),
    None,
    Some(7),
    Some(8),
    Some(9),
    Some(10),
    Some(11),
    Some(12),
    Some(13),
    None,
    Some(14),
    None,
    Some(15),
    Some(16),
    Some(17),
    Some(18),
    Some(19),
    Some(20),
];

static ADJACENCY: Lazy<[[bool; CELL_COUNT]; CELL_COUNT]> = Lazy::new(|| {
    let mut matrix = [[false; CELL_COUNT]; CELL_COUNT];
    for (a, b) in EDGES {
        matrix[a as usize][b as usize] = true;
        matrix[b as usize][a as usize] = true;
    }
    matrix
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CellRole {
    Outer,
    InnerEdge,
    Center,
}

pub fn role_of(id: CellId) -> Option<CellRole> {
    if id == CENTER_ID {
        Some(CellRole::Center)
    } else if INNER_EDGE_IDS.contains(&id) {
        Some(CellRole::InnerEdge)
    } else if OUTER_IDS.contains(&id) {
        Some(CellRole::Outer)
    } else {
        None
    }
}

pub fn is_corner(id: CellId) -> bool {
    CORNER_IDS.contains(&id)
}

pub fn is_adjacent(a: CellId, b: CellId) -> bool {
    let (a, b) = (a as usize, b as usize);
    a < CELL_COUNT && b < CELL_COUNT && ADJACENCY[a][b]
}

pub fn neighbors(id: CellId) -> impl Iterator<Item = CellId> {
    (0..CELL_COUNT as CellId).filter(move |other| is_adjacent(id, *other))
}

/// Inclusive rank range spanned by two face-up cells flanking a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankWindow {
    pub min: u8,
    pub max: u8,
}

impl RankWindow {
    pub fn spanning(a: u8, b: u8) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, rank: u8) -> bool {
        (self.min..=self.max).contains(&rank)
    }
}

/// Betweenness window for `id`.
///
/// The first axis-line where both immediate neighbours of `id` are face-up
/// defines the window. A cell flanked by two corners has no window.
pub fn betweenness(id: CellId, board: &Board) -> Option<RankWindow> {
    for line in LINES.iter() {
        let Some(index) = line.iter().position(|cell| *cell == id) else {
            continue;
        };
        if index == 0 || index + 1 >= line.len() {
            continue;
        }
        let (prev, next) = (line[index - 1], line[index + 1]);
        let (Some(prev_rank), Some(next_rank)) =
            (board.face_up_rank(prev), board.face_up_rank(next))
        else {
            continue;
        };
        if is_corner(prev) && is_corner(next) {
            return None;
        }
        return Some(RankWindow::spanning(prev_rank, next_rank));
    }
    None
}
