use std::collections::BTreeSet;

use super::{
    board::Board,
    topology::{self, CellId},
};

/// Face-up cells reachable from `start` through adjacent face-up cells, `start` included.
///
/// Walks an explicit stack with a visited set; membership is all that matters,
/// so the result is an ordered set regardless of traversal order.
pub fn connected_face_up(board: &Board, start: CellId) -> BTreeSet<CellId> {
    let mut visited = BTreeSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        for neighbor in topology::neighbors(current) {
            if board.is_face_up(neighbor) && !visited.contains(&neighbor) {
                stack.push(neighbor);
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::Card;

    fn board(face_up: &[CellId]) -> Board {
        Board::arranged(&Card::standard_set(), face_up)
    }

    #[test]
    fn cluster_follows_face_up_edges() {
        let cluster = connected_face_up(&board(&[3, 4, 7]), 7);
        assert_eq!(cluster, BTreeSet::from([3, 4, 7]));
    }

    #[test]
    fn face_down_cells_break_the_chain() {
        // 2 is face-down, so 0 and 1 stay out of the cluster around 3
        let cluster = connected_face_up(&board(&[0, 1, 3, 4]), 3);
        assert_eq!(cluster, BTreeSet::from([3, 4]));
    }

    #[test]
    fn isolated_start_is_its_own_cluster() {
        let cluster = connected_face_up(&board(&[10, 0]), 10);
        assert_eq!(cluster, BTreeSet::from([10]));
    }

    #[test]
    fn whole_face_up_board_is_one_cluster_per_component() {
        let all: Vec<CellId> = (0..topology::CELL_COUNT as CellId).collect();
        let full = board(&all);
        // 6 links only to 9 and 11, 14 only to 17 and 19; the graph is still connected
        assert_eq!(connected_face_up(&full, 0).len(), topology::CELL_COUNT);
        assert_eq!(connected_face_up(&full, 14).len(), topology::CELL_COUNT);
    }
}
