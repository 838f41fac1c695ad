use serde::{Deserialize, Serialize};

use super::{
    card::Card,
    deck::Deck,
    rules::RuleError,
    topology::{self, CellId, CELL_COUNT},
};

/// 棋盘上的一个格子。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub card: Card,
    #[serde(rename = "faceUp")]
    pub face_up: bool,
}

/// The 21 cells, indexed by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// Deals one card per cell from the top of `deck`; corners land face-up.
    pub fn deal(deck: &mut Deck) -> Result<Self, RuleError> {
        if deck.len() < CELL_COUNT {
            return Err(RuleError::EmptyDeck);
        }
        let mut cells = Vec::with_capacity(CELL_COUNT);
        for id in 0..CELL_COUNT as CellId {
            cells.push(Cell {
                id,
                card: deck.draw()?,
                face_up: topology::is_corner(id),
            });
        }
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id as usize)
    }

    pub(crate) fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id as usize)
    }

    pub fn is_face_up(&self, id: CellId) -> bool {
        self.get(id).map(|cell| cell.face_up).unwrap_or(false)
    }

    /// Rank of the card at `id` when it is face-up.
    pub fn face_up_rank(&self, id: CellId) -> Option<u8> {
        self.get(id)
            .filter(|cell| cell.face_up)
            .map(|cell| cell.card.rank())
    }

    pub fn all_face_up(&self, ids: &[CellId]) -> bool {
        ids.iter().all(|id| self.is_face_up(*id))
    }

    pub fn face_up_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.face_up)
            .map(|cell| cell.id)
    }

    pub fn flip_up(&mut self, id: CellId) -> Option<Card> {
        let cell = self.get_mut(id)?;
        cell.face_up = true;
        Some(cell.card)
    }

    /// Replaces the card at `id`; corners are turned face-up, everything else face-down.
    pub(crate) fn redeal(&mut self, id: CellId, card: Card) {
        if let Some(cell) = self.get_mut(id) {
            cell.card = card;
            cell.face_up = topology::is_corner(id);
        }
    }

    /// Board dealt in id order from `cards`, with exactly `face_up` revealed.
    #[cfg(test)]
    pub(crate) fn arranged(cards: &[Card], face_up: &[CellId]) -> Self {
        let cells = cards
            .iter()
            .take(CELL_COUNT)
            .enumerate()
            .map(|(index, card)| Cell {
                id: index as CellId,
                card: *card,
                face_up: face_up.contains(&(index as CellId)),
            })
            .collect();
        Self { cells }
    }
}
