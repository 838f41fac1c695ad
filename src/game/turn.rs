use serde::{Deserialize, Serialize};

use super::rules::RuleError;

/// 玩家轮转与连续猜对计数。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnState {
    #[serde(default)]
    players: Vec<String>,
    #[serde(default)]
    current: usize,
    #[serde(default)]
    streak: u32,
}

impl TurnState {
    /// Validates and fixes the roster. Names are trimmed; blanks and duplicates are rejected.
    pub fn register<I, S>(&mut self, names: I) -> Result<&[String], RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.players.is_empty() {
            return Err(RuleError::PlayersAlreadyRegistered);
        }

        let mut roster: Vec<String> = Vec::new();
        for name in names {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() {
                return Err(RuleError::BlankPlayerName);
            }
            if roster.iter().any(|existing| existing == trimmed) {
                return Err(RuleError::DuplicatePlayer {
                    name: trimmed.to_string(),
                });
            }
            roster.push(trimmed.to_string());
        }
        if roster.is_empty() {
            return Err(RuleError::NoPlayers);
        }

        self.players = roster;
        self.current = 0;
        self.streak = 0;
        Ok(&self.players)
    }

    pub fn is_registered(&self) -> bool {
        !self.players.is_empty()
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> Option<&str> {
        self.players.get(self.current).map(String::as_str)
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn record_correct(&mut self) -> u32 {
        self.streak += 1;
        self.streak
    }

    pub fn reset_streak(&mut self) {
        self.streak = 0;
    }

    pub fn has_earned_pass(&self, required: u32) -> bool {
        self.streak >= required
    }

    /// Hands the turn to the next player cyclically; returns the new index.
    pub fn advance(&mut self) -> usize {
        if !self.players.is_empty() {
            self.current = (self.current + 1) % self.players.len();
        }
        self.streak = 0;
        self.current
    }
}
