use serde::{Deserialize, Serialize};

pub const DEFAULT_PENALTY_DELAY_MS: u32 = 2_000;
pub const DEFAULT_MIN_STREAK_TO_PASS: u32 = 2;

/// 规则引擎的可调参数，可由前端以 JSON 传入。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Pause between a wrong guess and the cluster being redealt.
    pub penalty_delay_ms: u32,
    /// Correct guesses in a row before the turn may be passed on.
    pub min_streak_to_pass: u32,
    /// Reject a start card that is still face-down.
    pub require_face_up_start: bool,
    /// Only accept guesses the table would currently offer for that cell.
    pub enforce_reveal_order: bool,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            penalty_delay_ms: DEFAULT_PENALTY_DELAY_MS,
            min_streak_to_pass: DEFAULT_MIN_STREAK_TO_PASS,
            require_face_up_start: false,
            enforce_reveal_order: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_penalty_delay_ms(mut self, delay_ms: u32) -> Self {
        self.penalty_delay_ms = delay_ms;
        self
    }

    pub fn with_min_streak_to_pass(mut self, streak: u32) -> Self {
        self.min_streak_to_pass = streak;
        self
    }

    pub fn with_strict_start(mut self, strict: bool) -> Self {
        self.require_face_up_start = strict;
        self
    }

    pub fn with_reveal_order(mut self, enforce: bool) -> Self {
        self.enforce_reveal_order = enforce;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
