use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::round::Round;

/// The single source of truth for one running bout.
///
/// Exactly one instance exists per controller; every mutation happens under
/// the controller's lock and bumps `generation` so viewers can detect
/// staleness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub active_round: Option<Round>,
    pub last_completed_round: Option<Round>,
    /// Keyed by model id; keys are exactly the ids ever seen as contestants.
    pub cumulative_scores: BTreeMap<String, u32>,
    pub paused: bool,
    pub match_done: bool,
    /// Monotonic revision counter, bumped on every externally observable
    /// state change.
    pub generation: u64,
    /// Highest round number ever dispatched. Survives reset so late results
    /// from an abandoned round can never be mistaken for a fresh one.
    pub last_round_no: u64,
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            active_round: None,
            last_completed_round: None,
            cumulative_scores: BTreeMap::new(),
            paused: false,
            match_done: false,
            generation: 0,
            last_round_no: 0,
        }
    }

    pub fn bump(&mut self) {
        self.generation += 1;
    }

    /// Whether the given round number is still the active round. Late task
    /// results check this before being applied.
    pub fn is_active_round(&self, round_no: u64) -> bool {
        self.active_round
            .as_ref()
            .map(|r| r.number == round_no)
            .unwrap_or(false)
    }

    /// Clear scores and rounds, leaving the bout paused. Round numbering is
    /// not rewound.
    pub fn reset(&mut self) {
        self.active_round = None;
        self.last_completed_round = None;
        self.cumulative_scores.clear();
        self.paused = true;
        self.match_done = false;
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}
