use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::match_state::MatchState;
use super::round::Round;

/// Full state snapshot pushed to every spectator on each mutation and
/// returned by every admin operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutSnapshot {
    pub generation: u64,
    pub paused: bool,
    pub match_done: bool,
    pub active_round: Option<Round>,
    pub last_completed_round: Option<Round>,
    pub cumulative_scores: BTreeMap<String, u32>,
    pub total_rounds: u64,
    pub viewer_count: usize,
    /// Fixed at process start; a viewer that sees this change should
    /// hard-reload rather than keep consuming incremental state.
    pub build_version: String,
}

impl BoutSnapshot {
    pub fn of(
        state: &MatchState,
        total_rounds: u64,
        viewer_count: usize,
        build_version: &str,
    ) -> Self {
        Self {
            generation: state.generation,
            paused: state.paused,
            match_done: state.match_done,
            active_round: state.active_round.clone(),
            last_completed_round: state.last_completed_round.clone(),
            cumulative_scores: state.cumulative_scores.clone(),
            total_rounds,
            viewer_count,
            build_version: build_version.to_string(),
        }
    }
}
