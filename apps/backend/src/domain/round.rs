use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::roster::ModelIdentity;

/// Failure marker recorded when a single call exceeds its own timeout.
pub const FAILURE_TIMEOUT: &str = "timeout";
/// Failure marker recorded when the whole phase hit its group deadline.
pub const FAILURE_GROUP_TIMEOUT: &str = "group-timeout";

/// Lifecycle phase of a round. Transitions are forward-only; `Done` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Prompting,
    Answering,
    Voting,
    Done,
}

/// One asynchronous gateway call, owned by the round that dispatched it.
///
/// `finished_at` is set exactly once; `output` and `failure` are mutually
/// exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub model: ModelIdentity,
    pub started_at: OffsetDateTime,
    pub finished_at: Option<OffsetDateTime>,
    pub output: Option<String>,
    pub failure: Option<String>,
}

impl TaskRecord {
    pub fn dispatched(model: ModelIdentity) -> Self {
        Self {
            model,
            started_at: OffsetDateTime::now_utc(),
            finished_at: None,
            output: None,
            failure: None,
        }
    }

    pub fn settle_ok(&mut self, output: String, finished_at: OffsetDateTime) {
        debug_assert!(self.finished_at.is_none(), "task settled twice");
        self.finished_at = Some(finished_at);
        self.output = Some(output);
    }

    pub fn settle_err(&mut self, failure: String, finished_at: OffsetDateTime) {
        debug_assert!(self.finished_at.is_none(), "task settled twice");
        self.finished_at = Some(finished_at);
        self.failure = Some(failure);
    }

    pub fn succeeded(&self) -> bool {
        self.output.is_some()
    }
}

/// One judge's ballot. `choice` is set only on success and always names one
/// of the round's two contestants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: ModelIdentity,
    pub started_at: OffsetDateTime,
    pub finished_at: Option<OffsetDateTime>,
    pub choice: Option<ModelIdentity>,
    pub failed: bool,
}

impl VoteRecord {
    pub fn dispatched(voter: ModelIdentity) -> Self {
        Self {
            voter,
            started_at: OffsetDateTime::now_utc(),
            finished_at: None,
            choice: None,
            failed: false,
        }
    }

    pub fn settle_choice(&mut self, choice: ModelIdentity, finished_at: OffsetDateTime) {
        self.finished_at = Some(finished_at);
        self.choice = Some(choice);
    }

    pub fn settle_failed(&mut self, finished_at: OffsetDateTime) {
        self.finished_at = Some(finished_at);
        self.failed = true;
    }
}

/// One prompt → answer → vote → score cycle between two contestants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Monotonic, starts at 1, strictly increasing across all rounds
    /// dispatched by one controller instance (aborted rounds included).
    pub number: u64,
    pub phase: Phase,
    pub prompter: ModelIdentity,
    pub prompt_task: TaskRecord,
    pub prompt_text: Option<String>,
    /// Populated when the round enters `Answering`; an aborted round never
    /// gets contestants.
    pub contestants: Option<[ModelIdentity; 2]>,
    /// Positionally aligned with `contestants`.
    pub answer_tasks: Option<[TaskRecord; 2]>,
    pub votes: Vec<VoteRecord>,
    /// Index of the winning contestant, `None` for a tie or aborted round.
    pub score_delta: Option<usize>,
    /// True when prompt generation failed and the round ended with no
    /// contestants and no score impact.
    pub aborted: bool,
    pub started_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
}

impl Round {
    pub fn dispatched(number: u64, prompter: ModelIdentity) -> Self {
        Self {
            number,
            phase: Phase::Prompting,
            prompter: prompter.clone(),
            prompt_task: TaskRecord::dispatched(prompter),
            prompt_text: None,
            contestants: None,
            answer_tasks: None,
            votes: Vec::new(),
            score_delta: None,
            aborted: false,
            started_at: OffsetDateTime::now_utc(),
            completed_at: None,
        }
    }

    /// Non-failed vote counts per contestant, positionally aligned.
    pub fn tally(&self) -> [u32; 2] {
        let mut counts = [0u32; 2];
        let Some(contestants) = &self.contestants else {
            return counts;
        };
        for vote in &self.votes {
            if let Some(choice) = &vote.choice {
                if choice.id == contestants[0].id {
                    counts[0] += 1;
                } else if choice.id == contestants[1].id {
                    counts[1] += 1;
                }
            }
        }
        counts
    }

    /// Strict majority wins; equal counts (including zero) are a tie.
    pub fn decide_winner(&self) -> Option<usize> {
        let [a, b] = self.tally();
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn winner_id(&self) -> Option<&str> {
        let contestants = self.contestants.as_ref()?;
        self.score_delta.map(|i| contestants[i].id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::{Round, TaskRecord, VoteRecord};
    use crate::domain::roster::ModelIdentity;

    fn model(id: &str) -> ModelIdentity {
        ModelIdentity::new(id, id.to_uppercase())
    }

    fn round_with_votes(votes: &[(&str, Option<&str>)]) -> Round {
        let mut round = Round::dispatched(1, model("p"));
        round.contestants = Some([model("a"), model("b")]);
        for (voter, choice) in votes {
            let mut vote = VoteRecord::dispatched(model(voter));
            match choice {
                Some(id) => vote.settle_choice(model(id), OffsetDateTime::now_utc()),
                None => vote.settle_failed(OffsetDateTime::now_utc()),
            }
            round.votes.push(vote);
        }
        round
    }

    #[test]
    fn tally_counts_only_successful_votes() {
        let round = round_with_votes(&[
            ("j1", Some("a")),
            ("j2", Some("a")),
            ("j3", Some("b")),
            ("j4", None),
        ]);
        assert_eq!(round.tally(), [2, 1]);
        assert_eq!(round.decide_winner(), Some(0));
    }

    #[test]
    fn equal_counts_are_a_tie() {
        let round = round_with_votes(&[("j1", Some("a")), ("j2", Some("b"))]);
        assert_eq!(round.decide_winner(), None);

        let all_failed = round_with_votes(&[("j1", None), ("j2", None)]);
        assert_eq!(all_failed.tally(), [0, 0]);
        assert_eq!(all_failed.decide_winner(), None);
    }

    #[test]
    fn task_record_settles_output_xor_failure() {
        let mut ok = TaskRecord::dispatched(model("a"));
        ok.settle_ok("because Y".into(), OffsetDateTime::now_utc());
        assert!(ok.succeeded());
        assert!(ok.failure.is_none());
        assert!(ok.finished_at.is_some());

        let mut failed = TaskRecord::dispatched(model("b"));
        failed.settle_err("timeout".into(), OffsetDateTime::now_utc());
        assert!(!failed.succeeded());
        assert!(failed.output.is_none());
        assert!(failed.finished_at.is_some());
    }

    #[test]
    fn aborted_round_has_no_winner() {
        let mut round = Round::dispatched(3, model("p"));
        round.aborted = true;
        assert_eq!(round.tally(), [0, 0]);
        assert_eq!(round.decide_winner(), None);
        assert!(round.winner_id().is_none());
    }
}
