//! Drives one round from dispatch to completion.
//!
//! Each phase fans its gateway calls out through the task pool and applies
//! results incrementally, so spectators see answers and votes land one by
//! one. Every application goes through `mutate_round`, which drops results
//! for rounds abandoned by a reset.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::roster::Casting;
use crate::domain::round::{Phase, TaskRecord, VoteRecord, FAILURE_TIMEOUT};
use crate::gateway::{ContestantAnswer, GatewayError};
use crate::repos::rounds;
use crate::services::task_pool;

use super::MatchFlowService;

impl MatchFlowService {
    pub(super) fn spawn_drive(self: &Arc<Self>, round_no: u64, casting: Casting) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.drive_round(round_no, casting).await;
        });
    }

    async fn drive_round(self: Arc<Self>, round_no: u64, casting: Casting) {
        let Some(prompt) = self.prompting_phase(round_no, &casting).await else {
            return;
        };
        let Some(answers) = self.answering_phase(round_no, &casting, &prompt).await else {
            return;
        };
        if self.voting_phase(round_no, &casting, &prompt, &answers).await {
            self.finish_round(round_no).await;
        }
    }

    /// Ask the prompter for this round's prompt. A failure aborts the round:
    /// it is completed immediately with no contestants and no score impact.
    async fn prompting_phase(
        self: &Arc<Self>,
        round_no: u64,
        casting: &Casting,
    ) -> Option<String> {
        let call = self.gateway.write_prompt(&casting.prompter);
        let result = match tokio::time::timeout(self.config.prompt_timeout, call).await {
            // A blank prompt is unusable whatever the gateway thinks of it.
            Ok(Ok(text)) if text.trim().is_empty() => Err(GatewayError::Empty.to_string()),
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err(FAILURE_TIMEOUT.to_string()),
        };
        let finished_at = OffsetDateTime::now_utc();

        match result {
            Ok(text) => {
                let contestants = casting.contestants.clone();
                let applied = self
                    .mutate_round(round_no, |round| {
                        round.prompt_task.settle_ok(text.clone(), finished_at);
                        round.prompt_text = Some(text.clone());
                        round.phase = Phase::Answering;
                        round.answer_tasks = Some([
                            TaskRecord::dispatched(contestants[0].clone()),
                            TaskRecord::dispatched(contestants[1].clone()),
                        ]);
                        round.contestants = Some(contestants.clone());
                    })
                    .await;
                applied.then_some(text)
            }
            Err(failure) => {
                warn!(round_no, %failure, "prompt generation failed, aborting round");
                let applied = self
                    .mutate_round(round_no, |round| {
                        round.prompt_task.settle_err(failure.clone(), finished_at);
                        round.aborted = true;
                    })
                    .await;
                if applied {
                    self.finish_round(round_no).await;
                }
                None
            }
        }
    }

    /// Both contestants answer concurrently; each result is applied (and
    /// broadcast) as it settles. A failed answer does not fail the round.
    async fn answering_phase(
        self: &Arc<Self>,
        round_no: u64,
        casting: &Casting,
        prompt: &str,
    ) -> Option<[ContestantAnswer; 2]> {
        let (tx, mut rx) = mpsc::unbounded_channel::<task_pool::TaskOutcome<String>>();
        let apply = async {
            while let Some(outcome) = rx.recv().await {
                self.mutate_round(round_no, |round| {
                    let Some(tasks) = round.answer_tasks.as_mut() else {
                        return;
                    };
                    let Some(task) = tasks.get_mut(outcome.index) else {
                        return;
                    };
                    match outcome.result {
                        Ok(text) => task.settle_ok(text, outcome.finished_at),
                        Err(failure) => task.settle_err(failure, outcome.finished_at),
                    }
                })
                .await;
            }
        };
        let run = task_pool::run_group(
            2,
            self.config.answer_timeout,
            None,
            Some(tx),
            |index| {
                let gateway = Arc::clone(&self.gateway);
                let model = casting.contestants[index].clone();
                let prompt = prompt.to_string();
                async move { gateway.answer_prompt(&model, &prompt).await }
            },
        );
        let (_, outcomes) = tokio::join!(apply, run);

        let answers = [
            ContestantAnswer {
                model: casting.contestants[0].clone(),
                answer: outcomes[0].result.clone().ok(),
            },
            ContestantAnswer {
                model: casting.contestants[1].clone(),
                answer: outcomes[1].result.clone().ok(),
            },
        ];

        let applied = self
            .mutate_round(round_no, |round| {
                round.phase = Phase::Voting;
                round.votes = casting
                    .judges
                    .iter()
                    .cloned()
                    .map(VoteRecord::dispatched)
                    .collect();
            })
            .await;
        applied.then_some(answers)
    }

    /// Every judge votes concurrently under the optional group deadline.
    /// Returns whether the round is still live afterwards.
    async fn voting_phase(
        self: &Arc<Self>,
        round_no: u64,
        casting: &Casting,
        prompt: &str,
        answers: &[ContestantAnswer; 2],
    ) -> bool {
        let (tx, mut rx) = mpsc::unbounded_channel::<task_pool::TaskOutcome<usize>>();
        let apply = async {
            let mut live = true;
            while let Some(outcome) = rx.recv().await {
                live &= self
                    .mutate_round(round_no, |round| {
                        let choice = match &outcome.result {
                            Ok(idx) => round
                                .contestants
                                .as_ref()
                                .and_then(|c| c.get(*idx))
                                .cloned(),
                            Err(_) => None,
                        };
                        let Some(vote) = round.votes.get_mut(outcome.index) else {
                            return;
                        };
                        match choice {
                            Some(contestant) => {
                                vote.settle_choice(contestant, outcome.finished_at)
                            }
                            None => vote.settle_failed(outcome.finished_at),
                        }
                    })
                    .await;
            }
            live
        };
        let run = task_pool::run_group(
            casting.judges.len(),
            self.config.vote_timeout,
            self.config.vote_group_deadline,
            Some(tx),
            |index| {
                let gateway = Arc::clone(&self.gateway);
                let judge = casting.judges[index].clone();
                let prompt = prompt.to_string();
                let answers = answers.clone();
                async move { gateway.judge_answers(&judge, &prompt, &answers).await }
            },
        );
        let (live, _) = tokio::join!(apply, run);
        live
    }

    /// Close out the round: tally, score, persist, and schedule the next
    /// one. A no-op when `round_no` is no longer the active round.
    pub(super) async fn finish_round(self: &Arc<Self>, round_no: u64) {
        let (round, delay, proceed) = {
            let mut state = self.state.lock().await;
            if !state.is_active_round(round_no) {
                return;
            }
            let mut round = match state.active_round.take() {
                Some(round) => round,
                None => return,
            };
            round.phase = Phase::Done;
            round.completed_at = Some(OffsetDateTime::now_utc());
            if !round.aborted {
                round.score_delta = round.decide_winner();
                if let Some(contestants) = &round.contestants {
                    for contestant in contestants {
                        state
                            .cumulative_scores
                            .entry(contestant.id.clone())
                            .or_insert(0);
                    }
                }
                if let Some(winner) = round.winner_id() {
                    *state.cumulative_scores.entry(winner.to_string()).or_insert(0) += 1;
                }
            }
            if round.number >= self.config.total_rounds {
                state.match_done = true;
            }
            state.last_completed_round = Some(round.clone());
            state.bump();
            self.publish(&state);
            info!(
                round_no,
                aborted = round.aborted,
                winner = round.winner_id().unwrap_or("-"),
                match_done = state.match_done,
                "round completed"
            );
            let delay = if round.aborted {
                Duration::ZERO
            } else {
                self.config.round_break
            };
            (round, delay, !state.match_done && !state.paused)
        };

        if !round.aborted {
            if let Err(err) = rounds::append(&self.db, &round).await {
                warn!(round_no, error = %err, "failed to persist completed round");
            }
        }
        if proceed {
            self.schedule_next(delay);
        }
    }
}
