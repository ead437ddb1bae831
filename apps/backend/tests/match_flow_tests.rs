//! End-to-end match controller tests against an in-memory history store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backend::config::BoutConfig;
use backend::domain::round::Phase;
use backend::domain::roster::{ModelIdentity, Roster};
use backend::domain::snapshot::BoutSnapshot;
use backend::gateway::{ContestantAnswer, GatewayError, ModelGateway};
use backend::infra::db::{connect_db, init_schema};
use backend::repos::rounds;
use backend::services::match_flow::MatchFlowService;
use backend::ws::hub::WsRegistry;
use sea_orm::DatabaseConnection;

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Gateway with failure and latency knobs; judges vote by a fixed table
/// keyed on judge id (default: contestant 0).
struct RiggedGateway {
    fail_prompt: AtomicBool,
    blank_prompt: AtomicBool,
    answer_delay: Duration,
    votes: HashMap<String, usize>,
}

impl RiggedGateway {
    fn new(votes: &[(&str, usize)]) -> Self {
        Self {
            fail_prompt: AtomicBool::new(false),
            blank_prompt: AtomicBool::new(false),
            answer_delay: Duration::ZERO,
            votes: votes
                .iter()
                .map(|(id, vote)| (id.to_string(), *vote))
                .collect(),
        }
    }

    fn with_answer_delay(mut self, delay: Duration) -> Self {
        self.answer_delay = delay;
        self
    }

    fn failing_prompts(self) -> Self {
        self.fail_prompt.store(true, Ordering::SeqCst);
        self
    }

    fn blank_prompts(self) -> Self {
        self.blank_prompt.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl ModelGateway for RiggedGateway {
    async fn write_prompt(&self, model: &ModelIdentity) -> Result<String, GatewayError> {
        if self.fail_prompt.load(Ordering::SeqCst) {
            return Err(GatewayError::Empty);
        }
        if self.blank_prompt.load(Ordering::SeqCst) {
            return Ok("   ".to_string());
        }
        Ok(format!("prompt from {}", model.id))
    }

    async fn answer_prompt(
        &self,
        model: &ModelIdentity,
        _prompt: &str,
    ) -> Result<String, GatewayError> {
        if !self.answer_delay.is_zero() {
            tokio::time::sleep(self.answer_delay).await;
        }
        Ok(format!("answer from {}", model.id))
    }

    async fn judge_answers(
        &self,
        model: &ModelIdentity,
        _prompt: &str,
        _answers: &[ContestantAnswer; 2],
    ) -> Result<usize, GatewayError> {
        Ok(self.votes.get(&model.id).copied().unwrap_or(0))
    }
}

/// Roster `p,a,b,c,d` under rotation: round 1 is prompted by `p` with
/// contestants `a` and `b`, judged by `p`, `c` and `d`.
async fn harness(
    gateway: Arc<dyn ModelGateway>,
    total_rounds: u64,
) -> (Arc<MatchFlowService>, DatabaseConnection) {
    let db = connect_db("sqlite::memory:").await.unwrap();
    init_schema(&db).await.unwrap();
    let registry = Arc::new(WsRegistry::new());
    let roster = Roster::parse("p,a,b,c,d").unwrap();
    let config = BoutConfig::for_tests(roster, total_rounds);
    let controller = MatchFlowService::new(gateway, registry, db.clone(), config);
    (controller, db)
}

async fn wait_until<F>(controller: &Arc<MatchFlowService>, mut pred: F) -> BoutSnapshot
where
    F: FnMut(&BoutSnapshot) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let snapshot = controller.snapshot().await;
        if pred(&snapshot) {
            return snapshot;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time; last snapshot: {snapshot:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn majority_vote_scores_the_winner_and_persists_the_round() {
    // Judges p and c vote for contestant 0 ("a"), d for contestant 1.
    let gateway = Arc::new(RiggedGateway::new(&[("p", 0), ("c", 0), ("d", 1)]));
    let (controller, db) = harness(gateway, 1).await;

    controller.start_next_round().await;
    let snapshot = wait_until(&controller, |s| s.match_done).await;

    let round = snapshot.last_completed_round.expect("round should complete");
    assert_eq!(round.number, 1);
    assert_eq!(round.phase, Phase::Done);
    assert_eq!(round.tally(), [2, 1]);
    assert_eq!(round.winner_id(), Some("a"));
    assert_eq!(round.votes.len(), 3);
    assert_eq!(snapshot.cumulative_scores.get("a"), Some(&1));
    assert_eq!(snapshot.cumulative_scores.get("b"), Some(&0));
    assert!(snapshot.active_round.is_none());

    let rows = rounds::list_recent(&db, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].round_no, 1);
    assert_eq!(rows[0].winner_id.as_deref(), Some("a"));
    assert_eq!(rows[0].prompter_id, "p");
}

#[tokio::test]
async fn rounds_run_back_to_back_with_increasing_numbers() {
    let gateway = Arc::new(RiggedGateway::new(&[]));
    let (controller, db) = harness(gateway, 3).await;

    controller.start_next_round().await;
    let snapshot = wait_until(&controller, |s| s.match_done).await;

    let last = snapshot.last_completed_round.expect("final round");
    assert_eq!(last.number, 3);

    let rows = rounds::list_recent(&db, 10).await.unwrap();
    let numbers: Vec<i64> = rows.iter().map(|r| r.round_no).collect();
    assert_eq!(numbers, vec![3, 2, 1]);
}

#[tokio::test]
async fn failed_prompt_aborts_the_round_without_scoring() {
    let gateway = Arc::new(RiggedGateway::new(&[]).failing_prompts());
    let (controller, db) = harness(gateway, 1).await;

    controller.start_next_round().await;
    let snapshot = wait_until(&controller, |s| s.last_completed_round.is_some()).await;

    let round = snapshot.last_completed_round.expect("aborted round");
    assert!(round.aborted);
    assert_eq!(round.phase, Phase::Done);
    assert!(round.contestants.is_none());
    assert!(round.prompt_task.failure.is_some());
    assert!(round.winner_id().is_none());
    assert!(snapshot.cumulative_scores.is_empty());

    // Aborted rounds are not part of the history.
    assert!(rounds::export_all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn pause_lets_the_inflight_round_finish_but_stops_the_next() {
    let gateway =
        Arc::new(RiggedGateway::new(&[]).with_answer_delay(Duration::from_millis(150)));
    let (controller, db) = harness(gateway, 5).await;

    controller.start_next_round().await;
    wait_until(&controller, |s| s.active_round.is_some()).await;

    let snapshot = controller.pause().await;
    assert!(snapshot.paused);

    // The round in flight still runs to completion and is persisted.
    let snapshot = wait_until(&controller, |s| {
        s.last_completed_round.is_some() && s.active_round.is_none()
    })
    .await;
    assert_eq!(rounds::list_recent(&db, 10).await.unwrap().len(), 1);

    // No new round starts while paused.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let idle = controller.snapshot().await;
    assert!(idle.active_round.is_none());
    assert_eq!(idle.generation, snapshot.generation);

    let resumed = controller.resume().await;
    assert!(!resumed.paused);
    wait_until(&controller, |s| {
        s.last_completed_round
            .as_ref()
            .map(|r| r.number >= 2)
            .unwrap_or(false)
    })
    .await;
}

#[tokio::test]
async fn blank_prompt_text_aborts_the_round() {
    // The gateway reports success but produces nothing usable.
    let gateway = Arc::new(RiggedGateway::new(&[]).blank_prompts());
    let (controller, db) = harness(gateway, 1).await;

    controller.start_next_round().await;
    let snapshot = wait_until(&controller, |s| s.last_completed_round.is_some()).await;

    let round = snapshot.last_completed_round.expect("aborted round");
    assert!(round.aborted);
    assert!(round.contestants.is_none());
    assert!(round.prompt_text.is_none());
    assert!(round.prompt_task.failure.is_some());
    assert!(snapshot.cumulative_scores.is_empty());
    assert!(rounds::export_all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn generation_moves_on_every_observable_change() {
    let gateway = Arc::new(RiggedGateway::new(&[]));
    let (controller, _db) = harness(gateway, 2).await;

    let initial = controller.snapshot().await.generation;
    controller.start_next_round().await;
    let finished = wait_until(&controller, |s| s.match_done).await;
    assert!(finished.generation > initial);

    let paused = controller.pause().await;
    assert!(paused.generation > finished.generation);
}

#[tokio::test]
async fn reset_requires_the_literal_confirmation() {
    let gateway = Arc::new(RiggedGateway::new(&[]));
    let (controller, _db) = harness(gateway, 1).await;

    controller.start_next_round().await;
    wait_until(&controller, |s| s.match_done).await;
    let before = controller.snapshot().await;

    let err = controller.reset("reset").await.unwrap_err();
    assert_eq!(err.code(), "RESET_CONFIRMATION_MISMATCH");

    // Nothing moved.
    let after = controller.snapshot().await;
    assert_eq!(after.generation, before.generation);
    assert_eq!(after.cumulative_scores, before.cumulative_scores);
}

#[tokio::test]
async fn reset_wipes_state_and_history_but_not_round_numbering() {
    let gateway = Arc::new(RiggedGateway::new(&[]));
    let (controller, db) = harness(gateway, 5).await;

    controller.start_next_round().await;
    wait_until(&controller, |s| s.last_completed_round.is_some()).await;
    controller.pause().await;
    wait_until(&controller, |s| s.active_round.is_none()).await;

    let snapshot = controller.reset("RESET").await.unwrap();
    assert!(snapshot.paused);
    assert!(!snapshot.match_done);
    assert!(snapshot.active_round.is_none());
    assert!(snapshot.last_completed_round.is_none());
    assert!(snapshot.cumulative_scores.is_empty());
    assert!(rounds::export_all(&db).await.unwrap().is_empty());

    // Numbering continues from where it left off after a resume.
    controller.resume().await;
    let snapshot = wait_until(&controller, |s| s.last_completed_round.is_some()).await;
    assert!(snapshot.last_completed_round.map(|r| r.number).unwrap_or(0) >= 2);
}

#[tokio::test]
async fn results_from_an_abandoned_round_are_dropped() {
    let gateway =
        Arc::new(RiggedGateway::new(&[]).with_answer_delay(Duration::from_millis(300)));
    let (controller, _db) = harness(gateway, 5).await;

    controller.start_next_round().await;
    wait_until(&controller, |s| s.active_round.is_some()).await;

    controller.reset("RESET").await.unwrap();

    // Let the abandoned round's answer and vote tasks settle.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let snapshot = controller.snapshot().await;
    assert!(snapshot.active_round.is_none());
    assert!(snapshot.last_completed_round.is_none());
    assert!(snapshot.cumulative_scores.is_empty());
    assert!(snapshot.paused);
}

#[tokio::test]
async fn reset_survives_a_broken_history_store() {
    let gateway: Arc<dyn ModelGateway> = Arc::new(RiggedGateway::new(&[]));
    // No schema: every storage call will fail.
    let db = connect_db("sqlite::memory:").await.unwrap();
    let registry = Arc::new(WsRegistry::new());
    let config = BoutConfig::for_tests(Roster::parse("p,a,b,c,d").unwrap(), 1);
    let controller = MatchFlowService::new(gateway, registry, db, config);

    let err = controller.reset("RESET").await.unwrap_err();
    assert_eq!(err.code(), "DB_ERROR");

    // The in-memory reset still happened.
    let snapshot = controller.snapshot().await;
    assert!(snapshot.paused);
    assert!(snapshot.cumulative_scores.is_empty());
}
