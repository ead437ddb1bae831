//! Match controller: owns the single `MatchState`, sequences rounds, and is
//! the only writer of bout state.
//!
//! All mutations happen under one async mutex (single-writer discipline) and
//! bump the generation counter before being pushed to the broadcast hub.
//! In-flight gateway calls are never cancelled; a result for a round that is
//! no longer active is dropped by the round-number check in
//! [`MatchFlowService::mutate_round`].

mod round_lifecycle;

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::BoutConfig;
use crate::domain::match_state::MatchState;
use crate::domain::round::Round;
use crate::domain::snapshot::BoutSnapshot;
use crate::entities::completed_rounds;
use crate::error::AppError;
use crate::gateway::ModelGateway;
use crate::repos::rounds;
use crate::ws::hub::WsRegistry;
use crate::ws::protocol::ServerMsg;

/// Literal confirmation an operator must send to wipe the bout.
pub const RESET_CONFIRMATION: &str = "RESET";

/// Full persisted history as one exportable document.
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub exported_at: OffsetDateTime,
    pub round_count: usize,
    pub rounds: Vec<completed_rounds::Model>,
}

impl ExportDocument {
    pub fn suggested_filename(&self) -> String {
        format!("punchbout-history-{}.json", self.exported_at.date())
    }
}

pub struct MatchFlowService {
    state: Mutex<MatchState>,
    gateway: Arc<dyn ModelGateway>,
    registry: Arc<WsRegistry>,
    db: DatabaseConnection,
    config: BoutConfig,
}

impl MatchFlowService {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        registry: Arc<WsRegistry>,
        db: DatabaseConnection,
        config: BoutConfig,
    ) -> Arc<Self> {
        let mut state = MatchState::new();
        state.paused = config.start_paused;
        Arc::new(Self {
            state: Mutex::new(state),
            gateway,
            registry,
            db,
            config,
        })
    }

    pub fn config(&self) -> &BoutConfig {
        &self.config
    }

    fn snapshot_of(&self, state: &MatchState) -> BoutSnapshot {
        BoutSnapshot::of(
            state,
            self.config.total_rounds,
            self.registry.viewer_count(),
            &self.config.build_version,
        )
    }

    /// Push the current state to every spectator. Called with the state lock
    /// held so snapshots are never interleaved out of order.
    fn publish(&self, state: &MatchState) -> BoutSnapshot {
        let snapshot = self.snapshot_of(state);
        self.registry.broadcast(ServerMsg::BoutState {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    pub async fn snapshot(&self) -> BoutSnapshot {
        let state = self.state.lock().await;
        self.snapshot_of(&state)
    }

    /// Dispatch the next round unless paused, finished, or already running
    /// one. The single-active-round invariant lives here: the check and the
    /// dispatch happen under the same lock acquisition.
    pub async fn start_next_round(self: &Arc<Self>) {
        let dispatched = {
            let mut state = self.state.lock().await;
            if state.paused || state.match_done || state.active_round.is_some() {
                debug!(
                    paused = state.paused,
                    match_done = state.match_done,
                    active = state.active_round.is_some(),
                    "skipping round dispatch"
                );
                return;
            }
            let number = state.last_round_no + 1;
            state.last_round_no = number;
            let casting = self.config.casting.cast(&self.config.roster, number);
            state.active_round = Some(Round::dispatched(number, casting.prompter.clone()));
            state.bump();
            self.publish(&state);
            info!(
                round_no = number,
                prompter = %casting.prompter.id,
                contestant_a = %casting.contestants[0].id,
                contestant_b = %casting.contestants[1].id,
                judges = casting.judges.len(),
                "round dispatched"
            );
            (number, casting)
        };
        self.spawn_drive(dispatched.0, dispatched.1);
    }

    /// Apply a mutation to the active round if and only if `round_no` still
    /// names it. Returns false (and changes nothing) for stale results from
    /// abandoned or completed rounds.
    pub(crate) async fn mutate_round<F>(&self, round_no: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut Round),
    {
        let mut state = self.state.lock().await;
        let Some(round) = state
            .active_round
            .as_mut()
            .filter(|round| round.number == round_no)
        else {
            debug!(round_no, "dropping result for a round that is no longer active");
            return false;
        };
        mutate(round);
        state.bump();
        self.publish(&state);
        true
    }

    /// Pausing never cancels an in-flight round; it only stops the next one
    /// from being scheduled.
    pub async fn pause(&self) -> BoutSnapshot {
        let mut state = self.state.lock().await;
        state.paused = true;
        state.bump();
        info!("bout paused");
        self.publish(&state)
    }

    pub async fn resume(self: &Arc<Self>) -> BoutSnapshot {
        {
            let mut state = self.state.lock().await;
            state.paused = false;
            state.bump();
            info!("bout resumed");
            self.publish(&state);
        }
        self.start_next_round().await;
        self.snapshot().await
    }

    /// Wipe scores, rounds, and persisted history; leaves the bout paused.
    ///
    /// The confirmation is validated before anything mutates. The in-memory
    /// reset is applied and broadcast even if the storage wipe then fails;
    /// that failure is surfaced to the operator.
    pub async fn reset(&self, confirm: &str) -> Result<BoutSnapshot, AppError> {
        if confirm != RESET_CONFIRMATION {
            return Err(AppError::validation(
                "RESET_CONFIRMATION_MISMATCH",
                format!("reset requires confirmation '{RESET_CONFIRMATION}'"),
            ));
        }
        let snapshot = {
            let mut state = self.state.lock().await;
            state.reset();
            state.bump();
            info!("bout reset; any in-flight round is abandoned");
            self.publish(&state)
        };
        rounds::wipe_all(&self.db).await?;
        Ok(snapshot)
    }

    pub async fn recent_rounds(
        &self,
        limit: u64,
    ) -> Result<Vec<completed_rounds::Model>, AppError> {
        rounds::list_recent(&self.db, limit).await
    }

    pub async fn export(&self) -> Result<ExportDocument, AppError> {
        let rows = rounds::export_all(&self.db).await?;
        Ok(ExportDocument {
            exported_at: OffsetDateTime::now_utc(),
            round_count: rows.len(),
            rounds: rows,
        })
    }

    fn schedule_next(self: &Arc<Self>, delay: Duration) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            service.start_next_round().await;
        });
    }
}
