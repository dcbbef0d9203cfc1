//! Follow-up board state and the complete / postpone / sweep flows.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use nexo_api::{
    CrmError, DashboardCounts, DashboardMetrics, FollowUp, FollowUpDashboard, FollowUpPatch,
    SystemInfo,
};
use thiserror::Error;

use crate::gateway::CrmGateway;
use crate::notifications::{FailureKind, LoadPhase};
use crate::urgency::{self, UrgencyLevel};

#[derive(Debug, Error)]
pub enum FollowUpError {
    /// Client-side rejection. Raised before any network traffic.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error(transparent)]
    Api(#[from] CrmError),
}

/// Result of the due-follow-up sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    Processed(u32),
    NothingDue(String),
}

/// Follow-ups regrouped by schedule urgency. Every record lands in exactly
/// one bucket; completions from earlier days are dropped.
#[derive(Debug, Clone, Default)]
pub struct FollowUpBoard {
    pub overdue: Vec<FollowUp>,
    pub critical: Vec<FollowUp>,
    pub medium: Vec<FollowUp>,
    pub low: Vec<FollowUp>,
    pub completed_today: Vec<FollowUp>,
}

impl FollowUpBoard {
    pub fn build(records: Vec<FollowUp>, now: DateTime<Utc>) -> Self {
        let mut board = Self::default();
        for record in records {
            if record.completed {
                let today = record
                    .completed_at
                    .map(|ts| ts.date_naive() == now.date_naive())
                    .unwrap_or(false);
                if today {
                    board.completed_today.push(record);
                }
                continue;
            }
            match record.scheduled_at {
                Some(ts) if urgency::is_overdue(ts, now) => board.overdue.push(record),
                scheduled => match urgency::classify_opt(scheduled, now).level {
                    UrgencyLevel::Critical => board.critical.push(record),
                    UrgencyLevel::Medium => board.medium.push(record),
                    UrgencyLevel::Low => board.low.push(record),
                },
            }
        }
        for bucket in [
            &mut board.overdue,
            &mut board.critical,
            &mut board.medium,
            &mut board.low,
            &mut board.completed_today,
        ] {
            bucket.sort_by(|a, b| urgency::compare_scheduled(a.scheduled_at, b.scheduled_at));
        }
        board
    }

    pub fn pending_total(&self) -> usize {
        self.overdue.len() + self.critical.len() + self.medium.len() + self.low.len()
    }
}

/// Board plus the server-side aggregates that ride along with it.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub board: FollowUpBoard,
    pub metrics: DashboardMetrics,
    pub counts: DashboardCounts,
    pub system_info: Option<SystemInfo>,
    pub phase: LoadPhase,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Session state for the follow-up workflow of one advisor.
pub struct FollowUpDesk<G> {
    gateway: Arc<G>,
    state: Arc<Mutex<BoardState>>,
    advisor: Option<String>,
}

impl<G> Clone for FollowUpDesk<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
            advisor: self.advisor.clone(),
        }
    }
}

impl<G: CrmGateway + 'static> FollowUpDesk<G> {
    pub fn new(gateway: Arc<G>, advisor: Option<String>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(BoardState::default())),
            advisor,
        }
    }

    pub fn snapshot(&self) -> BoardState {
        self.state.lock().unwrap().clone()
    }

    /// Fetches the dashboard, merges its sections and rebuilds the board.
    /// On failure the last board stays up and only the phase records the
    /// failure class.
    pub async fn load(&self) -> Result<(), FollowUpError> {
        self.state.lock().unwrap().phase = LoadPhase::Loading;

        match self
            .gateway
            .fetch_follow_up_dashboard(self.advisor.as_deref())
            .await
        {
            Ok(dashboard) => {
                let (records, metrics, counts, system_info) = flatten(dashboard);
                let board = FollowUpBoard::build(records, Utc::now());
                let mut state = self.state.lock().unwrap();
                state.board = board;
                state.metrics = metrics;
                state.counts = counts;
                state.system_info = system_info;
                state.phase = LoadPhase::Loaded;
                state.last_updated = Some(Utc::now());
                Ok(())
            }
            Err(err) => {
                self.state.lock().unwrap().phase = LoadPhase::Failed(FailureKind::of(&err));
                warn!("Follow-up dashboard load failed");
                debug!("Dashboard load details: {}", err);
                Err(err.into())
            }
        }
    }

    /// Records the outcome of a finished follow-up, then reloads.
    pub async fn complete(&self, id: &str, result: &str) -> Result<(), FollowUpError> {
        let result = result.trim();
        if result.is_empty() {
            return Err(FollowUpError::Validation {
                field: "result",
                message: "a completion result is required",
            });
        }
        let patch = FollowUpPatch::complete(result, Utc::now());
        self.gateway.update_follow_up(id, &patch).await?;
        self.load().await
    }

    /// Moves a follow-up to a future date, then reloads.
    pub async fn postpone(
        &self,
        id: &str,
        new_scheduled_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), FollowUpError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(FollowUpError::Validation {
                field: "reason",
                message: "a postponement reason is required",
            });
        }
        if new_scheduled_at <= Utc::now() {
            return Err(FollowUpError::Validation {
                field: "newScheduledAt",
                message: "the new date must be in the future",
            });
        }
        let patch = FollowUpPatch::postpone(new_scheduled_at, reason);
        self.gateway.update_follow_up(id, &patch).await?;
        self.load().await
    }

    /// Asks the server to sweep everything past due. A sweep that touched
    /// nothing is informational and skips the reload.
    pub async fn process_due(&self) -> Result<SweepOutcome, FollowUpError> {
        let outcome = self.gateway.process_due_follow_ups().await?;
        if outcome.is_noop() {
            let message = outcome
                .message
                .unwrap_or_else(|| "Sin seguimientos vencidos".to_string());
            return Ok(SweepOutcome::NothingDue(message));
        }
        self.load().await?;
        Ok(SweepOutcome::Processed(outcome.processed))
    }
}

/// Splits the dashboard into a deduplicated record list plus the aggregates.
/// A record listed in several sections is kept once.
fn flatten(
    dashboard: FollowUpDashboard,
) -> (
    Vec<FollowUp>,
    DashboardMetrics,
    DashboardCounts,
    Option<SystemInfo>,
) {
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for record in dashboard
        .today
        .into_iter()
        .chain(dashboard.overdue)
        .chain(dashboard.upcoming)
    {
        if seen.insert(record.id.clone()) {
            records.push(record);
        }
    }
    (records, dashboard.metrics, dashboard.counts, dashboard.system_info)
}
