use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use regressivos_client::{ClientError, CycleDetail};
use regressivos_core::{
    aggregate, cycle_edit_permission, CycleStatus, EditDecision, ProgressSummary,
    ReleaseTestCycle, SlaState, SquadModuleRecord,
};

/// Identifies which view a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    cycle_id: String,
}

impl FetchTicket {
    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The view moved on before the result arrived; nothing changed.
    Stale,
    /// The fetch failed; the previous cache is kept.
    Failed(String),
}

/// The cycle currently on screen and its records.
///
/// Each successful fetch replaces the cache wholesale. Results carrying a
/// ticket from an older generation are dropped.
#[derive(Debug, Default)]
pub struct ViewState {
    generation: u64,
    cycle_id: Option<String>,
    cycle: Option<ReleaseTestCycle>,
    records: Vec<SquadModuleRecord>,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the view to another cycle and returns the ticket for its fetches.
    pub fn switch_to(&mut self, cycle_id: impl Into<String>) -> FetchTicket {
        let cycle_id = cycle_id.into();
        self.generation += 1;
        debug!(cycle_id = %cycle_id, generation = self.generation, "Switching view");

        self.cycle_id = Some(cycle_id.clone());
        self.cycle = None;
        self.records.clear();
        self.last_updated = None;
        self.last_error = None;

        FetchTicket {
            generation: self.generation,
            cycle_id,
        }
    }

    /// Tears the view down; outstanding tickets become stale.
    pub fn close(&mut self) {
        self.generation += 1;
        self.cycle_id = None;
        self.cycle = None;
        self.records.clear();
        self.last_updated = None;
        self.last_error = None;
    }

    /// Ticket for the current view, if any.
    pub fn ticket(&self) -> Option<FetchTicket> {
        self.cycle_id.as_ref().map(|id| FetchTicket {
            generation: self.generation,
            cycle_id: id.clone(),
        })
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<CycleDetail, ClientError>,
        now: DateTime<Utc>,
    ) -> ApplyOutcome {
        if !self.is_current(ticket) {
            debug!(
                cycle_id = %ticket.cycle_id,
                generation = ticket.generation,
                current = self.generation,
                "Dropping result for superseded view"
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(detail) => {
                if let Some(previous) = &self.cycle {
                    if previous.status == CycleStatus::Finalized
                        && !previous.status.can_transition_to(detail.cycle.status)
                    {
                        warn!(
                            cycle_id = %ticket.cycle_id,
                            status = %detail.cycle.status,
                            "Backend reports a finalized cycle as active again"
                        );
                    }
                }
                self.cycle = Some(detail.cycle);
                self.records = detail.records;
                self.last_updated = Some(now);
                self.last_error = None;
                ApplyOutcome::Applied
            }
            Err(e) => {
                warn!(cycle_id = %ticket.cycle_id, error = %e, "Refresh failed, keeping cached view");
                let message = e.to_string();
                self.last_error = Some(message.clone());
                ApplyOutcome::Failed(message)
            }
        }
    }

    /// Replaces one cached record after a successful edit.
    pub fn replace_record(&mut self, updated: SquadModuleRecord) -> bool {
        match self.records.iter_mut().find(|r| r.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    pub fn cycle_id(&self) -> Option<&str> {
        self.cycle_id.as_deref()
    }

    pub fn cycle(&self) -> Option<&ReleaseTestCycle> {
        self.cycle.as_ref()
    }

    pub fn records(&self) -> &[SquadModuleRecord] {
        &self.records
    }

    pub fn record(&self, record_id: &str) -> Option<&SquadModuleRecord> {
        self.records.iter().find(|r| r.id == record_id)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn summary(&self) -> ProgressSummary {
        aggregate(&self.records)
    }

    pub fn sla_state(&self, now: DateTime<Utc>) -> SlaState {
        self.cycle
            .as_ref()
            .map(|c| c.sla_state(now))
            .unwrap_or(SlaState::NotStarted)
    }

    /// Gate for the loaded cycle. Nothing loaded yet means nothing to edit.
    pub fn edit_decision(&self, now: DateTime<Utc>) -> Option<EditDecision> {
        self.cycle.as_ref().map(|c| cycle_edit_permission(c, now))
    }
}
