// ABOUTME: Edit-permission gate and admin action availability
// ABOUTME: Advisory checks mirroring what the backend enforces

use chrono::{DateTime, Utc};
use std::fmt;

use crate::sla::SlaState;
use crate::types::{CycleStatus, ReleaseTestCycle};

/// Outcome of the edit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditDecision {
    Allowed,
    SlaExpired,
    Finalized,
}

impl EditDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, EditDecision::Allowed)
    }
}

impl fmt::Display for EditDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditDecision::Allowed => write!(f, "Edição permitida"),
            EditDecision::SlaExpired => write!(f, "SLA vencido. Não é possível editar"),
            EditDecision::Finalized => write!(f, "Regressivo finalizado. Não é possível editar"),
        }
    }
}

/// A record may be edited while the cycle is not finalized and its SLA has
/// not expired. Finalization is reported first.
pub fn edit_permission(sla: &SlaState, status: CycleStatus) -> EditDecision {
    if status.is_terminal() {
        EditDecision::Finalized
    } else if sla.is_expired() {
        EditDecision::SlaExpired
    } else {
        EditDecision::Allowed
    }
}

pub fn can_edit(sla: &SlaState, status: CycleStatus) -> bool {
    edit_permission(sla, status).is_allowed()
}

/// Gate evaluated for a cycle at `now`.
pub fn cycle_edit_permission(cycle: &ReleaseTestCycle, now: DateTime<Utc>) -> EditDecision {
    edit_permission(&cycle.sla_state(now), cycle.status)
}

/// Which admin actions make sense for a cycle in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminActions {
    pub start_sla: bool,
    pub stop_sla: bool,
    pub extend_sla: bool,
    pub release_notes: bool,
    pub delete: bool,
}

impl AdminActions {
    pub fn for_cycle(cycle: &ReleaseTestCycle) -> Self {
        let started = cycle.has_sla_started();
        AdminActions {
            start_sla: !started,
            stop_sla: started && !cycle.is_finalized(),
            extend_sla: started,
            release_notes: true,
            delete: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(SlaState::Remaining(Duration::hours(1)), CycleStatus::Active, EditDecision::Allowed)]
    #[case(SlaState::NotStarted, CycleStatus::Active, EditDecision::Allowed)]
    #[case(SlaState::Expired, CycleStatus::Active, EditDecision::SlaExpired)]
    #[case(SlaState::Remaining(Duration::hours(1)), CycleStatus::Finalized, EditDecision::Finalized)]
    #[case(SlaState::Expired, CycleStatus::Finalized, EditDecision::Finalized)]
    fn test_edit_permission(
        #[case] sla: SlaState,
        #[case] status: CycleStatus,
        #[case] expected: EditDecision,
    ) {
        assert_eq!(edit_permission(&sla, status), expected);
        assert_eq!(can_edit(&sla, status), expected == EditDecision::Allowed);
    }

    #[test]
    fn test_cycle_gate_uses_sla_end() {
        let now = Utc::now();
        let cycle = ReleaseTestCycle {
            sla_start_raw: (now - Duration::hours(25)).to_rfc3339(),
            sla_end_raw: (now - Duration::hours(1)).to_rfc3339(),
            ..Default::default()
        };
        assert_eq!(cycle_edit_permission(&cycle, now), EditDecision::SlaExpired);
    }

    #[test]
    fn test_admin_actions_before_start() {
        let cycle = ReleaseTestCycle::default();
        let actions = AdminActions::for_cycle(&cycle);

        assert!(actions.start_sla);
        assert!(!actions.stop_sla);
        assert!(!actions.extend_sla);
        assert!(actions.release_notes);
        assert!(actions.delete);
    }

    #[test]
    fn test_admin_actions_running_and_finalized() {
        let mut cycle = ReleaseTestCycle {
            sla_start_raw: "2024-05-10T10:00:00".to_string(),
            sla_end_raw: "2024-05-11T10:00:00".to_string(),
            ..Default::default()
        };
        let running = AdminActions::for_cycle(&cycle);
        assert!(!running.start_sla);
        assert!(running.stop_sla);
        assert!(running.extend_sla);

        cycle.status = CycleStatus::Finalized;
        let finalized = AdminActions::for_cycle(&cycle);
        assert!(!finalized.stop_sla);
        assert!(finalized.extend_sla);
    }
}
