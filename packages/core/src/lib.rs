// ABOUTME: Core domain for the regressivos console
// ABOUTME: Cycle and record types, SLA clock, progress aggregation and edit gate

pub mod error;
pub mod permissions;
pub mod progress;
pub mod sla;
pub mod status;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    CycleCreateInput, CycleStatus, CycleUpdateInput, Platform, QrKind, RecordUpdateInput,
    ReleaseKind, ReleaseTestCycle, SquadEntry, SquadModuleRecord, SquadsConfig,
};

pub use error::{CoreError, CoreResult, SlaError};
pub use permissions::{can_edit, cycle_edit_permission, edit_permission, AdminActions, EditDecision};
pub use progress::{aggregate, completion_percentage, normalize_percentage, ProgressSummary, StatusCounts, TestOutcome};
pub use sla::{extend, format_countdown, parse_timestamp, parse_timestamp_in, start_window, try_extend, SlaState, DEFAULT_SLA_HOURS};
pub use status::{StatusTone, TestStatus};

// Re-export utilities
pub use utils::{format_datetime, format_local, truncate};

// Re-export validation
pub use validation::{validate_cycle_create, validate_cycle_update, validate_hours, ValidationError};
