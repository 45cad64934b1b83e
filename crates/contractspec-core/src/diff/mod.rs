//! Differ: structural change lists, spec-vs-operation comparison and
//! reconciliation of imported specs with an existing registry.

mod engine;
mod report;
mod sync;

pub use engine::{diff_spec_vs_operation, diff_specs, diff_values, kind_name, ChangeType, DiffChange, DiffOptions};
pub use report::{format_diff_changes, format_spec_diff, format_sync_summary};
pub use sync::{
    apply_sync, build_sync_result, diff_all, MatchStrategy, Resolution, SpecDiff, SyncOutcome, SyncResult,
    SyncSummary,
};
