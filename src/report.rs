use serde::Serialize;

use crate::runner::TrialSummary;
use crate::suite::Suite;
use crate::workload::{Strategy, Workload};

/// Name of a case as `suite/label`, with spaces in the label replaced: `many_items_with_arena/10_items`.
pub fn case_name(suite: &Suite, workload: &Workload) -> String {
    format!("{}/{}", suite.name, workload.label().replace(' ', "_"))
}

/// One line per case: iterations, then the per-op means.
pub fn bench_line(suite: &Suite, summary: &TrialSummary) -> String {
    format!(
        "{:<40}\t{:>8}\t{:>12} ns/op\t{:>12} B/op\t{:>8} allocs/op",
        case_name(suite, &summary.workload),
        summary.repetitions,
        summary.ns_per_op(),
        summary.bytes_per_op(),
        summary.allocs_per_op()
    )
}

#[derive(Serialize)]
struct Record<'a> {
    case: String,
    workload: &'a Workload,
    strategy: Strategy,
    repetitions: u64,
    ns_per_op: u128,
    bytes_per_op: u64,
    allocs_per_op: u64,
}

pub fn to_json(suite: &Suite, summary: &TrialSummary) -> serde_json::Result<String> {
    serde_json::to_string(&Record {
        case: case_name(suite, &summary.workload),
        workload: &summary.workload,
        strategy: summary.strategy,
        repetitions: summary.repetitions,
        ns_per_op: summary.ns_per_op(),
        bytes_per_op: summary.bytes_per_op(),
        allocs_per_op: summary.allocs_per_op(),
    })
}
