use serde::Serialize;

use crate::error::Result;
use crate::model::cohort::CohortFilter;
use crate::model::results::{CohortCounts, ComparisonRow, FlowStep, MethodSummary};
use crate::report::ReportContext;

pub const TOOL_NAME: &str = env!("CARGO_PKG_NAME");
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct Summary<'a> {
    tool: &'a str,
    version: &'a str,
    filters: &'a CohortFilter,
    cohort: CohortCounts,
    cohort_flow: &'a [FlowStep],
    method: &'a MethodSummary,
    alpha: f64,
    n_significant: usize,
    results: &'a [ComparisonRow],
}

pub fn render_summary_json(ctx: &ReportContext<'_>) -> Result<String> {
    let summary = Summary {
        tool: TOOL_NAME,
        version: TOOL_VERSION,
        filters: ctx.filter,
        cohort: ctx.counts,
        cohort_flow: ctx.flow,
        method: ctx.method,
        alpha: ctx.alpha,
        n_significant: ctx.rows.iter().filter(|r| r.significant).count(),
        results: ctx.rows,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}
