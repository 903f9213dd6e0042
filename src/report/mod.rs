pub mod json;
pub mod text;
pub mod tsv;

use crate::model::cohort::CohortFilter;
use crate::model::results::{CohortCounts, ComparisonRow, FlowStep, FrequencyRow, MethodSummary};

/// Everything the summary and the plain-text report are rendered from.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub filter: &'a CohortFilter,
    pub counts: CohortCounts,
    pub flow: &'a [FlowStep],
    pub frequencies: &'a [FrequencyRow],
    pub rows: &'a [ComparisonRow],
    pub method: &'a MethodSummary,
    pub alpha: f64,
}

pub const MISSING: &str = "NA";

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

pub fn format_opt(v: Option<f64>) -> String {
    v.map(format_f64_6).unwrap_or_else(|| MISSING.to_string())
}

/// p/q values: scientific notation below 1e-4 so small values stay readable.
pub fn format_pvalue(v: Option<f64>) -> String {
    match v {
        Some(p) if p > 0.0 && p < 1e-4 => format!("{:.3e}", p),
        Some(p) => format!("{:.4}", p),
        None => MISSING.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
