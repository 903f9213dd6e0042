use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::model::records::UnitValue;
use crate::model::results::FrequencyRow;
use crate::report::json::render_summary_json;
use crate::report::text::render_analysis_text;
use crate::report::tsv::{
    render_comparison_tsv, render_flow_tsv, render_frequency_tsv, render_units_tsv,
};
use crate::report::ReportContext;

pub const COMPARISON_FILE: &str = "comparison.tsv";
pub const UNITS_FILE: &str = "units.tsv";
pub const FLOW_FILE: &str = "cohort_flow.tsv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "report.txt";

pub fn write_reports(out_dir: &Path, ctx: &ReportContext<'_>, units: &[UnitValue]) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    write_text(&out_dir.join(COMPARISON_FILE), &render_comparison_tsv(ctx.rows))?;
    write_text(&out_dir.join(UNITS_FILE), &render_units_tsv(units))?;
    write_text(&out_dir.join(FLOW_FILE), &render_flow_tsv(ctx.flow))?;
    write_text(&out_dir.join(SUMMARY_FILE), &render_summary_json(ctx)?)?;
    write_text(&out_dir.join(REPORT_FILE), &render_analysis_text(ctx))?;

    info!(out_dir = %out_dir.display(), "reports written");
    Ok(())
}

pub fn write_frequency_table(path: &Path, rows: &[FrequencyRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_text(path, &render_frequency_tsv(rows))?;
    info!(path = %path.display(), rows = rows.len(), "frequency table written");
    Ok(())
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_report.rs"]
mod tests;
