use std::path::Path;

use serde::Deserialize;

pub mod reader;

use crate::error::{CohortError, Result};
use crate::model::cohort::{Response, Sex};
use crate::model::records::{CELL_TYPES, CellCountRow, N_CELL_TYPES};
use reader::open_maybe_gz;

const SUBJECT_COLUMNS: [&str; 10] = [
    "project",
    "subject",
    "condition",
    "age",
    "sex",
    "treatment",
    "response",
    "sample",
    "sample_type",
    "time_from_treatment_start",
];

#[derive(Debug, Deserialize)]
struct RawRow {
    project: String,
    subject: String,
    condition: String,
    age: String,
    sex: String,
    treatment: String,
    response: String,
    sample: String,
    sample_type: String,
    time_from_treatment_start: String,
    b_cell: String,
    cd8_t_cell: String,
    cd4_t_cell: String,
    nk_cell: String,
    monocyte: String,
}

pub fn read_cell_count_csv(path: &Path) -> Result<Vec<CellCountRow>> {
    let source = open_maybe_gz(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let missing = SUBJECT_COLUMNS
        .iter()
        .chain(CELL_TYPES.iter())
        .filter(|name| !headers.iter().any(|h| h == **name))
        .copied()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(CohortError::MissingInput(format!(
            "{} is missing columns: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let raw: RawRow = record.deserialize(Some(&headers))?;
        rows.push(validate_row(raw, line)?);
    }

    tracing::info!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn validate_row(raw: RawRow, line: usize) -> Result<CellCountRow> {
    let invalid = |reason: String| CohortError::InvalidRow { line, reason };

    for (name, value) in [
        ("project", &raw.project),
        ("subject", &raw.subject),
        ("condition", &raw.condition),
        ("treatment", &raw.treatment),
        ("sample", &raw.sample),
        ("sample_type", &raw.sample_type),
    ] {
        if value.is_empty() {
            return Err(invalid(format!("{} is empty", name)));
        }
    }

    let age = if raw.age.is_empty() {
        None
    } else {
        Some(parse_integer(&raw.age).ok_or_else(|| invalid(format!("bad age '{}'", raw.age)))?)
    };
    let sex = Sex::from_field(&raw.sex).map_err(invalid)?;
    let response = Response::from_field(&raw.response).map_err(invalid)?;
    let visit_time = raw
        .time_from_treatment_start
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            invalid(format!(
                "bad time_from_treatment_start '{}'",
                raw.time_from_treatment_start
            ))
        })?;

    let raw_counts: [&str; N_CELL_TYPES] = [
        &raw.b_cell,
        &raw.cd8_t_cell,
        &raw.cd4_t_cell,
        &raw.nk_cell,
        &raw.monocyte,
    ];
    let mut counts = [0i64; N_CELL_TYPES];
    for (idx, value) in raw_counts.iter().enumerate() {
        let count = parse_integer(value)
            .ok_or_else(|| invalid(format!("bad {} count '{}'", CELL_TYPES[idx], value)))?;
        if count < 0 {
            return Err(invalid(format!(
                "{} count must be non-negative, got {}",
                CELL_TYPES[idx], count
            )));
        }
        counts[idx] = count;
    }

    Ok(CellCountRow {
        line,
        project: raw.project,
        subject: raw.subject,
        condition: raw.condition,
        age,
        sex,
        treatment: raw.treatment,
        response,
        sample: raw.sample,
        sample_type: raw.sample_type,
        visit_time,
        counts,
    })
}

/// Accepts `12` and float renderings of whole numbers such as `12.0`.
fn parse_integer(value: &str) -> Option<i64> {
    if let Ok(v) = value.parse::<i64>() {
        return Some(v);
    }
    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
