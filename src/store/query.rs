use rusqlite::{Connection, Row, params_from_iter};

use crate::error::Result;
use crate::model::cohort::{CohortFilter, Response, Sex, TimeFilter, is_wildcard};
use crate::model::records::FrequencyRecord;
use crate::model::results::FilterOptions;

const JOINED_SQL: &str = "
SELECT
    s.sample_id,
    sub.subject_pk,
    sub.subject_id,
    sub.project_id,
    sub.treatment,
    sub.response,
    sub.condition,
    sub.sex,
    s.sample_type,
    s.visit_time,
    c.cell_type,
    c.count
FROM samples s
JOIN subjects sub ON s.subject_pk = sub.subject_pk
JOIN cell_counts c ON s.sample_id = c.sample_id
ORDER BY s.sample_id, c.id
";

/// Row of a cohort subset fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetRow {
    pub project_id: String,
    pub sample_id: String,
    pub subject_pk: i64,
    pub subject_id: String,
    pub response: Option<Response>,
    pub sex: Option<Sex>,
    pub visit_time: f64,
    pub cell_type: String,
    pub count: i64,
}

/// Flat per-sample per-cell-type join, cell types in CSV column order.
/// Totals and percentages are left at zero; the frequency stage fills them in.
pub fn fetch_frequency_records(conn: &Connection) -> Result<Vec<FrequencyRecord>> {
    let mut stmt = conn.prepare(JOINED_SQL)?;
    let rows = stmt.query_map([], |row| {
        Ok(FrequencyRecord {
            sample_id: row.get(0)?,
            subject_pk: row.get(1)?,
            subject_id: row.get(2)?,
            project_id: row.get(3)?,
            treatment: row.get(4)?,
            response: response_column(row, 5)?,
            condition: row.get(6)?,
            sex: sex_column(row, 7)?,
            sample_type: row.get(8)?,
            visit_time: row.get(9)?,
            cell_type: row.get(10)?,
            count: row.get(11)?,
            total_count: 0,
            percentage: 0.0,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    tracing::debug!("fetched {} joined records", out.len());
    Ok(out)
}

/// Parameterized subset fetch. Text filters compare lowercase; `all` skips
/// the clause.
pub fn fetch_subset(conn: &Connection, filter: &CohortFilter) -> Result<Vec<SubsetRow>> {
    let mut sql = String::from(
        "
SELECT
    sub.project_id,
    s.sample_id,
    sub.subject_pk,
    sub.subject_id,
    LOWER(sub.response) AS response,
    sub.sex,
    s.visit_time,
    c.cell_type,
    c.count
FROM samples s
JOIN subjects sub ON s.subject_pk = sub.subject_pk
JOIN cell_counts c ON s.sample_id = c.sample_id
WHERE 1 = 1",
    );
    let mut values: Vec<String> = Vec::new();
    for (column, value) in [
        ("sub.condition", &filter.condition),
        ("sub.treatment", &filter.treatment),
        ("s.sample_type", &filter.sample_type),
    ] {
        if is_wildcard(value.trim()) {
            continue;
        }
        values.push(value.trim().to_lowercase());
        sql.push_str(&format!("\n  AND LOWER({}) = ?{}", column, values.len()));
    }
    if filter.time == TimeFilter::BaselineOnly {
        sql.push_str("\n  AND s.visit_time = 0");
    }
    sql.push_str("\nORDER BY s.sample_id, c.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(SubsetRow {
            project_id: row.get(0)?,
            sample_id: row.get(1)?,
            subject_pk: row.get(2)?,
            subject_id: row.get(3)?,
            response: response_column(row, 4)?,
            sex: sex_column(row, 5)?,
            visit_time: row.get(6)?,
            cell_type: row.get(7)?,
            count: row.get(8)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    tracing::debug!("subset {} matched {} rows", filter.describe(), out.len());
    Ok(out)
}

pub fn fetch_filter_options(conn: &Connection) -> Result<FilterOptions> {
    Ok(FilterOptions {
        conditions: distinct_column(
            conn,
            "SELECT DISTINCT sub.condition FROM subjects sub
             JOIN samples s ON s.subject_pk = sub.subject_pk ORDER BY 1",
        )?,
        treatments: distinct_column(
            conn,
            "SELECT DISTINCT sub.treatment FROM subjects sub
             JOIN samples s ON s.subject_pk = sub.subject_pk ORDER BY 1",
        )?,
        sample_types: distinct_column(
            conn,
            "SELECT DISTINCT sample_type FROM samples ORDER BY 1",
        )?,
    })
}

fn distinct_column(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// The schema CHECK constraints keep these columns inside their domains.
fn response_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Response>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.and_then(|v| Response::from_field(&v).ok().flatten()))
}

fn sex_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Sex>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.and_then(|v| Sex::from_field(&v).ok().flatten()))
}
