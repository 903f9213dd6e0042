use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, params};

use crate::error::{CohortError, Result};
use crate::input::read_cell_count_csv;
use crate::model::records::{CELL_TYPES, CellCountRow};
use crate::store::schema::init_schema;
use crate::store::{LoadSummary, open_db};

type SubjectKey<'a> = (&'a str, &'a str);

pub fn load_csv_to_db(csv_path: &Path, db_path: &Path) -> Result<LoadSummary> {
    tracing::info!("reading data from {}", csv_path.display());
    let rows = read_cell_count_csv(csv_path)?;

    let mut conn = open_db(db_path)?;
    let summary = rebuild_and_load(&mut conn, &rows)?;
    tracing::info!(
        "database {} loaded: {} subjects, {} samples, {} cell count records",
        db_path.display(),
        summary.subjects,
        summary.samples,
        summary.cell_counts
    );
    Ok(summary)
}

/// Loads validated rows into an initialized schema inside one transaction.
/// Any integrity failure rolls back the whole load.
pub fn load_rows(conn: &mut Connection, rows: &[CellCountRow]) -> Result<LoadSummary> {
    load_in_transaction(conn, rows, false)
}

/// Like [`load_rows`], but drops and recreates the schema in the same
/// transaction, so a failed load leaves the previous database in place.
pub fn rebuild_and_load(conn: &mut Connection, rows: &[CellCountRow]) -> Result<LoadSummary> {
    load_in_transaction(conn, rows, true)
}

fn load_in_transaction(
    conn: &mut Connection,
    rows: &[CellCountRow],
    rebuild_schema: bool,
) -> Result<LoadSummary> {
    let subjects = unique_subjects(rows);
    let samples = unique_samples(rows)?;

    let tx = conn.transaction()?;
    if rebuild_schema {
        init_schema(&tx)?;
    } else {
        tx.execute("DELETE FROM cell_counts", [])?;
        tx.execute("DELETE FROM samples", [])?;
        tx.execute("DELETE FROM subjects", [])?;
    }

    let mut subject_pks: HashMap<SubjectKey<'_>, i64> = HashMap::with_capacity(subjects.len());
    {
        let mut insert = tx.prepare(
            "INSERT INTO subjects (subject_id, project_id, condition, age, sex, treatment, response)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in &subjects {
            insert.execute(params![
                row.subject,
                row.project,
                row.condition,
                row.age,
                row.sex.map(|s| s.as_str()),
                row.treatment,
                row.response.map(|r| r.as_str()),
            ])?;
            subject_pks.insert(
                (row.project.as_str(), row.subject.as_str()),
                tx.last_insert_rowid(),
            );
        }
    }
    tracing::debug!("loaded {} subjects", subjects.len());

    let mut n_counts = 0usize;
    {
        let mut insert_sample = tx.prepare(
            "INSERT INTO samples (sample_id, subject_pk, visit_time, sample_type)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut insert_count = tx.prepare(
            "INSERT INTO cell_counts (sample_id, cell_type, count) VALUES (?1, ?2, ?3)",
        )?;
        for row in &samples {
            let subject_pk = subject_pks
                .get(&(row.project.as_str(), row.subject.as_str()))
                .copied()
                .ok_or_else(|| {
                    CohortError::Integrity(format!(
                        "sample {} references unknown subject {}/{}",
                        row.sample, row.project, row.subject
                    ))
                })?;
            insert_sample.execute(params![
                row.sample,
                subject_pk,
                row.visit_time,
                row.sample_type
            ])?;
            for (cell_type, count) in CELL_TYPES.iter().zip(row.counts.iter()) {
                insert_count.execute(params![row.sample, cell_type, count])?;
                n_counts += 1;
            }
        }
    }
    tracing::debug!("loaded {} samples", samples.len());

    tx.commit()?;

    Ok(LoadSummary {
        subjects: subjects.len(),
        samples: samples.len(),
        cell_counts: n_counts,
    })
}

fn unique_subjects(rows: &[CellCountRow]) -> Vec<&CellCountRow> {
    let mut seen: HashMap<SubjectKey<'_>, &CellCountRow> = HashMap::new();
    let mut out = Vec::new();
    for row in rows {
        let key = (row.project.as_str(), row.subject.as_str());
        match seen.get(&key) {
            Some(first) => {
                if !same_subject_attributes(first, row) {
                    tracing::warn!(
                        "subject {}/{} has conflicting attributes on line {}; keeping line {}",
                        row.project,
                        row.subject,
                        row.line,
                        first.line
                    );
                }
            }
            None => {
                seen.insert(key, row);
                out.push(row);
            }
        }
    }
    out
}

fn same_subject_attributes(a: &CellCountRow, b: &CellCountRow) -> bool {
    a.condition == b.condition
        && a.age == b.age
        && a.sex == b.sex
        && a.treatment == b.treatment
        && a.response == b.response
}

fn unique_samples(rows: &[CellCountRow]) -> Result<Vec<&CellCountRow>> {
    let mut seen: HashMap<&str, &CellCountRow> = HashMap::new();
    let mut out = Vec::new();
    for row in rows {
        match seen.get(row.sample.as_str()) {
            Some(first) => {
                if first.project != row.project || first.subject != row.subject {
                    return Err(CohortError::Integrity(format!(
                        "sample {} is linked to {}/{} on line {} and {}/{} on line {}",
                        row.sample,
                        first.project,
                        first.subject,
                        first.line,
                        row.project,
                        row.subject,
                        row.line
                    )));
                }
                tracing::warn!(
                    "duplicate sample {} on line {}; keeping line {}",
                    row.sample,
                    row.line,
                    first.line
                );
            }
            None => {
                seen.insert(row.sample.as_str(), row);
                out.push(row);
            }
        }
    }
    Ok(out)
}
