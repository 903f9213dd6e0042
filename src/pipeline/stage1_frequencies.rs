use std::collections::HashMap;

use rusqlite::Connection;

use crate::error::Result;
use crate::model::records::FrequencyRecord;
use crate::model::results::FrequencyRow;
use crate::store::query::fetch_frequency_records;

pub fn run_stage1(conn: &Connection) -> Result<Vec<FrequencyRecord>> {
    let mut records = fetch_frequency_records(conn)?;
    attach_frequencies(&mut records);
    Ok(records)
}

/// Fills `total_count` (sum over the sample) and `percentage`. Samples with a
/// zero total get a percentage of 0.
pub fn attach_frequencies(records: &mut [FrequencyRecord]) {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for r in records.iter() {
        *totals.entry(r.sample_id.clone()).or_insert(0) += r.count;
    }
    for r in records.iter_mut() {
        let total = totals.get(&r.sample_id).copied().unwrap_or(0);
        r.total_count = total;
        r.percentage = if total > 0 {
            r.count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
    }
}

pub fn frequency_table(records: &[FrequencyRecord]) -> Vec<FrequencyRow> {
    records
        .iter()
        .map(|r| FrequencyRow {
            sample: r.sample_id.clone(),
            total_count: r.total_count,
            population: r.cell_type.clone(),
            count: r.count,
            percentage: r.percentage,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_frequencies.rs"]
mod tests;
