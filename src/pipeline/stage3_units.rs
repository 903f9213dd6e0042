use std::collections::{BTreeMap, BTreeSet};

use crate::model::cohort::Response;
use crate::model::params::{Metric, Unit};
use crate::model::records::{FrequencyRecord, UnitValue};
use crate::stats::descriptive::median;

/// Collapses records to one value per unit of analysis and cell type.
/// Subjects take the median over their samples.
pub fn prepare_unit_level(records: &[FrequencyRecord], unit: Unit, metric: Metric) -> Vec<UnitValue> {
    match unit {
        Unit::Sample => records
            .iter()
            .map(|r| UnitValue {
                unit_id: r.sample_id.clone(),
                response: r.response,
                cell_type: r.cell_type.clone(),
                value: metric_value(r, metric),
            })
            .collect(),
        Unit::Subject => {
            let mut groups: BTreeMap<(i64, Option<Response>, &str), (String, Vec<f64>)> =
                BTreeMap::new();
            for r in records {
                groups
                    .entry((r.subject_pk, r.response, r.cell_type.as_str()))
                    .or_insert_with(|| (subject_label(r), Vec::new()))
                    .1
                    .push(metric_value(r, metric));
            }
            groups
                .into_iter()
                .filter_map(|((_, response, cell_type), (label, values))| {
                    median(&values).map(|value| UnitValue {
                        unit_id: label,
                        response,
                        cell_type: cell_type.to_string(),
                        value,
                    })
                })
                .collect()
        }
    }
}

fn metric_value(r: &FrequencyRecord, metric: Metric) -> f64 {
    match metric {
        Metric::Percentage => r.percentage,
        Metric::Count => r.count as f64,
    }
}

fn subject_label(r: &FrequencyRecord) -> String {
    format!("{}/{}", r.project_id, r.subject_id)
}

/// Centered log-ratio across cell types within each unit. Missing cells are
/// treated as 0 before the pseudocount is added; duplicates are averaged.
pub fn apply_clr(units: &[UnitValue], pseudocount: f64) -> Vec<UnitValue> {
    let mut pivot: BTreeMap<&str, BTreeMap<&str, (f64, usize)>> = BTreeMap::new();
    let mut responses: BTreeMap<&str, Option<Response>> = BTreeMap::new();
    let mut cell_types: BTreeSet<&str> = BTreeSet::new();

    for u in units {
        let cell = pivot
            .entry(u.unit_id.as_str())
            .or_default()
            .entry(u.cell_type.as_str())
            .or_insert((0.0, 0));
        cell.0 += u.value;
        cell.1 += 1;
        responses.entry(u.unit_id.as_str()).or_insert(u.response);
        cell_types.insert(u.cell_type.as_str());
    }

    let mut clr_by_unit: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (unit_id, cells) in &pivot {
        let logs = cell_types
            .iter()
            .map(|ct| {
                let raw = cells
                    .get(ct)
                    .map(|(sum, n)| sum / *n as f64)
                    .unwrap_or(0.0);
                (raw + pseudocount).ln()
            })
            .collect::<Vec<_>>();
        let center = logs.iter().sum::<f64>() / logs.len() as f64;
        clr_by_unit.insert(*unit_id, logs.iter().map(|l| l - center).collect());
    }

    let mut out = Vec::with_capacity(cell_types.len() * clr_by_unit.len());
    for (ct_idx, cell_type) in cell_types.iter().enumerate() {
        for (unit_id, values) in &clr_by_unit {
            out.push(UnitValue {
                unit_id: unit_id.to_string(),
                response: responses.get(unit_id).copied().flatten(),
                cell_type: cell_type.to_string(),
                value: values[ct_idx],
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_units.rs"]
mod tests;
