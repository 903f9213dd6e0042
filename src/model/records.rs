use serde::Serialize;

use crate::model::cohort::{Response, Sex};

pub const N_CELL_TYPES: usize = 5;

/// Canonical immune populations, in CSV column order.
pub const CELL_TYPES: [&str; N_CELL_TYPES] =
    ["b_cell", "cd8_t_cell", "cd4_t_cell", "nk_cell", "monocyte"];

/// One line of the flat input table.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCountRow {
    pub line: usize,
    pub project: String,
    pub subject: String,
    pub condition: String,
    pub age: Option<i64>,
    pub sex: Option<Sex>,
    pub treatment: String,
    pub response: Option<Response>,
    pub sample: String,
    pub sample_type: String,
    pub visit_time: f64,
    pub counts: [i64; N_CELL_TYPES],
}

/// Per-sample per-cell-type record as produced by the query layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRecord {
    pub sample_id: String,
    pub subject_pk: i64,
    pub subject_id: String,
    pub project_id: String,
    pub treatment: String,
    pub response: Option<Response>,
    pub condition: String,
    pub sex: Option<Sex>,
    pub sample_type: String,
    pub visit_time: f64,
    pub cell_type: String,
    pub count: i64,
    pub total_count: i64,
    pub percentage: f64,
}

/// One value entering a group comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitValue {
    pub unit_id: String,
    pub response: Option<Response>,
    pub cell_type: String,
    pub value: f64,
}
