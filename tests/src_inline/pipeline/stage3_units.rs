use super::*;
use crate::model::cohort::{CohortFilter, TimeFilter};
use crate::pipeline::stage1_frequencies::run_stage1;
use crate::pipeline::stage2_cohort::filter_records;
use crate::test_fixtures::{cohort_rows, loaded_db};

fn subset(time: TimeFilter) -> Vec<FrequencyRecord> {
    let conn = loaded_db(&cohort_rows());
    let records = run_stage1(&conn).unwrap();
    filter_records(&records, &CohortFilter::melanoma_miraclib_pbmc(time))
}

fn uv(unit: &str, response: Option<Response>, cell: &str, value: f64) -> UnitValue {
    UnitValue {
        unit_id: unit.to_string(),
        response,
        cell_type: cell.to_string(),
        value,
    }
}

#[test]
fn test_sample_units_keep_every_record() {
    let records = subset(TimeFilter::BaselineOnly);
    let units = prepare_unit_level(&records, Unit::Sample, Metric::Percentage);
    assert_eq!(units.len(), records.len());
    assert_eq!(units[0].unit_id, "s1");
    assert!((units[0].value - 300.0 / 700.0 * 100.0).abs() < 1e-12);
}

#[test]
fn test_subject_units_take_median_over_samples() {
    let records = subset(TimeFilter::All);
    let counts = prepare_unit_level(&records, Unit::Subject, Metric::Count);
    // four subjects x five cell types
    assert_eq!(counts.len(), 20);
    let b = counts
        .iter()
        .find(|u| u.unit_id == "prj1/sbj1" && u.cell_type == "b_cell")
        .unwrap();
    assert_eq!(b.value, 275.0);
    assert_eq!(b.response, Some(Response::Yes));

    let pct = prepare_unit_level(&records, Unit::Subject, Metric::Percentage);
    let b = pct
        .iter()
        .find(|u| u.unit_id == "prj1/sbj1" && u.cell_type == "b_cell")
        .unwrap();
    let expected = (300.0 / 700.0 * 100.0 + 250.0 / 650.0 * 100.0) / 2.0;
    assert!((b.value - expected).abs() < 1e-12);
}

#[test]
fn test_clr_rows_are_centered() {
    let records = subset(TimeFilter::BaselineOnly);
    let units = prepare_unit_level(&records, Unit::Sample, Metric::Percentage);
    let clr = apply_clr(&units, 1e-6);
    assert_eq!(clr.len(), units.len());

    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for u in &clr {
        *sums.entry(u.unit_id.as_str()).or_insert(0.0) += u.value;
    }
    for total in sums.values() {
        assert!(total.abs() < 1e-9);
    }
}

#[test]
fn test_clr_layout_and_missing_cells() {
    let units = vec![
        uv("u1", Some(Response::Yes), "a", 1.0),
        uv("u1", Some(Response::Yes), "b", 1.0),
        uv("u2", Some(Response::No), "a", 4.0),
    ];
    let clr = apply_clr(&units, 1.0);
    // cell type major, then unit
    let layout = clr
        .iter()
        .map(|u| (u.cell_type.as_str(), u.unit_id.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(layout, vec![("a", "u1"), ("a", "u2"), ("b", "u1"), ("b", "u2")]);

    assert!(clr[0].value.abs() < 1e-12);
    // u2: ln(5) and ln(1) centered around ln(5)/2
    let half = 5.0f64.ln() / 2.0;
    assert!((clr[1].value - half).abs() < 1e-12);
    assert!((clr[3].value + half).abs() < 1e-12);
    assert_eq!(clr[3].response, Some(Response::No));
}
