use super::*;
use crate::model::params::ComparisonParams;
use crate::pipeline::stage1_frequencies::{frequency_table, run_stage1};
use crate::pipeline::stage2_cohort::{build_cohort_flow, cohort_counts, filter_records};
use crate::pipeline::stage4_compare::compare_responders;
use crate::test_fixtures::{cohort_rows, loaded_db};
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_cohort_report_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_write_reports_creates_all_outputs() {
    let conn = loaded_db(&cohort_rows());
    let records = run_stage1(&conn).unwrap();
    let freqs = frequency_table(&records);
    let params = ComparisonParams::default_v1();
    let flow = build_cohort_flow(&records, &params.filter, None, None);
    let counts = cohort_counts(&filter_records(&records, &params.filter));
    let cmp = compare_responders(&records, &params).unwrap();

    let ctx = ReportContext {
        filter: &params.filter,
        counts,
        flow: &flow,
        frequencies: &freqs,
        rows: &cmp.rows,
        method: &cmp.summary,
        alpha: params.alpha,
    };

    let dir = make_temp_dir().join("nested");
    write_reports(&dir, &ctx, &cmp.units).unwrap();

    for name in [COMPARISON_FILE, UNITS_FILE, FLOW_FILE, SUMMARY_FILE, REPORT_FILE] {
        assert!(dir.join(name).exists(), "{} missing", name);
    }

    let comparison = std::fs::read_to_string(dir.join(COMPARISON_FILE)).unwrap();
    assert_eq!(comparison.lines().count(), 6);

    let units = std::fs::read_to_string(dir.join(UNITS_FILE)).unwrap();
    assert_eq!(units.lines().count(), 21);

    let flow_tsv = std::fs::read_to_string(dir.join(FLOW_FILE)).unwrap();
    assert!(flow_tsv.contains("Time=Baseline\t4\t4"));

    let summary = std::fs::read_to_string(dir.join(SUMMARY_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(value["cohort"]["n_samples"], 4);
    assert_eq!(value["results"].as_array().unwrap().len(), 5);

    let report = std::fs::read_to_string(dir.join(REPORT_FILE)).unwrap();
    assert!(report.contains("Total rows: 40"));
}

#[test]
fn test_frequency_table_file() {
    let conn = loaded_db(&cohort_rows());
    let records = run_stage1(&conn).unwrap();
    let path = make_temp_dir().join("freq").join("frequencies.tsv");
    write_frequency_table(&path, &frequency_table(&records)).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 41);
    assert!(text.starts_with("sample\ttotal_count\tpopulation\tcount\tpercentage\n"));
}
