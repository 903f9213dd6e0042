use super::*;
use crate::pipeline::stage1_frequencies::run_stage1;
use crate::test_fixtures::{cohort_rows, loaded_db};

fn default_filter() -> CohortFilter {
    CohortFilter::melanoma_miraclib_pbmc(TimeFilter::BaselineOnly)
}

#[test]
fn test_filter_records_baseline_subset() {
    let conn = loaded_db(&cohort_rows());
    let records = run_stage1(&conn).unwrap();
    let filtered = filter_records(&records, &default_filter());
    assert_eq!(filtered.len(), 20);
    let counts = cohort_counts(&filtered);
    assert_eq!(counts.n_samples, 4);
    assert_eq!(counts.n_subjects, 4);
}

#[test]
fn test_filter_records_wildcards() {
    let conn = loaded_db(&cohort_rows());
    let records = run_stage1(&conn).unwrap();
    let filter = CohortFilter {
        condition: "all".to_string(),
        treatment: String::new(),
        sample_type: "ALL".to_string(),
        time: TimeFilter::All,
    };
    assert_eq!(filter_records(&records, &filter).len(), records.len());
}

#[test]
fn test_cohort_flow_steps() {
    let conn = loaded_db(&cohort_rows());
    let records = run_stage1(&conn).unwrap();
    let flow = build_cohort_flow(
        &records,
        &default_filter(),
        Some(Sex::M),
        Some(Response::Yes),
    );

    let got = flow
        .iter()
        .map(|s| (s.step.as_str(), s.n_samples, s.n_subjects))
        .collect::<Vec<_>>();
    assert_eq!(
        got,
        vec![
            ("All samples", 8, 7),
            ("Condition=melanoma", 7, 6),
            ("SampleType=PBMC", 6, 5),
            ("Treatment=miraclib", 5, 4),
            ("Time=Baseline", 4, 4),
            ("Sex=M", 2, 2),
            ("Response=yes", 1, 1),
        ]
    );
}

#[test]
fn test_cohort_flow_all_time_without_group_filters() {
    let conn = loaded_db(&cohort_rows());
    let records = run_stage1(&conn).unwrap();
    let filter = CohortFilter::melanoma_miraclib_pbmc(TimeFilter::All);
    let flow = build_cohort_flow(&records, &filter, None, None);
    assert_eq!(flow.len(), 5);
    assert_eq!(flow[4].step, "Time=All");
    assert_eq!(flow[4].n_samples, 5);
}

#[test]
fn test_baseline_melanoma_subset_stats() {
    let conn = loaded_db(&cohort_rows());
    let stats = run_stage2_subset(
        &conn,
        &CohortFilter::melanoma_miraclib_pbmc(TimeFilter::BaselineOnly),
    )
    .unwrap();
    assert_eq!(stats.n_projects, 1);
    assert_eq!(stats.n_samples, 4);
    assert_eq!(stats.n_subjects, 4);
    assert_eq!(stats.samples_by_project, vec![("prj1".to_string(), 4)]);
    assert_eq!(
        stats.subjects_by_response,
        vec![("no".to_string(), 2), ("yes".to_string(), 2)]
    );
    assert_eq!(
        stats.subjects_by_sex,
        vec![("F".to_string(), 2), ("M".to_string(), 2)]
    );
    assert_eq!(stats.avg_b_cell_male_responders, Some(300.0));
}

#[test]
fn test_subset_stats_all_time_averages_every_sample() {
    let conn = loaded_db(&cohort_rows());
    let stats =
        run_stage2_subset(&conn, &CohortFilter::melanoma_miraclib_pbmc(TimeFilter::All)).unwrap();
    assert_eq!(stats.n_samples, 5);
    assert_eq!(stats.n_subjects, 4);
    assert_eq!(stats.avg_b_cell_male_responders, Some(275.0));
}

#[test]
fn test_subset_stats_without_male_responders() {
    let conn = loaded_db(&cohort_rows());
    let filter = CohortFilter {
        condition: "carcinoma".to_string(),
        treatment: "all".to_string(),
        sample_type: "all".to_string(),
        time: TimeFilter::All,
    };
    let stats = run_stage2_subset(&conn, &filter).unwrap();
    assert_eq!(stats.n_subjects, 1);
    assert!(stats.subjects_by_response.is_empty());
    assert_eq!(stats.avg_b_cell_male_responders, None);
}

#[test]
fn test_value_counts_ordering() {
    let counts = value_counts(
        ["b", "a", "b", "c", "a"]
            .iter()
            .map(|s| s.to_string()),
    );
    assert_eq!(
        counts,
        vec![
            ("a".to_string(), 2),
            ("b".to_string(), 2),
            ("c".to_string(), 1)
        ]
    );
}
