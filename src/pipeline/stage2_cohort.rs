use std::collections::{BTreeMap, BTreeSet, HashSet};

use rusqlite::Connection;

use crate::error::Result;
use crate::model::cohort::{CohortFilter, Response, Sex, TimeFilter, text_filter_admits};
use crate::model::records::FrequencyRecord;
use crate::model::results::{CohortCounts, FlowStep, SubsetStats};
use crate::store::query::{SubsetRow, fetch_subset};

pub fn filter_records(records: &[FrequencyRecord], filter: &CohortFilter) -> Vec<FrequencyRecord> {
    records
        .iter()
        .filter(|r| {
            text_filter_admits(&filter.condition, &r.condition)
                && text_filter_admits(&filter.treatment, &r.treatment)
                && text_filter_admits(&filter.sample_type, &r.sample_type)
                && filter.time.admits(r.visit_time)
        })
        .cloned()
        .collect()
}

pub fn cohort_counts(records: &[FrequencyRecord]) -> CohortCounts {
    let samples = records
        .iter()
        .map(|r| r.sample_id.as_str())
        .collect::<HashSet<_>>();
    let subjects = records.iter().map(|r| r.subject_pk).collect::<HashSet<_>>();
    CohortCounts {
        n_samples: samples.len(),
        n_subjects: subjects.len(),
    }
}

/// Sample and subject counts after each successive filter step.
pub fn build_cohort_flow(
    records: &[FrequencyRecord],
    filter: &CohortFilter,
    sex: Option<Sex>,
    response: Option<Response>,
) -> Vec<FlowStep> {
    let mut steps = Vec::new();
    let mut current = records.iter().collect::<Vec<_>>();
    push_step(&mut steps, "All samples".to_string(), &current);

    current.retain(|r| text_filter_admits(&filter.condition, &r.condition));
    push_step(&mut steps, format!("Condition={}", filter.condition), &current);

    current.retain(|r| text_filter_admits(&filter.sample_type, &r.sample_type));
    push_step(&mut steps, format!("SampleType={}", filter.sample_type), &current);

    current.retain(|r| text_filter_admits(&filter.treatment, &r.treatment));
    push_step(&mut steps, format!("Treatment={}", filter.treatment), &current);

    match filter.time {
        TimeFilter::BaselineOnly => {
            current.retain(|r| filter.time.admits(r.visit_time));
            push_step(&mut steps, "Time=Baseline".to_string(), &current);
        }
        TimeFilter::All => push_step(&mut steps, "Time=All".to_string(), &current),
    }

    if let Some(sex) = sex {
        current.retain(|r| r.sex == Some(sex));
        push_step(&mut steps, format!("Sex={}", sex.as_str()), &current);
    }
    if let Some(response) = response {
        current.retain(|r| r.response == Some(response));
        push_step(&mut steps, format!("Response={}", response.as_str()), &current);
    }

    steps
}

fn push_step(steps: &mut Vec<FlowStep>, label: String, current: &[&FrequencyRecord]) {
    let samples = current
        .iter()
        .map(|r| r.sample_id.as_str())
        .collect::<HashSet<_>>();
    let subjects = current.iter().map(|r| r.subject_pk).collect::<HashSet<_>>();
    steps.push(FlowStep {
        step: label,
        n_samples: samples.len(),
        n_subjects: subjects.len(),
    });
}

pub fn run_stage2_subset(conn: &Connection, filter: &CohortFilter) -> Result<SubsetStats> {
    let rows = fetch_subset(conn, filter)?;
    Ok(subset_stats(&rows))
}

pub fn subset_stats(rows: &[SubsetRow]) -> SubsetStats {
    let mut samples: BTreeMap<&str, &str> = BTreeMap::new();
    let mut subjects: BTreeMap<i64, &SubsetRow> = BTreeMap::new();
    for r in rows {
        samples
            .entry(r.sample_id.as_str())
            .or_insert(r.project_id.as_str());
        subjects.entry(r.subject_pk).or_insert(r);
    }

    let projects = samples.values().copied().collect::<BTreeSet<_>>();

    let samples_by_project = value_counts(samples.values().map(|p| p.to_string()));
    let subjects_by_project = value_counts(subjects.values().map(|r| r.project_id.clone()));
    let subjects_by_response = value_counts(
        subjects
            .values()
            .filter_map(|r| r.response.map(|v| v.as_str().to_string())),
    );
    let subjects_by_sex = value_counts(
        subjects
            .values()
            .filter_map(|r| r.sex.map(|v| v.as_str().to_string())),
    );

    let b_cell = rows
        .iter()
        .filter(|r| {
            r.sex == Some(Sex::M) && r.response == Some(Response::Yes) && r.cell_type == "b_cell"
        })
        .map(|r| r.count as f64)
        .collect::<Vec<_>>();
    let avg_b_cell_male_responders = if b_cell.is_empty() {
        None
    } else {
        Some(b_cell.iter().sum::<f64>() / b_cell.len() as f64)
    };

    SubsetStats {
        n_projects: projects.len(),
        n_samples: samples.len(),
        n_subjects: subjects.len(),
        samples_by_project,
        subjects_by_project,
        subjects_by_response,
        subjects_by_sex,
        avg_b_cell_male_responders,
    }
}

/// Counts per key, largest first, ties broken by key.
fn value_counts(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut out = counts.into_iter().collect::<Vec<_>>();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_cohort.rs"]
mod tests;
