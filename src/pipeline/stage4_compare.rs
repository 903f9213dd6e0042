use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::{CohortError, Result};
use crate::model::cohort::Response;
use crate::model::params::{ComparisonParams, TestKind, Transform};
use crate::model::records::{FrequencyRecord, UnitValue};
use crate::model::results::{ComparisonRow, Direction, MethodSummary};
use crate::pipeline::stage2_cohort::filter_records;
use crate::pipeline::stage3_units::{apply_clr, prepare_unit_level};
use crate::stats::bootstrap::bootstrap_diff_ci;
use crate::stats::descriptive::{mean, median};
use crate::stats::effect::{cliffs_delta, rank_biserial};
use crate::stats::fdr;
use crate::stats::mann_whitney::mann_whitney_u;
use crate::stats::welch::welch_t;

#[derive(Debug, Clone)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    pub units: Vec<UnitValue>,
    pub summary: MethodSummary,
}

pub fn compare_responders(
    records: &[FrequencyRecord],
    params: &ComparisonParams,
) -> Result<Comparison> {
    params.validate().map_err(CohortError::InvalidParameter)?;

    let filtered = filter_records(records, &params.filter);
    info!(
        filter = %params.filter.describe(),
        records = filtered.len(),
        "comparing responders"
    );

    let mut units = prepare_unit_level(&filtered, params.unit, params.metric);
    if params.transform == Transform::Clr {
        units = apply_clr(&units, params.clr_pseudocount);
    }

    let cell_types = units
        .iter()
        .map(|u| u.cell_type.as_str())
        .collect::<BTreeSet<_>>();

    let mut rows = Vec::with_capacity(cell_types.len());
    for (idx, cell_type) in cell_types.iter().enumerate() {
        let (yes, no) = split_by_response(&units, cell_type);
        let seed = params.bootstrap_seed.wrapping_add(idx as u64);
        let row = compare_cell_type(cell_type, &yes, &no, params, seed);
        debug!(
            cell_type = %row.cell_type,
            n_yes = row.n_yes,
            n_no = row.n_no,
            p_value = ?row.p_value,
            "cell type compared"
        );
        rows.push(row);
    }

    let pvalues = rows.iter().map(|r| r.p_value).collect::<Vec<_>>();
    let qvalues = fdr::adjust(&pvalues, params.correction);
    for (row, q) in rows.iter_mut().zip(qvalues) {
        row.q_value = q;
        row.significant = q.is_some_and(|q| q < params.alpha);
    }

    rows.sort_by(|a, b| {
        cmp_missing_last(a.q_value, b.q_value).then(cmp_missing_last(a.p_value, b.p_value))
    });

    Ok(Comparison {
        rows,
        units,
        summary: method_summary(params),
    })
}

fn split_by_response(units: &[UnitValue], cell_type: &str) -> (Vec<f64>, Vec<f64>) {
    let mut yes = Vec::new();
    let mut no = Vec::new();
    for u in units.iter().filter(|u| u.cell_type == cell_type) {
        match u.response {
            Some(Response::Yes) => yes.push(u.value),
            Some(Response::No) => no.push(u.value),
            None => {}
        }
    }
    (yes, no)
}

fn compare_cell_type(
    cell_type: &str,
    yes: &[f64],
    no: &[f64],
    params: &ComparisonParams,
    seed: u64,
) -> ComparisonRow {
    let median_yes = median(yes);
    let median_no = median(no);
    let avg_yes = mean(yes);
    let avg_no = mean(no);
    let median_diff = median_yes.zip(median_no).map(|(a, b)| a - b);
    let mean_diff = avg_yes.zip(avg_no).map(|(a, b)| a - b);

    let ci_statistic = params.test.ci_statistic();
    let ci = bootstrap_diff_ci(yes, no, ci_statistic, params.bootstrap_iterations, seed);

    let (outcome, effect) = match params.test {
        TestKind::MannWhitney => {
            let outcome = mann_whitney_u(yes, no);
            let effect = outcome.and_then(|o| rank_biserial(o.statistic, yes.len(), no.len()));
            (outcome, effect)
        }
        TestKind::WelchT => (welch_t(yes, no), mean_diff),
    };

    let both = !yes.is_empty() && !no.is_empty();

    ComparisonRow {
        cell_type: cell_type.to_string(),
        n_yes: yes.len(),
        n_no: no.len(),
        p_value: outcome.map(|o| o.p_value),
        q_value: None,
        significant: false,
        stat_score: outcome.map(|o| o.statistic),
        median_yes,
        median_no,
        median_diff,
        mean_diff,
        direction: Direction::from_diff(median_diff),
        ci_target: format!("{}_diff", ci_statistic.as_str()),
        ci_95_low: ci.map(|c| c.0),
        ci_95_high: ci.map(|c| c.1),
        effect,
        effect_label: params.test.effect_label().to_string(),
        cliffs_delta: both.then(|| cliffs_delta(yes, no)),
        avg_responder: avg_yes,
        avg_non_responder: avg_no,
    }
}

fn cmp_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn method_summary(params: &ComparisonParams) -> MethodSummary {
    MethodSummary {
        test_label: params.test.label().to_string(),
        correction_label: params.correction.label().to_string(),
        unit: params.unit.as_str().to_string(),
        metric: params.metric.as_str().to_string(),
        transform_label: params.transform.label().to_string(),
        bootstrap_ci: format!(
            "95% bootstrap CI on {} difference ({} resamples)",
            params.test.ci_statistic().as_str(),
            params.bootstrap_iterations
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_compare.rs"]
mod tests;
