use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::descriptive::{mean, median, quantile_sorted, sorted_copy};
use crate::model::params::CiStatistic;

pub const CI_LOW_QUANTILE: f64 = 0.025;
pub const CI_HIGH_QUANTILE: f64 = 0.975;

/// Percentile 95% interval for `stat(yes*) - stat(no*)`, where `*` denotes a
/// same-size resample with replacement. Deterministic for a given seed.
pub fn bootstrap_diff_ci(
    group_yes: &[f64],
    group_no: &[f64],
    statistic: CiStatistic,
    iterations: usize,
    seed: u64,
) -> Option<(f64, f64)> {
    if group_yes.is_empty() || group_no.is_empty() || iterations == 0 {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut yes_buf = Vec::with_capacity(group_yes.len());
    let mut no_buf = Vec::with_capacity(group_no.len());
    let mut diffs = Vec::with_capacity(iterations);

    for _ in 0..iterations {
        resample(&mut rng, group_yes, &mut yes_buf);
        resample(&mut rng, group_no, &mut no_buf);
        let diff = location(&yes_buf, statistic)? - location(&no_buf, statistic)?;
        diffs.push(diff);
    }

    let sorted = sorted_copy(&diffs);
    Some((
        quantile_sorted(&sorted, CI_LOW_QUANTILE),
        quantile_sorted(&sorted, CI_HIGH_QUANTILE),
    ))
}

fn resample(rng: &mut StdRng, source: &[f64], out: &mut Vec<f64>) {
    out.clear();
    for _ in 0..source.len() {
        out.push(source[rng.gen_range(0..source.len())]);
    }
}

fn location(values: &[f64], statistic: CiStatistic) -> Option<f64> {
    match statistic {
        CiStatistic::Mean => mean(values),
        CiStatistic::Median => median(values),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/bootstrap.rs"]
mod tests;
