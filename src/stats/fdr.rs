//! Multiple testing correction across the per-cell-type tests.
//!
//! Missing p-values (groups too small to test) stay missing and do not count
//! toward the number of hypotheses.

use crate::model::params::Correction;

pub fn adjust(pvalues: &[Option<f64>], correction: Correction) -> Vec<Option<f64>> {
    match correction {
        Correction::None => pvalues.to_vec(),
        Correction::BhFdr => benjamini_hochberg(pvalues),
        Correction::Bonferroni => bonferroni(pvalues),
    }
}

/// Benjamini-Hochberg step-up adjustment: `q_(i) = min_{j >= i} p_(j) * m / j`,
/// capped at 1.
pub fn benjamini_hochberg(pvalues: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut present = pvalues
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.filter(|v| v.is_finite()).map(|v| (i, v)))
        .collect::<Vec<_>>();
    let mut out = vec![None; pvalues.len()];
    if present.is_empty() {
        return out;
    }

    present.sort_by(|a, b| a.1.total_cmp(&b.1));
    let m = present.len() as f64;

    let mut cummin = 1.0f64;
    for rank in (0..present.len()).rev() {
        let (orig, p) = present[rank];
        let q = p * m / (rank + 1) as f64;
        cummin = cummin.min(q);
        out[orig] = Some(cummin.min(1.0));
    }
    out
}

pub fn bonferroni(pvalues: &[Option<f64>]) -> Vec<Option<f64>> {
    let m = pvalues.iter().filter(|p| p.is_some_and(f64::is_finite)).count() as f64;
    pvalues
        .iter()
        .map(|p| p.filter(|v| v.is_finite()).map(|v| (v * m).min(1.0)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/fdr.rs"]
mod tests;
