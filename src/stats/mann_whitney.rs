//! Two-sided Mann-Whitney U (Wilcoxon rank-sum) test.
//!
//! The reported statistic is U for the first sample. The p-value comes from
//! the exact null distribution when there are no ties and the smaller group
//! has at most [`EXACT_MAX_SMALLER`] observations; otherwise from the normal
//! approximation with tie and continuity corrections.

use statrs::function::erf::erfc;

use super::TestOutcome;

pub const EXACT_MAX_SMALLER: usize = 8;

/// Upper bound on `C(n1 + n2, min(n1, n2))` for the exact path; the null
/// counts are accumulated in `i128`.
const EXACT_MAX_ARRANGEMENTS: u128 = 1 << 100;

pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Option<TestOutcome> {
    let n1 = x.len();
    let n2 = y.len();
    if n1 == 0 || n2 == 0 {
        return None;
    }

    let (ranks, tie_sizes) = average_ranks(x, y);
    let r1 = ranks[..n1].iter().sum::<f64>();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u_max = u1.max(u2);
    let has_ties = tie_sizes.iter().any(|&t| t > 1);

    let p_value = if !has_ties
        && n1.min(n2) <= EXACT_MAX_SMALLER
        && exact_is_tractable(n1.min(n2), n1.max(n2))
    {
        exact_two_sided(u_max.round() as usize, n1, n2)
    } else {
        asymptotic_two_sided(u_max, n1, n2, &tie_sizes)
    };

    Some(TestOutcome {
        statistic: u1,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// Average ranks (1-based) over the pooled sample, `x` first, plus the size
/// of every tie group.
fn average_ranks(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let pooled = x.iter().chain(y.iter()).copied().collect::<Vec<_>>();
    let n = pooled.len();
    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|&a, &b| pooled[a].total_cmp(&pooled[b]));

    let mut ranks = vec![0.0; n];
    let mut tie_sizes = Vec::new();
    let mut i = 0usize;
    while i < n {
        let mut j = i + 1;
        while j < n && pooled[order[j]] == pooled[order[i]] {
            j += 1;
        }
        // positions i..j share the average of ranks i+1..=j
        let avg = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg;
        }
        tie_sizes.push(j - i);
        i = j;
    }
    (ranks, tie_sizes)
}

fn asymptotic_two_sided(u: f64, n1: usize, n2: usize, tie_sizes: &[usize]) -> f64 {
    let n = (n1 + n2) as f64;
    let n1n2 = (n1 * n2) as f64;
    let mu = n1n2 / 2.0;
    let tie_term = tie_sizes
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum::<f64>();
    let variance = n1n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if !(variance > 0.0) {
        // every observation tied
        return 1.0;
    }
    let z = (u - mu - 0.5) / variance.sqrt();
    2.0 * normal_sf(z)
}

fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// True when `C(m + n, m)` stays within [`EXACT_MAX_ARRANGEMENTS`].
fn exact_is_tractable(m: usize, n: usize) -> bool {
    let mut arrangements: u128 = 1;
    for i in 1..=m {
        // C(n + i, i) = C(n + i - 1, i - 1) * (n + i) / i, exact at each step
        arrangements = match arrangements.checked_mul((n + i) as u128) {
            Some(v) => v / i as u128,
            None => return false,
        };
        if arrangements > EXACT_MAX_ARRANGEMENTS {
            return false;
        }
    }
    true
}

/// `2 * P(U >= u)` under the exact null.
fn exact_two_sided(u: usize, n1: usize, n2: usize) -> f64 {
    let counts = null_counts(n1.min(n2), n1.max(n2));
    let total = counts.iter().sum::<i128>();
    if u >= counts.len() {
        return 0.0;
    }
    let upper = counts[u..].iter().sum::<i128>();
    2.0 * upper as f64 / total as f64
}

/// Number of rank arrangements giving each U, i.e. the coefficients of the
/// Gaussian binomial `[m + n choose m]_q = prod_{i=1..m} (1 - q^(n+i)) / (1 - q^i)`.
fn null_counts(m: usize, n: usize) -> Vec<i128> {
    let len = m * n + 1;
    let mut c = vec![0i128; len];
    c[0] = 1;
    for i in 1..=m {
        let a = n + i;
        for j in (a..len).rev() {
            c[j] -= c[j - a];
        }
        for j in i..len {
            c[j] += c[j - i];
        }
    }
    c
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/mann_whitney.rs"]
mod tests;
