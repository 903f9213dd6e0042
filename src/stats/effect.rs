/// Cliff's delta: `(#{a > b} - #{a < b}) / (n_a * n_b)` over all pairs.
/// Returns 0 when either group is empty.
pub fn cliffs_delta(group_a: &[f64], group_b: &[f64]) -> f64 {
    let total = group_a.len() * group_b.len();
    if total == 0 {
        return 0.0;
    }
    let mut gt = 0i64;
    let mut lt = 0i64;
    for a in group_a {
        for b in group_b {
            if a > b {
                gt += 1;
            } else if a < b {
                lt += 1;
            }
        }
    }
    (gt - lt) as f64 / total as f64
}

/// Rank-biserial correlation from the first group's U statistic.
pub fn rank_biserial(u: f64, n1: usize, n2: usize) -> Option<f64> {
    if n1 == 0 || n2 == 0 {
        return None;
    }
    Some(2.0 * u / (n1 * n2) as f64 - 1.0)
}
