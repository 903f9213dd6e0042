use super::*;

fn approx(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|v| (v - b).abs() < 1e-12)
}

#[test]
fn test_bh_known_values() {
    let p = [Some(0.01), Some(0.04), Some(0.03), Some(0.02)];
    let q = benjamini_hochberg(&p);
    for v in &q {
        assert!(approx(*v, 0.04));
    }
}

#[test]
fn test_bh_monotone_step_up() {
    let p = [Some(0.001), Some(0.2), Some(0.03), Some(0.9)];
    let q = benjamini_hochberg(&p);
    // sorted: 0.001 (r1), 0.03 (r2), 0.2 (r3), 0.9 (r4); m = 4
    assert!(approx(q[0], 0.004));
    assert!(approx(q[2], 0.06));
    assert!(approx(q[1], 0.2 * 4.0 / 3.0));
    assert!(approx(q[3], 0.9));
    for (pv, qv) in p.iter().zip(q.iter()) {
        assert!(qv.unwrap() >= pv.unwrap());
        assert!(qv.unwrap() <= 1.0);
    }
}

#[test]
fn test_bh_missing_values_pass_through() {
    let p = [Some(0.01), None, Some(0.04)];
    let q = benjamini_hochberg(&p);
    assert!(approx(q[0], 0.02));
    assert_eq!(q[1], None);
    assert!(approx(q[2], 0.04));
    assert_eq!(benjamini_hochberg(&[None, None]), vec![None, None]);
}

#[test]
fn test_bonferroni() {
    let q = bonferroni(&[Some(0.01), None, Some(0.6)]);
    assert!(approx(q[0], 0.02));
    assert_eq!(q[1], None);
    assert!(approx(q[2], 1.0));
}

#[test]
fn test_adjust_none_is_identity() {
    let p = [Some(0.3), None];
    assert_eq!(adjust(&p, Correction::None), p.to_vec());
}
