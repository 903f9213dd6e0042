use super::*;

#[test]
fn test_deterministic_for_seed() {
    let yes = [5.0, 6.0, 7.0, 8.0, 9.0];
    let no = [1.0, 2.0, 3.0, 4.0];
    let a = bootstrap_diff_ci(&yes, &no, CiStatistic::Median, 500, 42).unwrap();
    let b = bootstrap_diff_ci(&yes, &no, CiStatistic::Median, 500, 42).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_interval_brackets_observed_shift() {
    let yes = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
    let no = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let (low, high) = bootstrap_diff_ci(&yes, &no, CiStatistic::Mean, 1000, 7).unwrap();
    assert!(low <= high);
    assert!(low <= 9.0 && 9.0 <= high);
    // Every resampled mean of `yes` exceeds every resampled mean of `no`.
    assert!(low >= 4.0);
    assert!(high <= 14.0);
}

#[test]
fn test_constant_groups_give_point_interval() {
    let (low, high) =
        bootstrap_diff_ci(&[3.0, 3.0, 3.0], &[1.0, 1.0], CiStatistic::Median, 100, 1).unwrap();
    assert_eq!(low, 2.0);
    assert_eq!(high, 2.0);
}

#[test]
fn test_empty_inputs() {
    assert!(bootstrap_diff_ci(&[], &[1.0], CiStatistic::Mean, 100, 1).is_none());
    assert!(bootstrap_diff_ci(&[1.0], &[], CiStatistic::Mean, 100, 1).is_none());
    assert!(bootstrap_diff_ci(&[1.0], &[2.0], CiStatistic::Mean, 0, 1).is_none());
}
