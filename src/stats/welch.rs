use statrs::distribution::{ContinuousCDF, StudentsT};

use super::TestOutcome;
use super::descriptive::{mean, sample_variance};

/// Two-sided Welch (unequal variance) t-test with Welch-Satterthwaite degrees
/// of freedom. `None` when either group has fewer than two observations or
/// the standard error is zero.
pub fn welch_t(x: &[f64], y: &[f64]) -> Option<TestOutcome> {
    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let v1 = sample_variance(x)?;
    let v2 = sample_variance(y)?;

    let a = v1 / n1;
    let b = v2 / n2;
    let se2 = a + b;
    if !(se2 > 0.0) || !se2.is_finite() {
        return None;
    }

    let t = (mean(x)? - mean(y)?) / se2.sqrt();
    let df = se2 * se2 / (a * a / (n1 - 1.0) + b * b / (n2 - 1.0));
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = (2.0 * dist.cdf(-t.abs())).min(1.0);

    Some(TestOutcome {
        statistic: t,
        p_value,
    })
}
