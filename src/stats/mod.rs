//! Two-group statistics used by the responder comparison.
//!
//! Every routine here is pure: it takes plain `f64` slices and returns
//! `None` where the input cannot support the computation (empty groups,
//! degenerate variance) instead of producing NaN.

pub mod bootstrap;
pub mod descriptive;
pub mod effect;
pub mod fdr;
pub mod mann_whitney;
pub mod welch;

/// Test statistic and two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}
