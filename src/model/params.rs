use serde::Serialize;

use crate::model::cohort::{CohortFilter, TimeFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Sample,
    Subject,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Sample => "sample",
            Unit::Subject => "subject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Percentage,
    Count,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Percentage => "percentage",
            Metric::Count => "count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    None,
    Clr,
}

impl Transform {
    pub fn label(self) -> &'static str {
        match self {
            Transform::None => "Raw",
            Transform::Clr => "CLR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    #[value(alias = "mannwhitney")]
    MannWhitney,
    #[value(alias = "welch_t")]
    WelchT,
}

impl TestKind {
    pub fn label(self) -> &'static str {
        match self {
            TestKind::MannWhitney => "Mann-Whitney U",
            TestKind::WelchT => "Welch t-test",
        }
    }

    pub fn effect_label(self) -> &'static str {
        match self {
            TestKind::MannWhitney => "rank_biserial",
            TestKind::WelchT => "mean_diff",
        }
    }

    /// Location statistic the bootstrap interval is built on.
    pub fn ci_statistic(self) -> CiStatistic {
        match self {
            TestKind::MannWhitney => CiStatistic::Median,
            TestKind::WelchT => CiStatistic::Mean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    None,
    #[value(alias = "bh_fdr")]
    BhFdr,
    Bonferroni,
}

impl Correction {
    pub fn label(self) -> &'static str {
        match self {
            Correction::None => "None",
            Correction::BhFdr => "BH-FDR",
            Correction::Bonferroni => "Bonferroni",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatistic {
    Mean,
    Median,
}

impl CiStatistic {
    pub fn as_str(self) -> &'static str {
        match self {
            CiStatistic::Mean => "mean",
            CiStatistic::Median => "median",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonParams {
    pub filter: CohortFilter,
    pub unit: Unit,
    pub metric: Metric,
    pub transform: Transform,
    pub test: TestKind,
    pub correction: Correction,
    pub bootstrap_iterations: usize,
    pub bootstrap_seed: u64,
    pub alpha: f64,
    pub clr_pseudocount: f64,
}

impl ComparisonParams {
    pub fn default_v1() -> Self {
        Self {
            filter: CohortFilter::melanoma_miraclib_pbmc(TimeFilter::BaselineOnly),
            unit: Unit::Subject,
            metric: Metric::Percentage,
            transform: Transform::None,
            test: TestKind::MannWhitney,
            correction: Correction::BhFdr,
            bootstrap_iterations: 1000,
            bootstrap_seed: 42,
            alpha: 0.05,
            clr_pseudocount: 1e-6,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(format!("alpha must be in (0, 1), got {}", self.alpha));
        }
        if !(self.clr_pseudocount > 0.0) {
            return Err(format!(
                "CLR pseudocount must be positive, got {}",
                self.clr_pseudocount
            ));
        }
        Ok(())
    }
}
