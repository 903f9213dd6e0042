use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherInResponders,
    HigherInNonResponders,
    NoDifference,
    Undetermined,
}

impl Direction {
    pub fn from_diff(diff: Option<f64>) -> Self {
        match diff {
            Some(d) if d > 0.0 => Direction::HigherInResponders,
            Some(d) if d < 0.0 => Direction::HigherInNonResponders,
            Some(_) => Direction::NoDifference,
            None => Direction::Undetermined,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::HigherInResponders => "higher_in_responders",
            Direction::HigherInNonResponders => "higher_in_non_responders",
            Direction::NoDifference => "no_difference",
            Direction::Undetermined => "undetermined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub cell_type: String,
    pub n_yes: usize,
    pub n_no: usize,
    pub p_value: Option<f64>,
    pub q_value: Option<f64>,
    pub significant: bool,
    pub stat_score: Option<f64>,
    pub median_yes: Option<f64>,
    pub median_no: Option<f64>,
    pub median_diff: Option<f64>,
    pub mean_diff: Option<f64>,
    pub direction: Direction,
    pub ci_target: String,
    pub ci_95_low: Option<f64>,
    pub ci_95_high: Option<f64>,
    pub effect: Option<f64>,
    pub effect_label: String,
    pub cliffs_delta: Option<f64>,
    pub avg_responder: Option<f64>,
    pub avg_non_responder: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub test_label: String,
    pub correction_label: String,
    pub unit: String,
    pub metric: String,
    pub transform_label: String,
    pub bootstrap_ci: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CohortCounts {
    pub n_samples: usize,
    pub n_subjects: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    pub step: String,
    pub n_samples: usize,
    pub n_subjects: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetStats {
    pub n_projects: usize,
    pub n_samples: usize,
    pub n_subjects: usize,
    pub samples_by_project: Vec<(String, usize)>,
    pub subjects_by_project: Vec<(String, usize)>,
    pub subjects_by_response: Vec<(String, usize)>,
    pub subjects_by_sex: Vec<(String, usize)>,
    pub avg_b_cell_male_responders: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub conditions: Vec<String>,
    pub treatments: Vec<String>,
    pub sample_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub sample: String,
    pub total_count: i64,
    pub population: String,
    pub count: i64,
    pub percentage: f64,
}
