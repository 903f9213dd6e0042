use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Yes,
    No,
}

impl Response {
    /// Blank and NA-like values map to `None`; anything else must be yes/no.
    pub fn from_field(raw: &str) -> Result<Option<Self>, String> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "na" | "nan" | "none" => Ok(None),
            "yes" => Ok(Some(Response::Yes)),
            "no" => Ok(Some(Response::No)),
            other => Err(format!("response must be yes or no, got '{}'", other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Response::Yes => "yes",
            Response::No => "no",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    pub fn from_field(raw: &str) -> Result<Option<Self>, String> {
        let value = raw.trim().to_ascii_uppercase();
        match value.as_str() {
            "" | "NA" | "NAN" => Ok(None),
            "M" => Ok(Some(Sex::M)),
            "F" => Ok(Some(Sex::F)),
            other => Err(format!("sex must be M or F, got '{}'", other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    All,
    #[value(alias = "baseline_only")]
    BaselineOnly,
}

impl TimeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeFilter::All => "all",
            TimeFilter::BaselineOnly => "baseline_only",
        }
    }

    pub fn admits(self, visit_time: f64) -> bool {
        match self {
            TimeFilter::All => true,
            TimeFilter::BaselineOnly => visit_time == 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortFilter {
    pub condition: String,
    pub treatment: String,
    pub sample_type: String,
    pub time: TimeFilter,
}

impl CohortFilter {
    pub fn melanoma_miraclib_pbmc(time: TimeFilter) -> Self {
        Self {
            condition: "melanoma".to_string(),
            treatment: "miraclib".to_string(),
            sample_type: "PBMC".to_string(),
            time,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "condition={}, treatment={}, sample_type={}, time={}",
            self.condition,
            self.treatment,
            self.sample_type,
            self.time.as_str()
        )
    }
}

/// An empty or `all` filter value admits everything. Matching ignores case.
pub fn text_filter_admits(filter: &str, value: &str) -> bool {
    let filter = filter.trim();
    if is_wildcard(filter) {
        return true;
    }
    filter.eq_ignore_ascii_case(value.trim())
}

pub fn is_wildcard(filter: &str) -> bool {
    filter.is_empty() || filter.eq_ignore_ascii_case("all")
}
