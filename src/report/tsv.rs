use std::fmt::Write;

use crate::model::records::UnitValue;
use crate::model::results::{ComparisonRow, FlowStep, FrequencyRow};
use crate::report::{MISSING, format_f64_6, format_opt};

pub fn render_frequency_tsv(rows: &[FrequencyRow]) -> String {
    let mut out = String::from("sample\ttotal_count\tpopulation\tcount\tpercentage\n");
    for r in rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            r.sample,
            r.total_count,
            r.population,
            r.count,
            format_f64_6(r.percentage)
        );
    }
    out
}

pub fn render_comparison_tsv(rows: &[ComparisonRow]) -> String {
    let header = [
        "cell_type",
        "n_yes",
        "n_no",
        "stat_score",
        "p_value",
        "q_value",
        "significant",
        "median_yes",
        "median_no",
        "median_diff",
        "mean_diff",
        "direction",
        "ci_target",
        "ci_95_low",
        "ci_95_high",
        "effect_label",
        "effect",
        "cliffs_delta",
        "avg_responder",
        "avg_non_responder",
    ]
    .join("\t");

    let mut out = String::new();
    let _ = writeln!(out, "{}", header);
    for r in rows {
        let row = [
            r.cell_type.clone(),
            r.n_yes.to_string(),
            r.n_no.to_string(),
            format_opt(r.stat_score),
            format_sci(r.p_value),
            format_sci(r.q_value),
            r.significant.to_string(),
            format_opt(r.median_yes),
            format_opt(r.median_no),
            format_opt(r.median_diff),
            format_opt(r.mean_diff),
            r.direction.as_str().to_string(),
            r.ci_target.clone(),
            format_opt(r.ci_95_low),
            format_opt(r.ci_95_high),
            r.effect_label.clone(),
            format_opt(r.effect),
            format_opt(r.cliffs_delta),
            format_opt(r.avg_responder),
            format_opt(r.avg_non_responder),
        ]
        .join("\t");
        let _ = writeln!(out, "{}", row);
    }
    out
}

pub fn render_flow_tsv(steps: &[FlowStep]) -> String {
    let mut out = String::from("step\tn_samples\tn_subjects\n");
    for s in steps {
        let _ = writeln!(out, "{}\t{}\t{}", s.step, s.n_samples, s.n_subjects);
    }
    out
}

pub fn render_units_tsv(units: &[UnitValue]) -> String {
    let mut out = String::from("unit_id\tresponse\tcell_type\tvalue\n");
    for u in units {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            u.unit_id,
            u.response.map(|r| r.as_str()).unwrap_or(MISSING),
            u.cell_type,
            format_f64_6(u.value)
        );
    }
    out
}

// Full precision for p/q so downstream tools can re-threshold.
fn format_sci(v: Option<f64>) -> String {
    v.map(|p| format!("{:e}", p))
        .unwrap_or_else(|| MISSING.to_string())
}
