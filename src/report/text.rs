use crate::model::results::{ComparisonRow, Direction};
use crate::report::{ReportContext, format_f64_6, format_opt, format_pvalue};

pub const FREQUENCY_PREVIEW_ROWS: usize = 5;

pub fn render_analysis_text(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();

    out.push_str("Immune Cell Responder Comparison Report\n");
    out.push_str("=======================================\n\n");

    out.push_str("1. Relative frequencies\n");
    out.push_str(&format!("Total rows: {}\n", ctx.frequencies.len()));
    for r in ctx.frequencies.iter().take(FREQUENCY_PREVIEW_ROWS) {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            r.sample,
            r.total_count,
            r.population,
            r.count,
            format_f64_6(r.percentage)
        ));
    }
    out.push('\n');

    out.push_str("2. Cohort\n");
    out.push_str(&format!("Filters: {}\n", ctx.filter.describe()));
    for step in ctx.flow {
        out.push_str(&format!(
            "{}: {} samples, {} subjects\n",
            step.step, step.n_samples, step.n_subjects
        ));
    }
    out.push('\n');

    out.push_str("3. Method\n");
    out.push_str(&format!(
        "Method: {} | Correction: {} | Unit: {} | Metric: {} | Transform: {} | {}\n\n",
        ctx.method.test_label,
        ctx.method.correction_label,
        ctx.method.unit,
        ctx.method.metric,
        ctx.method.transform_label,
        ctx.method.bootstrap_ci
    ));

    out.push_str("4. Results\n");
    if ctx.rows.is_empty() {
        out.push_str("No units left after filtering.\n\n");
    } else {
        out.push_str("cell_type\tn_yes\tn_no\tp_value\tq_value\tmedian_diff\tci_95\n");
        for r in ctx.rows {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                r.cell_type,
                r.n_yes,
                r.n_no,
                format_pvalue(r.p_value),
                format_pvalue(r.q_value),
                format_opt(r.median_diff),
                format_ci(r)
            ));
        }
        out.push('\n');
    }

    out.push_str("5. Interpretation\n");
    out.push_str(&interpretation(ctx.rows, ctx.alpha));

    out
}

fn interpretation(rows: &[ComparisonRow], alpha: f64) -> String {
    let significant = rows.iter().filter(|r| r.significant).collect::<Vec<_>>();
    if significant.is_empty() {
        return format!("No cell population differs significantly at q < {}.\n", alpha);
    }
    let mut out = String::new();
    for r in significant {
        out.push_str(&format!(
            "{}: {} (q = {}, CI {})\n",
            r.cell_type,
            direction_phrase(r.direction),
            format_pvalue(r.q_value),
            format_ci(r)
        ));
    }
    out
}

fn direction_phrase(direction: Direction) -> &'static str {
    match direction {
        Direction::HigherInResponders => "higher in responders",
        Direction::HigherInNonResponders => "higher in non-responders",
        Direction::NoDifference => "no median difference",
        Direction::Undetermined => "direction undetermined",
    }
}

fn format_ci(r: &ComparisonRow) -> String {
    match (r.ci_95_low, r.ci_95_high) {
        (Some(lo), Some(hi)) => format!("[{}, {}]", format_f64_6(lo), format_f64_6(hi)),
        _ => "NA".to_string(),
    }
}
