mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod stats;
mod store;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::error::Result;
use crate::model::cohort::{CohortFilter, Response, Sex, TimeFilter, is_wildcard};
use crate::model::params::{ComparisonParams, Correction, Metric, TestKind, Transform, Unit};
use crate::pipeline::stage1_frequencies::{frequency_table, run_stage1};
use crate::pipeline::stage2_cohort::{
    build_cohort_flow, cohort_counts, filter_records, run_stage2_subset,
};
use crate::pipeline::stage4_compare::compare_responders;
use crate::pipeline::stage5_report::{write_frequency_table, write_reports};
use crate::report::ReportContext;
use crate::report::text::render_analysis_text;
use crate::report::tsv::{render_comparison_tsv, render_flow_tsv, render_frequency_tsv};
use crate::store::load::load_csv_to_db;
use crate::store::query::fetch_filter_options;
use crate::store::{DEFAULT_CSV_NAME, DEFAULT_DB_NAME, open_existing_db};

const DEFAULT_OUT_DIR: &str = "results";

#[derive(Parser, Debug)]
#[command(
    name = "kira-cohortstats",
    version,
    about = "Responder vs non-responder immune cell statistics from clinical-trial cell counts"
)]
struct Cli {
    /// SQLite database built by `load`.
    #[arg(long, global = true, env = "KIRA_COHORT_DB", default_value = DEFAULT_DB_NAME)]
    db: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the database from a cell count CSV.
    Load {
        #[arg(long, default_value = DEFAULT_CSV_NAME)]
        csv: PathBuf,
    },
    /// Per-sample relative frequency of every cell population.
    Frequencies {
        #[arg(long)]
        out: Option<PathBuf>,
        /// Rows printed to stdout.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Compare responders and non-responders per cell population.
    Compare(CompareArgs),
    /// Sample and subject counts after each filter step.
    Flow {
        #[command(flatten)]
        cohort: CohortArgs,
        /// M, F or all.
        #[arg(long, value_parser = parse_sex, default_value = "all")]
        sex: Selection<Sex>,
        /// yes, no or all.
        #[arg(long, value_parser = parse_response, default_value = "all")]
        response: Selection<Response>,
    },
    /// Project, response and sex breakdown of a cohort subset.
    Subset {
        #[command(flatten)]
        cohort: CohortArgs,
    },
    /// Distinct condition, treatment and sample type values.
    Filters,
    /// Load (optionally), compare and write every report.
    Analyze {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[command(flatten)]
        compare: CompareArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct CohortArgs {
    #[arg(long, default_value = "melanoma")]
    condition: String,
    #[arg(long, default_value = "miraclib")]
    treatment: String,
    #[arg(long, default_value = "PBMC")]
    sample_type: String,
    #[arg(long, value_enum, default_value_t = TimeFilter::BaselineOnly)]
    time: TimeFilter,
}

impl CohortArgs {
    fn to_filter(&self) -> CohortFilter {
        CohortFilter {
            condition: self.condition.clone(),
            treatment: self.treatment.clone(),
            sample_type: self.sample_type.clone(),
            time: self.time,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct CompareArgs {
    #[command(flatten)]
    cohort: CohortArgs,
    #[arg(long, value_enum, default_value_t = Unit::Subject)]
    unit: Unit,
    #[arg(long, value_enum, default_value_t = Metric::Percentage)]
    metric: Metric,
    #[arg(long, value_enum, default_value_t = Transform::None)]
    transform: Transform,
    #[arg(long, value_enum, default_value_t = TestKind::MannWhitney)]
    test: TestKind,
    #[arg(long, value_enum, default_value_t = Correction::BhFdr)]
    correction: Correction,
    #[arg(long, default_value_t = 1000)]
    bootstrap_iterations: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,
    /// Report directory; `analyze` falls back to `results`.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl CompareArgs {
    fn to_params(&self) -> ComparisonParams {
        ComparisonParams {
            filter: self.cohort.to_filter(),
            unit: self.unit,
            metric: self.metric,
            transform: self.transform,
            test: self.test,
            correction: self.correction,
            bootstrap_iterations: self.bootstrap_iterations,
            bootstrap_seed: self.seed,
            alpha: self.alpha,
            ..ComparisonParams::default_v1()
        }
    }
}

/// Flag value where `all` (or empty) means no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection<T> {
    All,
    Only(T),
}

impl<T> Selection<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

fn parse_sex(raw: &str) -> std::result::Result<Selection<Sex>, String> {
    if is_wildcard(raw.trim()) {
        return Ok(Selection::All);
    }
    Sex::from_field(raw)?
        .map(Selection::Only)
        .ok_or_else(|| "sex must be M, F or all".to_string())
}

fn parse_response(raw: &str) -> std::result::Result<Selection<Response>, String> {
    if is_wildcard(raw.trim()) {
        return Ok(Selection::All);
    }
    Response::from_field(raw)?
        .map(Selection::Only)
        .ok_or_else(|| "response must be yes, no or all".to_string())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Load { csv } => {
            let summary = load_csv_to_db(&csv, &cli.db)?;
            println!(
                "Loaded {} subjects, {} samples, {} cell counts into {}",
                summary.subjects,
                summary.samples,
                summary.cell_counts,
                cli.db.display()
            );
        }
        Command::Frequencies { out, limit } => {
            let conn = open_existing_db(&cli.db)?;
            let rows = frequency_table(&run_stage1(&conn)?);
            if let Some(path) = out {
                write_frequency_table(&path, &rows)?;
            }
            print!("{}", render_frequency_tsv(&rows[..limit.min(rows.len())]));
            println!("Total rows: {}", rows.len());
        }
        Command::Compare(args) => {
            let conn = open_existing_db(&cli.db)?;
            let records = run_stage1(&conn)?;
            let params = args.to_params();
            let cmp = compare_responders(&records, &params)?;
            print!("{}", render_comparison_tsv(&cmp.rows));
            if let Some(out_dir) = &args.out {
                let flow = build_cohort_flow(&records, &params.filter, None, None);
                let freqs = frequency_table(&records);
                let ctx = ReportContext {
                    filter: &params.filter,
                    counts: cohort_counts(&filter_records(&records, &params.filter)),
                    flow: &flow,
                    frequencies: &freqs,
                    rows: &cmp.rows,
                    method: &cmp.summary,
                    alpha: params.alpha,
                };
                write_reports(out_dir, &ctx, &cmp.units)?;
            }
        }
        Command::Flow {
            cohort,
            sex,
            response,
        } => {
            let conn = open_existing_db(&cli.db)?;
            let records = run_stage1(&conn)?;
            let flow = build_cohort_flow(
                &records,
                &cohort.to_filter(),
                sex.into_option(),
                response.into_option(),
            );
            print!("{}", render_flow_tsv(&flow));
        }
        Command::Subset { cohort } => {
            let conn = open_existing_db(&cli.db)?;
            let stats = run_stage2_subset(&conn, &cohort.to_filter())?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Filters => {
            let conn = open_existing_db(&cli.db)?;
            let options = fetch_filter_options(&conn)?;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Command::Analyze { csv, compare } => analyze(&cli.db, csv.as_deref(), &compare)?,
    }
    Ok(())
}

fn analyze(db: &Path, csv: Option<&Path>, args: &CompareArgs) -> Result<()> {
    if let Some(csv) = csv {
        load_csv_to_db(csv, db)?;
    } else if !db.exists() {
        load_csv_to_db(Path::new(DEFAULT_CSV_NAME), db)?;
    }

    let conn = open_existing_db(db)?;
    let records = run_stage1(&conn)?;
    let freqs = frequency_table(&records);
    let params = args.to_params();
    let flow = build_cohort_flow(&records, &params.filter, None, None);
    let counts = cohort_counts(&filter_records(&records, &params.filter));
    let cmp = compare_responders(&records, &params)?;

    let ctx = ReportContext {
        filter: &params.filter,
        counts,
        flow: &flow,
        frequencies: &freqs,
        rows: &cmp.rows,
        method: &cmp.summary,
        alpha: params.alpha,
    };
    let out_dir = resolve_output_dir(args.out.as_deref());
    write_reports(&out_dir, &ctx, &cmp.units)?;
    info!(
        samples = counts.n_samples,
        subjects = counts.n_subjects,
        significant = cmp.rows.iter().filter(|r| r.significant).count(),
        "analysis complete"
    );
    print!("{}", render_analysis_text(&ctx));
    Ok(())
}

fn resolve_output_dir(out: Option<&Path>) -> PathBuf {
    out.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
}

#[cfg(test)]
#[path = "../tests/src_inline/fixtures.rs"]
mod test_fixtures;

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
