use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ipa_assess::{
    aggregate_reports, build_report, AssessConfig, AssessmentCase, Assessor, AssessorBuilder,
    CaseFailure, Report,
};

#[path = "ipa_assess/json_report_formatter.rs"]
mod json_report_formatter;

const SUMMARY_FILE_NAME: &str = "summary.json";
const REPORT_SUFFIX: &str = ".report.json";

#[derive(Debug, Parser)]
#[command(name = "ipa_assess")]
#[command(about = "Score pronunciation by aligning expected and recognized IPA")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assess a single case file.
    Assess {
        case: PathBuf,
        /// Report path; the report goes to stdout when omitted.
        #[arg(long, env = "IPA_ASSESS_OUT")]
        out: Option<PathBuf>,
        #[command(flatten)]
        options: AssessOptions,
    },
    /// Assess every `*.json` case in a directory and write a summary.
    Batch {
        dir: PathBuf,
        #[arg(long, env = "IPA_ASSESS_OUT_DIR")]
        out_dir: PathBuf,
        #[command(flatten)]
        options: AssessOptions,
    },
}

#[derive(Debug, Args)]
struct AssessOptions {
    #[arg(long, env = "IPA_ASSESS_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "IPA_ASSESS_LEXICON")]
    lexicon: Option<PathBuf>,
    #[arg(long, env = "IPA_ASSESS_RULES")]
    rules: Option<PathBuf>,
    /// Always align word by word, however few words were recognized.
    #[arg(long, env = "IPA_ASSESS_NO_FALLBACK", default_value_t = false)]
    no_fallback: bool,
    #[arg(long, env = "IPA_ASSESS_MIN_PREDICTED_WORDS")]
    min_predicted_words: Option<usize>,
    #[arg(long, env = "IPA_ASSESS_MIN_WORD_RATIO")]
    min_word_ratio: Option<f64>,
    /// Default filter when RUST_LOG is unset.
    #[arg(long, env = "IPA_ASSESS_LOG", default_value = "warn")]
    log_level: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Assess { case, out, options } => {
            init_subscriber(&options.log_level);
            let assessor = build_assessor(&options)?;
            run_assess(&assessor, &case, out.as_deref())
        }
        Command::Batch {
            dir,
            out_dir,
            options,
        } => {
            init_subscriber(&options.log_level);
            let assessor = build_assessor(&options)?;
            run_batch(&assessor, &dir, &out_dir)
        }
    }
}

fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn build_assessor(options: &AssessOptions) -> Result<Assessor, String> {
    let mut config = match options.config.as_ref() {
        Some(path) => AssessConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => AssessConfig::default(),
    };
    if let Some(path) = options.lexicon.as_ref() {
        config.lexicon_path = Some(path.to_string_lossy().into_owned());
    }
    if let Some(path) = options.rules.as_ref() {
        config.rules_path = Some(path.to_string_lossy().into_owned());
    }
    if options.no_fallback {
        config.fallback.enabled = false;
    }
    if let Some(min) = options.min_predicted_words {
        config.fallback.min_predicted_words = min;
    }
    if let Some(ratio) = options.min_word_ratio {
        config.fallback.min_word_ratio = ratio;
    }

    AssessorBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build Assessor: {err}"))
}

fn assess_case(assessor: &Assessor, path: &Path) -> Result<Report, String> {
    let case = AssessmentCase::load(path).map_err(|err| format!("{err}"))?;
    let input = case.to_input().map_err(|err| format!("{err}"))?;
    let stem = case_stem(path);
    let output = assessor.assess(&input).map_err(|err| format!("{err}"))?;
    Ok(build_report(
        case.id_or(&stem),
        &input,
        output,
        Utc::now().to_rfc3339(),
    ))
}

fn run_assess(assessor: &Assessor, case_path: &Path, out: Option<&Path>) -> Result<(), String> {
    let report = assess_case(assessor, case_path)
        .map_err(|err| format!("{}: {err}", case_path.display()))?;
    match out {
        Some(out_path) => {
            json_report_formatter::write_json(out_path, &report)?;
            println!("{}", out_path.display());
        }
        None => json_report_formatter::print_json(&report)?,
    }
    Ok(())
}

fn run_batch(assessor: &Assessor, dir: &Path, out_dir: &Path) -> Result<(), String> {
    let cases = collect_case_files(dir)?;
    if cases.is_empty() {
        return Err(format!("No case files found in '{}'.", dir.display()));
    }

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let mut reports = Vec::with_capacity(cases.len());
    let mut failures = Vec::new();
    for path in &cases {
        let stem = case_stem(path);
        progress.set_message(stem.clone());
        match assess_case(assessor, path) {
            Ok(report) => {
                let out_path = out_dir.join(format!("{stem}{REPORT_SUFFIX}"));
                json_report_formatter::write_json(&out_path, &report)?;
                reports.push(report);
            }
            Err(error) => {
                tracing::warn!(case = %path.display(), %error, "batch: case failed");
                failures.push(CaseFailure { id: stem, error });
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let failed = failures.len();
    let summary = aggregate_reports(&reports, failures, Utc::now().to_rfc3339());
    let summary_path = out_dir.join(SUMMARY_FILE_NAME);
    json_report_formatter::write_json(&summary_path, &summary)?;
    println!("{}", summary_path.display());
    println!(
        "assessed: {} failed: {} overall PER: {:.3}",
        reports.len(),
        failed,
        summary.metrics.phoneme_error_rate
    );
    Ok(())
}

fn collect_case_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(dir)
        .map_err(|err| format!("Failed to read case directory '{}': {err}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| format!("Failed to read entry in '{}': {err}", dir.display()))?
            .path();
        if path.is_file() && is_case_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `*.json` files other than this tool's own reports and summary.
fn is_case_file(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|name| name.to_string_lossy()) else {
        return false;
    };
    name.ends_with(".json") && !name.ends_with(REPORT_SUFFIX) && name != SUMMARY_FILE_NAME
}

fn case_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
