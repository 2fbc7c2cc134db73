use crate::infra::{build_orchestrator, read_json};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use visa_eval::config::AppConfig;
use visa_eval::error::AppError;
use visa_eval::evaluation::{visa_summaries, EvaluationOrchestrator, EvaluationRequest};
use visa_eval::telemetry::{self, LogSink};

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Visa type code, e.g. E-7
    #[arg(long)]
    pub(crate) visa_type: String,
    /// Application mode: new, extension, or change
    #[arg(long)]
    pub(crate) mode: String,
    /// JSON file holding the applicant data object
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
    /// YAML catalog to evaluate against
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// JSON file holding an array of {visa_type, mode, data} requests
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
    /// YAML catalog to evaluate against
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// YAML catalog to list instead of the configured one
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        visa_type,
        mode,
        data,
        pretty,
        catalog,
    } = args;

    let orchestrator = prepare(catalog)?;
    let request = EvaluationRequest {
        visa_type,
        mode,
        data: read_json(&data)?,
    };
    let envelope = orchestrator.evaluate(&request);
    print_json(&envelope, pretty)
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        pretty,
        catalog,
    } = args;

    let orchestrator = prepare(catalog)?;
    let requests: Vec<EvaluationRequest> = read_json(&input)?;
    let report = orchestrator.evaluate_batch(requests);
    print_json(&report, pretty)
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let orchestrator = prepare(args.catalog)?;
    let summaries = visa_summaries(&orchestrator);

    println!("Supported visa types ({})", summaries.len());
    for visa in &summaries {
        let modes: Vec<&str> = visa.supported_modes.iter().map(|mode| mode.label()).collect();
        println!(
            "- {} {} [{}] modes: {} | complexity {} | {}-{} days",
            visa.code,
            visa.name,
            visa.category,
            modes.join(", "),
            visa.complexity.label(),
            visa.processing_days.min,
            visa.processing_days.max
        );
    }
    Ok(())
}

/// Loads config, routes logs to stderr so stdout stays parseable, and builds the engine.
fn prepare(catalog: Option<PathBuf>) -> Result<std::sync::Arc<EvaluationOrchestrator>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_with_sink(&config.telemetry, LogSink::Stderr)?;
    build_orchestrator(&config.engine, catalog)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), AppError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
