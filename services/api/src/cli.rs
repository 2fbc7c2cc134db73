use crate::commands::{run_batch, run_catalog, run_evaluate, BatchArgs, CatalogArgs, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use visa_eval::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Visa Evaluation Engine",
    about = "Score visa applications and plan their follow-up workflow from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one application read from a JSON file
    Evaluate(EvaluateArgs),
    /// Evaluate a JSON array of applications, one result per entry
    Batch(BatchArgs),
    /// List the visa types in the active catalog
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// YAML catalog to load instead of VISA_CATALOG_PATH or the built-in catalog
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Batch(args) => run_batch(args),
        Command::Catalog(args) => run_catalog(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["visa-eval-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_evaluate_flags() {
        let cli = Cli::try_parse_from([
            "visa-eval-api",
            "evaluate",
            "--visa-type",
            "E-7",
            "--mode",
            "new",
            "--data",
            "applicant.json",
            "--pretty",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.visa_type, "E-7");
                assert_eq!(args.mode, "new");
                assert_eq!(args.data, PathBuf::from("applicant.json"));
                assert!(args.pretty);
            }
            other => panic!("expected evaluate, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_requires_a_visa_type() {
        let parsed = Cli::try_parse_from(["visa-eval-api", "evaluate", "--mode", "new", "--data", "a.json"]);
        assert!(parsed.is_err());
    }
}
