use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use sysreview_screener::errors::{ScreeningError, ScreeningResult};
use sysreview_screener::models::config::ScreenerConfig;
use sysreview_screener::parser::load_records;
use sysreview_screener::processing::{LogProgress, ScoringPipeline, validate_theme};
use sysreview_screener::repository::{
    CredentialStore, CsvRecordWriter, FileCredentialStore, FileTextSource, FileThemeSource,
    RecordWriter, ThemeSource,
};
use sysreview_screener::scoring::openai::OpenAiBackend;

/// Screen tagged bibliographic exports for a systematic review.
#[derive(Parser)]
#[command(name = "sysreview-screener", version, long_about = None)]
struct Cli {
    /// YAML config file (defaults to ./screener.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an export into CSV without scoring.
    Parse {
        input: PathBuf,

        #[arg(short, long, default_value = "data/parsed_articles.csv")]
        output: PathBuf,
    },

    /// Parse an export and score every record against a theme.
    Score(ScoreArgs),

    /// Manage the stored API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Args)]
struct ScoreArgs {
    input: PathBuf,

    /// Research theme text.
    #[arg(long, conflicts_with = "theme_file", required_unless_present = "theme_file")]
    theme: Option<String>,

    /// File holding the research theme.
    #[arg(long)]
    theme_file: Option<PathBuf>,

    #[arg(short, long, default_value = "data/parsed_articles_scored.csv")]
    output: PathBuf,

    /// Score one record at a time, in order.
    #[arg(long)]
    sequential: bool,

    /// Maximum in-flight backend calls.
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum KeyAction {
    Set { key: String },
    Delete,
}

fn credential_store(config: &ScreenerConfig) -> FileCredentialStore {
    match &config.key_file {
        Some(path) => FileCredentialStore::new(path),
        None => FileCredentialStore::beside_executable(),
    }
}

fn run_parse(input: &Path, output: &Path) -> ScreeningResult<()> {
    let parsed = load_records(&FileTextSource::new(input))?;
    CsvRecordWriter::new(output).write_rows(&parsed.records)
}

async fn run_score(args: ScoreArgs, mut config: ScreenerConfig) -> ScreeningResult<()> {
    if args.sequential {
        config.sequential = true;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    let theme = match (&args.theme, &args.theme_file) {
        (Some(theme), _) => theme.get_theme_text()?,
        (None, Some(path)) => FileThemeSource::new(path).get_theme_text()?,
        (None, None) => String::new(),
    };
    validate_theme(&theme)?;

    let api_key = credential_store(&config).load_api_key().ok_or_else(|| {
        ScreeningError::Credentials(
            "no API key found; set OPENAI_API_KEY or run `sysreview-screener key set`".to_string(),
        )
    })?;

    let mut records = load_records(&FileTextSource::new(&args.input))?.records;

    let backend = OpenAiBackend::new(config.openai_settings(api_key)?)
        .map_err(|e| ScreeningError::Config(e.to_string()))?;
    let pipeline = ScoringPipeline::new(backend, config.pipeline_options());

    let cancel = pipeline.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Cancel requested, finishing in-flight requests");
            cancel.cancel();
        }
    });

    let report = pipeline
        .score_all(&mut records, &theme, &LogProgress::new())
        .await?;

    CsvRecordWriter::new(&args.output).write_rows(&records)?;

    let summary = report.summary;
    log::info!(
        "Scored {} of {} records ({} failed, {} skipped)",
        summary.succeeded,
        summary.total,
        summary.failed,
        summary.skipped
    );
    Ok(())
}

fn run_key(action: KeyAction, config: &ScreenerConfig) -> ScreeningResult<()> {
    let store = credential_store(config);
    match action {
        KeyAction::Set { key } => {
            store.save_api_key(&key)?;
            log::info!("API key saved to {}", store.key_path().display());
        }
        KeyAction::Delete => {
            store.delete_api_key()?;
            log::info!("API key removed from {}", store.key_path().display());
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> ScreeningResult<()> {
    let config = ScreenerConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Parse { input, output } => run_parse(&input, &output),
        Command::Score(args) => run_score(args, config).await,
        Command::Key { action } => run_key(action, &config),
    }
}

/// Logs a failed run and maps it to the process exit status.
fn report_failure(e: &ScreeningError) -> i32 {
    match e {
        ScreeningError::NoRecordsFound => log::warn!("No records found in the export"),
        other => log::error!("{other}"),
    }
    1
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        std::process::exit(report_failure(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::report_failure;
    use sysreview_screener::errors::ScreeningError;

    #[test]
    fn every_failure_exits_with_status_one() {
        assert_eq!(report_failure(&ScreeningError::NoRecordsFound), 1);
        assert_eq!(
            report_failure(&ScreeningError::ValidationFailure("blank".to_string())),
            1
        );
        assert_eq!(
            report_failure(&ScreeningError::Credentials("missing".to_string())),
            1
        );
    }
}
