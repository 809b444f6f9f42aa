use clap::{Parser, ValueEnum};
use research_summary_core::config::Settings;
use research_summary_core::pipeline::{self, GenerateOptions};
use research_summary_core::report::error::StockDirNotFound;
use research_summary_core::report::locator::FsReportSource;
use research_summary_core::summary::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "generate_summary",
    about = "Build a comparison summary of a stock's research reports"
)]
struct Args {
    /// Stock code, e.g. 2330 or AAPL.
    stock_code: String,

    /// Root directory holding one sub-directory per stock. Defaults to $STOCKS_DIR or `stocks`.
    #[arg(long)]
    stocks_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Markdown)]
    format: Format,

    /// Output file name inside the stock directory. Defaults to summary.md / summary.json;
    /// $SUMMARY_FILE_NAME overrides the markdown name only.
    #[arg(long)]
    output: Option<String>,

    /// Maximum key viewpoints per report. Defaults to $SUMMARY_MAX_KEY_POINTS or 5.
    #[arg(long)]
    max_key_points: Option<usize>,

    /// Print the summary instead of writing it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Markdown => OutputFormat::Markdown,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(err) => {
            eprintln!("failed to load settings: {err:#}");
            return std::process::ExitCode::FAILURE;
        }
    };
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match run(&settings, args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            if let Some(missing) = err.downcast_ref::<StockDirNotFound>() {
                tracing::error!(
                    stock_code = %missing.stock_code,
                    path = %missing.path.display(),
                    "stock directory not found"
                );
            } else {
                let detail = format!("{err:#}");
                tracing::error!(error = %detail, "summary generation failed");
            }
            eprintln!("error: {err:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings, args: Args) -> anyhow::Result<()> {
    let source = match args.stocks_dir {
        Some(dir) => FsReportSource::new(dir),
        None => FsReportSource::from_settings(settings),
    };

    tracing::debug!(stocks_dir = %source.stocks_dir().display(), "reading research reports");

    let format = OutputFormat::from(args.format);
    let opts = GenerateOptions {
        format,
        file_name: output_file_name(settings, format, args.output),
        max_key_points: args
            .max_key_points
            .unwrap_or_else(|| settings.max_key_points()),
    };

    let generated = pipeline::generate(&source, &args.stock_code, &opts)?;

    if args.dry_run {
        tracing::info!(
            stock_code = %args.stock_code,
            dry_run = true,
            reports = generated.summary.report_count,
            path = %generated.output_path.display(),
            "summary generated (dry-run)"
        );
        print!("{}", generated.content);
        return Ok(());
    }

    pipeline::write_summary(&generated)?;
    println!("summary written: {}", generated.output_path.display());
    Ok(())
}

/// `--output` always wins; `SUMMARY_FILE_NAME` names markdown output only, so JSON
/// never lands in a `.md` file.
fn output_file_name(
    settings: &Settings,
    format: OutputFormat,
    cli: Option<String>,
) -> Option<String> {
    cli.or_else(|| match format {
        OutputFormat::Markdown => settings.summary_file_name.clone(),
        OutputFormat::Json => None,
    })
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
