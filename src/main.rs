use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use aqi_widget::config::AirQualityConfig;
use aqi_widget::source::SimulatedSource;
use aqi_widget::telemetry::init_logging;
use aqi_widget::{
    AirQualityError, AqiWidget, Categorizer, DisplayFrame, DisplaySink, OutOfRangePolicy,
    Severity, StatusLine, TerminalDisplay,
};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(
    name = "aqi-widget",
    version,
    about = "Air quality index lookup with health advice (simulated data)"
)]
struct Cli {
    /// Configuration file (defaults to ./aqi-widget.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Seed for reproducible simulated lookups
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up the AQI for one location
    Check {
        #[arg(short, long)]
        location: String,
    },
    /// Read locations from stdin, one lookup per line
    Interactive,
    /// Show the category and advice for an AQI value without a lookup
    Categorize {
        #[arg(allow_negative_numbers = true)]
        aqi: i32,
        /// Override the configured out-of-range policy
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Print the presentation as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    ThresholdScan,
    Unexpected,
}

impl From<PolicyArg> for OutOfRangePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::ThresholdScan => OutOfRangePolicy::ThresholdScan,
            PolicyArg::Unexpected => OutOfRangePolicy::Unexpected,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AirQualityConfig::load_from_path(cli.config)?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    init_logging(&config.logging)?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Check { location } => {
            let widget = build_widget(&config);
            let code = match widget.submit(&location).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
            Ok(code)
        }
        Command::Interactive => interactive(&config).await,
        Command::Categorize { aqi, policy, json } => {
            let policy = policy.map_or(config.categories.policy, Into::into);
            categorize(aqi, policy, json)
        }
    }
}

fn build_widget(
    config: &AirQualityConfig,
) -> AqiWidget<SimulatedSource, TerminalDisplay<std::io::Stdout>> {
    AqiWidget::new(
        SimulatedSource::from_config(config.simulation.clone()),
        Categorizer::standard(config.categories.policy),
        TerminalDisplay::stdout(),
    )
}

async fn interactive(config: &AirQualityConfig) -> Result<ExitCode> {
    let widget = build_widget(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout
            .write_all(b"Location ('quit' to exit): ")
            .await
            .context("Failed to write prompt")?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        match widget.submit(&line).await {
            Err(e @ AirQualityError::Io { .. }) => {
                return Err(e).context("Failed to write to the display");
            }
            // Everything else is already on the display
            Ok(_) | Err(_) => {}
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn categorize(aqi: i32, policy: OutOfRangePolicy, json: bool) -> Result<ExitCode> {
    let presentation = Categorizer::standard(policy).categorize(aqi);

    if json {
        println!("{}", serde_json::to_string_pretty(&presentation)?);
        return Ok(ExitCode::SUCCESS);
    }

    let message = match presentation.category {
        Some(category) => format!("AQI {aqi}: {category}"),
        None => format!("AQI {aqi}: unknown"),
    };
    let frame = DisplayFrame::reading(
        StatusLine {
            message,
            severity: Severity::Success,
        },
        aqi,
        &presentation,
    );
    TerminalDisplay::stdout().render(&frame)?;
    Ok(ExitCode::SUCCESS)
}
