use chrono::Local;
use clap::{Parser, Subcommand};
use logcheck::fixtures::{fail_fixtures, pass_fixtures};
use logcheck::samples::{SAMPLE_TYPES, sample_message};
use logcheck::{Coordinator, HarnessConfig, HarnessError, Registry, ScenarioRunner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub type Result<T> = std::result::Result<T, Error>;
pub type Error = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(name = "logcheck")]
#[command(about = "Round-trip checks against a log-ingestion pipeline")]
struct CLIArgs {
    /// Host running the pipeline's producer and result ports
    /// [default: $TEST_OUTPUT_HOST or localhost]
    #[arg(long)]
    host: Option<String>,

    /// YAML message type table to use instead of the built-in one
    #[arg(long)]
    registry: Option<PathBuf>,

    /// How long to wait for each normalized event
    /// [default: $LOGCHECK_TIMEOUT_MS or 10000]
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Largest result read accepted from the pipeline [default: 8192]
    #[arg(long)]
    max_bytes: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fixture catalog and report each scenario
    Run {
        /// Only run fixtures whose id contains this string
        #[arg(long)]
        filter: Option<String>,
    },
    /// Send "now"-stamped sample messages without waiting for results
    Emit {
        /// Message types to send, or "all"
        #[arg(required = true)]
        types: Vec<String>,
    },
    /// Send one raw message and print the decoded event
    Check { message_type: String, payload: String },
}

async fn run(coordinator: Arc<Coordinator>, filter: Option<String>) -> Result<bool> {
    let selected = |id: &str| filter.as_deref().map_or(true, |f| id.contains(f));
    let pass: Vec<_> = pass_fixtures().into_iter().filter(|f| selected(&f.id)).collect();
    let fail: Vec<_> = fail_fixtures()
        .into_iter()
        .filter(|f| selected(&f.fixture.id))
        .collect();
    info!("Running {} passing and {} failing fixtures", pass.len(), fail.len());

    let reports = ScenarioRunner::new(coordinator).run_all(pass, fail).await;
    for report in &reports {
        match &report.outcome {
            Ok(()) => println!("PASS {}", report.id),
            Err(e) => println!("FAIL {}\n{e}\n", report.id),
        }
    }
    let failed = reports.iter().filter(|report| !report.passed()).count();
    println!("{} passed, {failed} failed", reports.len() - failed);
    Ok(failed == 0)
}

async fn emit(coordinator: &Coordinator, types: Vec<String>) -> Result<()> {
    let types: Vec<String> = if types.iter().any(|t| t == "all") {
        SAMPLE_TYPES.iter().map(|t| t.to_string()).collect()
    } else {
        types
    };

    let sender = coordinator.sender();
    for message_type in types {
        let info = coordinator.registry().lookup(&message_type)?;
        let message = sample_message(&message_type, Local::now()).ok_or_else(|| {
            HarnessError::Config(format!("No sample message for {message_type}"))
        })?;
        println!("Sending message type: {message_type}");
        sender
            .send(info.destination_port, info.transport, &message)
            .await?;
    }
    Ok(())
}

/// Command line options win over whatever the environment configured.
fn apply_overrides(args: &CLIArgs, mut config: HarnessConfig) -> HarnessConfig {
    if let Some(host) = &args.host {
        config = config.with_host(host.clone());
    }
    if let Some(millis) = args.timeout_ms {
        config = config.with_receive_timeout(Duration::from_millis(millis));
    }
    if let Some(max_bytes) = args.max_bytes {
        config = config.with_max_bytes(max_bytes);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = CLIArgs::parse();

    let registry = match &args.registry {
        Some(path) => Registry::from_yaml_file(path)?,
        None => Registry::builtin().clone(),
    };
    let config = apply_overrides(&args, HarnessConfig::from_env()?);
    let coordinator = Arc::new(Coordinator::new(registry, config).await?);

    match args.command {
        Commands::Run { filter } => {
            if !run(coordinator, filter).await? {
                std::process::exit(1);
            }
        }
        Commands::Emit { types } => emit(&coordinator, types).await?,
        Commands::Check {
            message_type,
            payload,
        } => {
            let result = coordinator.round_trip(&message_type, &payload).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
