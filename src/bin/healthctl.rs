//! healthctl - one-shot health snapshots and component tests
//!
//! Exit codes: 0 OK, 1 internal error, 2 validation error, 3 timeout.

use anyhow::Context;
use clap::{Parser, Subcommand};
use platform_health::config::Config;
use platform_health::monitoring::diagnostics::{TestRequest, TestType};
use platform_health::monitoring::{ExportFormat, HealthPayload, HealthQuery, MonitoringSystem};
use platform_health::utils::logging::init_cli_logging;
use platform_health::{EngineError, ResponseCode, SnapshotMode};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "healthctl", version, about = "Query platform health from the command line")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "HEALTH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Take a health snapshot
    Snapshot {
        /// quick or full
        #[arg(short, long, default_value = "quick")]
        mode: SnapshotMode,
        /// Ignore the snapshot cache
        #[arg(short, long)]
        force: bool,
        /// Emit an export (json or csv) instead of the API structure
        #[arg(long)]
        format: Option<ExportFormat>,
    },
    /// Run one diagnostic test against one component
    Test {
        /// connection, cache, assets, queries or schemas
        #[arg(long)]
        component: String,
        /// connectivity, performance, data_integrity or custom
        #[arg(long = "type")]
        test_type: TestType,
        /// Query for custom tests
        #[arg(long)]
        query: Option<String>,
    },
    /// Validate the configuration and print the effective values
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            match err.downcast_ref::<EngineError>() {
                Some(engine) => exit_code(engine.code()),
                None => exit_code(ResponseCode::InternalError),
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ResponseCode> {
    let config = Config::load(cli.config.as_deref()).await?;

    if let Command::CheckConfig = cli.command {
        println!("{}", config.to_yaml()?);
        eprintln!("configuration OK");
        return Ok(ResponseCode::Ok);
    }

    init_cli_logging(&config.engine.logging)?;
    let system = MonitoringSystem::from_config(&config.engine)?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Snapshot { mode, force, format } => {
            let query = HealthQuery {
                mode,
                force,
                format,
            };
            let outcome = system.health(query).await?;
            match outcome.data {
                HealthPayload::Snapshot(snapshot) => {
                    serde_json::to_writer_pretty(&mut stdout, snapshot.as_ref())?;
                    writeln!(stdout)?;
                }
                HealthPayload::Export(report) => {
                    stdout
                        .write_all(&report.body)
                        .context("failed to write export")?;
                }
            }
            Ok(outcome.code)
        }
        Command::Test {
            component,
            test_type,
            query,
        } => {
            let request = TestRequest {
                component_name: component,
                test_type,
                custom_query: query,
            };
            let outcome = system.test(request).await?;
            serde_json::to_writer_pretty(&mut stdout, &outcome.data)?;
            writeln!(stdout)?;

            if outcome.code == ResponseCode::Ok && !outcome.data.success {
                // a failed test is a result, not an engine error
                eprintln!("test failed: {}", outcome.data.message);
            }
            Ok(outcome.code)
        }
        Command::CheckConfig => Ok(ResponseCode::Ok),
    }
}

fn exit_code(code: ResponseCode) -> ExitCode {
    match code {
        ResponseCode::Ok => ExitCode::SUCCESS,
        ResponseCode::ValidationError => ExitCode::from(2),
        ResponseCode::Timeout => ExitCode::from(3),
        ResponseCode::InternalError => ExitCode::FAILURE,
    }
}
