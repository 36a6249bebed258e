//! pipelinerun-e2e — runs the stock end-to-end checks against a live cluster.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use pipelinerun_e2e::cases;
use pipelinerun_e2e::client::KubeResourceClient;
use pipelinerun_e2e::executor::{ExecutionMode, Executor};
use pipelinerun_e2e::waiter::WaitConfig;

#[derive(Parser, Debug)]
#[command(
    name = "pipelinerun-e2e",
    about = "End-to-end checks for Steward tenants and pipeline runs"
)]
struct Args {
    /// Client namespace in which the test tenant is created.
    #[arg(long, env = "E2E_CLIENT_NAMESPACE")]
    client_namespace: String,

    /// Delay between two checks of a condition, in milliseconds.
    #[arg(long, default_value = "1000", env = "E2E_POLL_INTERVAL_MS")]
    poll_interval_ms: u64,

    /// Time budget of a single wait, in seconds.
    #[arg(long, default_value = "120", env = "E2E_WAIT_TIMEOUT_SECS")]
    wait_timeout_secs: u64,

    /// Whether the cases of a plan run one after another or concurrently.
    #[arg(long, value_enum, default_value = "serial", env = "E2E_MODE")]
    mode: ExecutionMode,

    /// Log format: "text" for human-readable, "json" for structured.
    #[arg(long, default_value = "text", env = "LOG_FORMAT")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the default plan: one sleep run, two failing runs, three successful runs.
    Plan,
    /// Run a single successful pipeline run.
    Smoke,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,kube=warn,hyper=warn,tower=warn".into());

    if args.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = WaitConfig::new(
        Duration::from_millis(args.poll_interval_ms),
        Duration::from_secs(args.wait_timeout_secs),
    )?;
    let client = KubeResourceClient::try_default().await?;

    info!(
        ns = %args.client_namespace,
        mode = ?args.mode,
        interval = ?config.poll_interval(),
        deadline = ?config.deadline(),
        "starting pipelinerun-e2e"
    );

    let executor =
        Executor::new(Arc::new(client), config, args.client_namespace).with_mode(args.mode);

    match args.command {
        Command::Plan => {
            let report = executor.execute(&cases::default_plans()?).await?;
            for case in &report.cases {
                info!(case = %case.name, run = %case.pipeline_run, elapsed = ?case.elapsed, "passed");
            }
            info!(
                ns = %report.tenant_namespace,
                cases = report.cases.len(),
                "all test cases passed"
            );
        }
        Command::Smoke => {
            let case = executor.execute_single(cases::pipeline_run_ok).await?;
            info!(case = %case.name, run = %case.pipeline_run, elapsed = ?case.elapsed, "smoke test passed");
        }
    }

    Ok(())
}
