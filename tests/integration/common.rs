//! Shared setup for the live-cluster tests.
//!
//! Each test provisions its own tenant through the executor, so tests can
//! run in parallel against the same client namespace.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pipelinerun_e2e::client::KubeResourceClient;
use pipelinerun_e2e::executor::Executor;
use pipelinerun_e2e::waiter::WaitConfig;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn,pipelinerun_e2e=info"))
        .with_test_writer()
        .try_init();
}

/// An executor for the client namespace named by `E2E_CLIENT_NAMESPACE`.
pub async fn executor() -> Executor {
    init_tracing();
    let ns = std::env::var("E2E_CLIENT_NAMESPACE")
        .expect("E2E_CLIENT_NAMESPACE must name an existing client namespace");
    let client = KubeResourceClient::try_default()
        .await
        .expect("failed to create kube client");
    Executor::new(Arc::new(client), WaitConfig::default(), ns)
}
