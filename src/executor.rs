//! Drives test plans against a freshly provisioned tenant.
//!
//! Every execution follows the same sequence:
//!
//! 1. create the tenant and wait until its namespace is assigned,
//! 2. build the cases for that namespace and run each one (create the
//!    pipeline run, wait for its expected result),
//! 3. delete the tenant.
//!
//! Step 3 runs exactly once for every tenant that was created, whether the
//! run succeeded, failed, timed out or panicked.  A teardown error is logged
//! and never replaces the outcome of steps 1–2.  Pipeline runs are left for
//! the tenant deletion to collect.
//!
//! Dropping an execution future (e.g. under an outer `tokio::time::timeout`)
//! aborts its parallel case tasks and hands the tenant deletion to a
//! background task on the current runtime.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use kube::ResourceExt;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::cases;
use crate::client::ResourceClient;
use crate::condition::{PipelineRunCondition, TenantCondition};
use crate::crd::tenant::Tenant;
use crate::error::{Error, Result};
use crate::lifecycle;
use crate::plan::{TenantBuilder, TestCase, TestPlans};
use crate::waiter::{WaitConfig, Waiter};

/// How the expanded cases of a plan are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExecutionMode {
    /// One case after another, stopping at the first failure.
    #[default]
    Serial,
    /// One task per case; all tasks run to completion before the first
    /// failure (in case order) is returned.
    Parallel,
}

/// Outcome of one successful case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseReport {
    pub name: String,
    /// Server-assigned name of the pipeline run.
    pub pipeline_run: String,
    pub elapsed: Duration,
    pub polls: u32,
}

/// Outcome of a successful plan execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub tenant_namespace: String,
    pub cases: Vec<CaseReport>,
}

pub struct Executor {
    waiter: Waiter,
    client_namespace: String,
    tenant_builder: TenantBuilder,
    mode: ExecutionMode,
}

impl Executor {
    /// Tenants are created in `client_namespace` from [`cases::tenant_success`].
    pub fn new(
        client: Arc<dyn ResourceClient>,
        config: WaitConfig,
        client_namespace: impl Into<String>,
    ) -> Self {
        Self {
            waiter: Waiter::new(client, config),
            client_namespace: client_namespace.into(),
            tenant_builder: cases::tenant_success,
            mode: ExecutionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tenant_builder(mut self, builder: TenantBuilder) -> Self {
        self.tenant_builder = builder;
        self
    }

    fn client(&self) -> &dyn ResourceClient {
        self.waiter.client()
    }

    /// Run every case of `plans` in a fresh tenant.
    pub async fn execute(&self, plans: &TestPlans) -> Result<RunReport> {
        info!(
            plans = ?plans.base_names(),
            cases = plans.case_count(),
            mode = ?self.mode,
            "executing test plans"
        );
        self.with_tenant(|namespace| async move {
            let cases = plans.expand(&namespace);
            let reports = match self.mode {
                ExecutionMode::Serial => self.run_serial(cases).await?,
                ExecutionMode::Parallel => self.run_parallel(cases).await?,
            };
            Ok(RunReport {
                tenant_namespace: namespace,
                cases: reports,
            })
        })
        .await
    }

    /// Run a single unsuffixed case in a fresh tenant.
    pub async fn execute_single<F>(&self, builder: F) -> Result<CaseReport>
    where
        F: FnOnce(&str) -> TestCase,
    {
        self.with_tenant(|namespace| async move { run_case(&self.waiter, builder(&namespace)).await })
            .await
    }

    async fn run_serial(&self, cases: Vec<TestCase>) -> Result<Vec<CaseReport>> {
        let mut reports = Vec::with_capacity(cases.len());
        for case in cases {
            reports.push(run_case(&self.waiter, case).await?);
        }
        Ok(reports)
    }

    async fn run_parallel(&self, cases: Vec<TestCase>) -> Result<Vec<CaseReport>> {
        // Dropping the set aborts every case still polling.
        let mut tasks = JoinSet::new();
        let mut order = HashMap::with_capacity(cases.len());
        for (i, case) in cases.into_iter().enumerate() {
            let waiter = self.waiter.clone();
            let handle = tasks.spawn(async move { run_case(&waiter, case).await });
            order.insert(handle.id(), i);
        }

        let mut results: Vec<Option<Result<CaseReport>>> = (0..order.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(e) => (e.id(), Err(Error::from(e))),
            };
            if let Some(&i) = order.get(&id) {
                results[i] = Some(result);
            }
        }

        let mut reports = Vec::new();
        let mut first_failure = None;
        let mut failed = 0;
        for result in results.into_iter().flatten() {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    failed += 1;
                    warn!(error = %e, "test case failed");
                    first_failure.get_or_insert(e);
                }
            }
        }
        match first_failure {
            Some(e) => {
                error!(failed, succeeded = reports.len(), "parallel test cases failed");
                Err(e)
            }
            None => Ok(reports),
        }
    }

    /// Provision a tenant, hand its namespace to `body`, and tear the tenant
    /// down afterwards no matter how `body` (or the readiness wait) ended.
    async fn with_tenant<T, F, Fut>(&self, body: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let tenant_case = (self.tenant_builder)(&self.client_namespace);
        let tenant = lifecycle::create_tenant(self.client(), &tenant_case.tenant).await?;
        let guard = TeardownOnDrop::new(self.waiter.shared_client(), &tenant);

        let outcome = AssertUnwindSafe(async {
            let ready = TenantCondition::new(&tenant, tenant_case.check, &tenant_case.name);
            self.waiter.wait_for(&ready).await?;
            let namespace = lifecycle::tenant_namespace(self.client(), &tenant).await?;
            info!(tenant = %tenant.name_any(), %namespace, "tenant ready");
            body(namespace).await
        })
        .catch_unwind()
        .await;

        if let Err(e) = lifecycle::delete_tenant(self.client(), &tenant).await {
            warn!(tenant = %tenant.name_any(), error = %e, "tenant teardown failed");
        }
        guard.disarm();

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Deletes the tenant from a background task if the execution is dropped
/// before its own teardown ran.
struct TeardownOnDrop {
    client: Option<Arc<dyn ResourceClient>>,
    tenant: Tenant,
}

impl TeardownOnDrop {
    fn new(client: Arc<dyn ResourceClient>, tenant: &Tenant) -> Self {
        Self {
            client: Some(client),
            tenant: tenant.clone(),
        }
    }

    fn disarm(mut self) {
        self.client = None;
    }
}

impl Drop for TeardownOnDrop {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        let name = self.tenant.name_any();
        let Ok(handle) = Handle::try_current() else {
            error!(tenant = %name, "execution cancelled outside a runtime, tenant left behind");
            return;
        };
        warn!(tenant = %name, "execution cancelled, deleting tenant in the background");
        let tenant = self.tenant.clone();
        handle.spawn(async move {
            if let Err(e) = lifecycle::delete_tenant(client.as_ref(), &tenant).await {
                warn!(tenant = %name, error = %e, "tenant teardown failed");
            }
        });
    }
}

/// Submit the case's pipeline run and wait for its expected result.
async fn run_case(waiter: &Waiter, case: TestCase) -> Result<CaseReport> {
    let run = lifecycle::create_pipeline_run(waiter.client(), &case.pipeline_run).await?;
    let condition = PipelineRunCondition::new(&run, case.check, &case.name);
    let outcome = waiter.observe(&condition).await;
    let report = CaseReport {
        name: case.name,
        pipeline_run: run.name_any(),
        elapsed: outcome.elapsed,
        polls: outcome.polls,
    };
    outcome.into_result()?;
    info!(case = %report.name, run = %report.pipeline_run, elapsed = ?report.elapsed, "test case passed");
    Ok(report)
}
