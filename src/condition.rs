//! Conditions polled by the [`Waiter`](crate::waiter::Waiter).
//!
//! A [`Condition`] is a named, stateless observation of the cluster.  The
//! outcome of a single `check` is three-way:
//!
//! - `Ok(true)`: satisfied, stop waiting.
//! - `Ok(false)`: not yet, poll again.
//! - `Err(_)`: definitive failure, stop waiting even if time remains.
//!
//! The resource-specific logic lives in the pure [`PipelineRunCheck`] and
//! [`TenantCheck`] enums, which are bound to a created resource by
//! [`PipelineRunCondition`] and [`TenantCondition`].

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition as StatusCondition;
use kube::ResourceExt;

use crate::client::ResourceClient;
use crate::crd::pipeline_run::{PipelineRun, RunResult};
use crate::crd::tenant::Tenant;
use crate::error::{Error, Result};

/// Reason a tenant controller reports on a `Ready=False` condition it will not recover from.
pub const TENANT_FAILED_REASON: &str = "Failed";

/// A named predicate evaluated against the cluster.
///
/// Implementations must only observe: `check` may be called any number of
/// times, from several waiters at once.
#[async_trait]
pub trait Condition: Send + Sync {
    /// Stable identifier used for the wait span and log lines.
    fn name(&self) -> &str;

    async fn check(&self, client: &dyn ResourceClient) -> Result<bool>;
}

// ── Pure checks ─────────────────────────────────────────────────────────────

/// Expectation on an observed PipelineRun.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineRunCheck {
    /// Satisfied when the run finishes with exactly this result; any other
    /// result is a definitive failure.
    HasStateResult(RunResult),
}

impl PipelineRunCheck {
    pub fn evaluate(&self, run: &PipelineRun) -> Result<bool> {
        match *self {
            Self::HasStateResult(expected) => {
                let actual = run.result();
                if !actual.is_defined() {
                    if run.state().is_terminal() {
                        return Err(Error::definitive(format!(
                            "pipeline run {} finished without a result",
                            run.name_any()
                        )));
                    }
                    return Ok(false);
                }
                if actual == expected {
                    return Ok(true);
                }
                Err(Error::UnexpectedResult {
                    expected,
                    actual,
                    message: run.message().unwrap_or_default().to_string(),
                })
            }
        }
    }
}

/// Expectation on an observed Tenant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TenantCheck {
    /// Satisfied once the controller has assigned a tenant namespace.
    NamespaceAssigned,
    /// Satisfied once the `Ready` condition is `True`.
    Ready,
}

impl TenantCheck {
    pub fn evaluate(&self, tenant: &Tenant) -> Result<bool> {
        match self {
            Self::NamespaceAssigned => Ok(tenant.namespace_name().is_some()),
            Self::Ready => match tenant.ready_condition() {
                Some(c) if c.status == "True" => Ok(true),
                Some(c) if c.status == "False" && c.reason == TENANT_FAILED_REASON => {
                    Err(Error::definitive(describe_failed(tenant, c)))
                }
                _ => Ok(false),
            },
        }
    }
}

fn describe_failed(tenant: &Tenant, c: &StatusCondition) -> String {
    format!(
        "tenant {} is not ready: {} ({})",
        tenant.name_any(),
        c.reason,
        c.message
    )
}

// ── Resource-bound conditions ───────────────────────────────────────────────

/// Waits for a created PipelineRun to satisfy a [`PipelineRunCheck`].
#[derive(Clone, Debug)]
pub struct PipelineRunCondition {
    name: String,
    namespace: String,
    resource_name: String,
    check: PipelineRunCheck,
}

impl PipelineRunCondition {
    /// `run` must be the object returned by the create call so that the
    /// server-assigned name is known.
    pub fn new(run: &PipelineRun, check: PipelineRunCheck, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: run.namespace().unwrap_or_default(),
            resource_name: run.name_any(),
            check,
        }
    }
}

#[async_trait]
impl Condition for PipelineRunCondition {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, client: &dyn ResourceClient) -> Result<bool> {
        let run = client
            .get_pipeline_run(&self.namespace, &self.resource_name)
            .await?;
        self.check.evaluate(&run)
    }
}

/// Waits for a created Tenant to satisfy a [`TenantCheck`].
#[derive(Clone, Debug)]
pub struct TenantCondition {
    name: String,
    namespace: String,
    resource_name: String,
    check: TenantCheck,
}

impl TenantCondition {
    pub fn new(tenant: &Tenant, check: TenantCheck, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: tenant.namespace().unwrap_or_default(),
            resource_name: tenant.name_any(),
            check,
        }
    }
}

#[async_trait]
impl Condition for TenantCondition {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, client: &dyn ResourceClient) -> Result<bool> {
        let tenant = client.get_tenant(&self.namespace, &self.resource_name).await?;
        self.check.evaluate(&tenant)
    }
}
