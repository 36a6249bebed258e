//! The narrow client boundary the harness consumes.
//!
//! Everything the waiter, the conditions and the executor need from the
//! cluster goes through [`ResourceClient`], so tests can substitute
//! [`crate::fake::FakeClient`].

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use tracing::debug;

use crate::crd::pipeline_run::PipelineRun;
use crate::crd::tenant::Tenant;
use crate::error::Result;

/// Create / fetch / delete access to tenants and pipeline runs.
///
/// Implementations are shared read-only between every condition of a run and
/// must tolerate concurrent calls.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant>;

    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant>;

    async fn delete_tenant(&self, namespace: &str, name: &str) -> Result<()>;

    async fn create_pipeline_run(&self, run: &PipelineRun) -> Result<PipelineRun>;

    async fn get_pipeline_run(&self, namespace: &str, name: &str) -> Result<PipelineRun>;

    async fn delete_pipeline_run(&self, namespace: &str, name: &str) -> Result<()>;
}

/// Production implementation backed by a kube `Client`.
#[derive(Clone)]
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient kubeconfig / in-cluster environment.
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    fn tenants(&self, ns: &str) -> Api<Tenant> {
        Api::namespaced(self.client.clone(), ns)
    }

    fn pipeline_runs(&self, ns: &str) -> Api<PipelineRun> {
        Api::namespaced(self.client.clone(), ns)
    }
}

/// Namespace of a resource about to be created; an empty namespace would make
/// `Api::namespaced` target the wrong URL.
fn target_namespace<'a>(ns: Option<&'a str>, kind: &str) -> Result<&'a str> {
    ns.filter(|ns| !ns.is_empty())
        .ok_or_else(|| crate::error::Error::config(format!("{kind} has no namespace set")))
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant> {
        let ns = target_namespace(tenant.metadata.namespace.as_deref(), "tenant")?;
        let created = self.tenants(ns).create(&PostParams::default(), tenant).await?;
        debug!(%ns, name = ?created.metadata.name, "created tenant");
        Ok(created)
    }

    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant> {
        Ok(self.tenants(namespace).get(name).await?)
    }

    async fn delete_tenant(&self, namespace: &str, name: &str) -> Result<()> {
        self.tenants(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        debug!(%namespace, %name, "deleted tenant");
        Ok(())
    }

    async fn create_pipeline_run(&self, run: &PipelineRun) -> Result<PipelineRun> {
        let ns = target_namespace(run.metadata.namespace.as_deref(), "pipeline run")?;
        let created = self
            .pipeline_runs(ns)
            .create(&PostParams::default(), run)
            .await?;
        debug!(%ns, name = ?created.metadata.name, "created pipeline run");
        Ok(created)
    }

    async fn get_pipeline_run(&self, namespace: &str, name: &str) -> Result<PipelineRun> {
        Ok(self.pipeline_runs(namespace).get(name).await?)
    }

    async fn delete_pipeline_run(&self, namespace: &str, name: &str) -> Result<()> {
        self.pipeline_runs(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        debug!(%namespace, %name, "deleted pipeline run");
        Ok(())
    }
}
