//! Create / fetch / delete glue between the executor and the client.
//!
//! Creation errors come back as [`Error::Setup`], deletion errors as
//! [`Error::Teardown`], so the executor can apply the right policy without
//! inspecting client-specific errors.

use kube::ResourceExt;
use tracing::info;

use crate::client::ResourceClient;
use crate::crd::pipeline_run::PipelineRun;
use crate::crd::tenant::Tenant;
use crate::error::{Error, Result};

pub async fn create_tenant(client: &dyn ResourceClient, tenant: &Tenant) -> Result<Tenant> {
    let created = client
        .create_tenant(tenant)
        .await
        .map_err(|e| Error::setup("tenant", e))?;
    info!(tenant = %created.name_any(), ns = ?created.namespace(), "created tenant");
    Ok(created)
}

/// Re-fetch a previously created tenant.
pub async fn get_tenant(client: &dyn ResourceClient, tenant: &Tenant) -> Result<Tenant> {
    client
        .get_tenant(&tenant.namespace().unwrap_or_default(), &tenant.name_any())
        .await
}

pub async fn delete_tenant(client: &dyn ResourceClient, tenant: &Tenant) -> Result<()> {
    let name = tenant.name_any();
    client
        .delete_tenant(&tenant.namespace().unwrap_or_default(), &name)
        .await
        .map_err(|e| Error::teardown(format!("tenant {name}"), e))?;
    info!(tenant = %name, "deleted tenant");
    Ok(())
}

/// Fetch the tenant and return the namespace its controller assigned.
pub async fn tenant_namespace(client: &dyn ResourceClient, tenant: &Tenant) -> Result<String> {
    let name = tenant.name_any();
    let fetched = get_tenant(client, tenant)
        .await
        .map_err(|e| Error::setup(format!("tenant {name}"), e))?;
    fetched.namespace_name().map(str::to_string).ok_or_else(|| {
        Error::setup(
            format!("tenant {name}"),
            Error::NotFound("tenant namespace name".into()),
        )
    })
}

pub async fn create_pipeline_run(
    client: &dyn ResourceClient,
    run: &PipelineRun,
) -> Result<PipelineRun> {
    let created = client
        .create_pipeline_run(run)
        .await
        .map_err(|e| Error::setup("pipeline run", e))?;
    info!(run = %created.name_any(), ns = ?created.namespace(), "created pipeline run");
    Ok(created)
}

pub async fn get_pipeline_run(client: &dyn ResourceClient, run: &PipelineRun) -> Result<PipelineRun> {
    client
        .get_pipeline_run(&run.namespace().unwrap_or_default(), &run.name_any())
        .await
}

pub async fn delete_pipeline_run(client: &dyn ResourceClient, run: &PipelineRun) -> Result<()> {
    let name = run.name_any();
    client
        .delete_pipeline_run(&run.namespace().unwrap_or_default(), &name)
        .await
        .map_err(|e| Error::teardown(format!("pipeline run {name}"), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{tenant, PipelineRunBuilder};
    use crate::error::ErrorKind;
    use crate::fake::FakeClient;

    #[tokio::test]
    async fn rejected_creation_is_a_setup_failure() {
        let client = FakeClient::new().fail_tenant_create();
        let err = create_tenant(&client, &tenant("client", "t", "T"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SetupFailure);
    }

    #[tokio::test]
    async fn rejected_deletion_is_a_teardown_failure() {
        let client = FakeClient::new().fail_tenant_delete();
        let t = create_tenant(&client, &tenant("client", "t", "T")).await.unwrap();
        let err = delete_tenant(&client, &t).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TeardownFailure);
    }

    #[tokio::test]
    async fn namespace_is_resolved_once_assigned() {
        let client = FakeClient::new().tenant_ready_after(1);
        let t = create_tenant(&client, &tenant("client", "t", "T")).await.unwrap();

        let err = tenant_namespace(&client, &t).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SetupFailure);

        let ns = tenant_namespace(&client, &t).await.unwrap();
        assert_eq!(ns, format!("tn-{}", t.name_any()));
    }

    #[tokio::test]
    async fn pipeline_run_round_trip_through_the_client() {
        let client = FakeClient::new();
        let run = create_pipeline_run(&client, &PipelineRunBuilder::new("tn").build())
            .await
            .unwrap();
        assert!(run.name_any().starts_with("e2e-"));
        get_pipeline_run(&client, &run).await.unwrap();
        delete_pipeline_run(&client, &run).await.unwrap();
        assert!(get_pipeline_run(&client, &run).await.is_err());
        assert_eq!(client.calls().run_deletes, 1);
    }
}
