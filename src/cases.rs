//! The stock pipeline run cases and the tenant they run in.
//!
//! All cases run Jenkinsfiles from the public demo-pipelines repository.

use crate::builder::{tenant, PipelineRunBuilder};
use crate::condition::{PipelineRunCheck, TenantCheck};
use crate::crd::pipeline_run::RunResult;
use crate::error::Result;
use crate::plan::{TenantCase, TestCase, TestPlan, TestPlans};

pub const DEMO_PIPELINES_REPO: &str = "https://github.com/sap-production/demo-pipelines";
pub const DEMO_PIPELINES_REVISION: &str = "master";

pub const SLEEP_JENKINSFILE: &str = "sleep/Jenkinsfile";
pub const ERROR_JENKINSFILE: &str = "error/Jenkinsfile";
pub const SUCCESS_JENKINSFILE: &str = "success/Jenkinsfile";

/// Sleeps for a second and succeeds.
pub fn pipeline_run_sleep(namespace: &str) -> TestCase {
    TestCase {
        name: "sleep".into(),
        pipeline_run: PipelineRunBuilder::new(namespace)
            .jenkins_file(DEMO_PIPELINES_REPO, DEMO_PIPELINES_REVISION, SLEEP_JENKINSFILE)
            .arg("SLEEP_FOR_SECONDS", "1")
            .build(),
        check: PipelineRunCheck::HasStateResult(RunResult::Success),
    }
}

/// Fails inside the pipeline, which must be classified as a content error.
pub fn pipeline_run_fail(namespace: &str) -> TestCase {
    TestCase {
        name: "error".into(),
        pipeline_run: PipelineRunBuilder::new(namespace)
            .jenkins_file(DEMO_PIPELINES_REPO, DEMO_PIPELINES_REVISION, ERROR_JENKINSFILE)
            .build(),
        check: PipelineRunCheck::HasStateResult(RunResult::ErrorContent),
    }
}

pub fn pipeline_run_ok(namespace: &str) -> TestCase {
    TestCase {
        name: "ok".into(),
        pipeline_run: PipelineRunBuilder::new(namespace)
            .jenkins_file(DEMO_PIPELINES_REPO, DEMO_PIPELINES_REVISION, SUCCESS_JENKINSFILE)
            .build(),
        check: PipelineRunCheck::HasStateResult(RunResult::Success),
    }
}

/// A tenant in `namespace` that is usable once its namespace is assigned.
pub fn tenant_success(namespace: &str) -> TenantCase {
    TenantCase {
        name: "tenant_success".into(),
        tenant: tenant(namespace, "e2e-tenant", "E2E Tenant"),
        check: TenantCheck::NamespaceAssigned,
    }
}

/// One sleep run, two failing runs and three successful runs.
pub fn default_plans() -> Result<TestPlans> {
    TestPlans::new(vec![
        TestPlan::new(pipeline_run_sleep, 1),
        TestPlan::new(pipeline_run_fail, 2),
        TestPlan::new(pipeline_run_ok, 3),
    ])
}
