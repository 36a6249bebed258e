use super::common::*;
use pipelinerun_e2e::cases;
use pipelinerun_e2e::executor::ExecutionMode;

/// One sleep run, two failing runs and three successful runs in one tenant.
#[tokio::test]
#[ignore = "needs a cluster running Steward"]
async fn pipeline_runs() {
    let report = executor()
        .await
        .execute(&cases::default_plans().unwrap())
        .await
        .expect("plan failed");
    assert_eq!(report.cases.len(), 6);
}

#[tokio::test]
#[ignore = "needs a cluster running Steward"]
async fn pipeline_runs_in_parallel() {
    let report = executor()
        .await
        .with_mode(ExecutionMode::Parallel)
        .execute(&cases::default_plans().unwrap())
        .await
        .expect("plan failed");
    assert_eq!(report.cases.len(), 6);
}

#[tokio::test]
#[ignore = "needs a cluster running Steward"]
async fn pipeline_run_success() {
    let report = executor()
        .await
        .execute_single(cases::pipeline_run_ok)
        .await
        .expect("smoke test failed");
    assert_eq!(report.name, "ok");
}
