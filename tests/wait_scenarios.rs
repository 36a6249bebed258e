//! End-to-end waits on pipeline runs served by the fake client.

use std::sync::Arc;
use std::time::Duration;

use pipelinerun_e2e::builder::PipelineRunBuilder;
use pipelinerun_e2e::condition::{PipelineRunCheck, PipelineRunCondition};
use pipelinerun_e2e::crd::pipeline_run::RunResult;
use pipelinerun_e2e::error::Error;
use pipelinerun_e2e::fake::FakeClient;
use pipelinerun_e2e::lifecycle;
use pipelinerun_e2e::waiter::{WaitConfig, Waiter};

const TICK: Duration = Duration::from_secs(1);

fn waiter(fake: &Arc<FakeClient>) -> Waiter {
    Waiter::new(fake.clone(), WaitConfig::new(TICK, 120 * TICK).unwrap())
}

async fn submitted(fake: &FakeClient, check: PipelineRunCheck) -> PipelineRunCondition {
    let run = lifecycle::create_pipeline_run(fake, &PipelineRunBuilder::new("tn-1").build())
        .await
        .unwrap();
    PipelineRunCondition::new(&run, check, "ok_1")
}

#[tokio::test(start_paused = true)]
async fn run_that_succeeds_after_three_pending_polls() {
    let fake = Arc::new(FakeClient::new().run_pending_polls(3));
    let cond = submitted(&fake, PipelineRunCheck::HasStateResult(RunResult::Success)).await;

    let outcome = waiter(&fake).observe(&cond).await;

    assert!(outcome.satisfied);
    assert!(outcome.error.is_none());
    assert_eq!(outcome.condition_name, "ok_1");
    // Three pending observations, then the successful one.
    assert_eq!(outcome.polls, 4);
    assert_eq!(fake.calls().run_gets, 4);
    assert!(outcome.elapsed >= 3 * TICK && outcome.elapsed < 4 * TICK);
}

#[tokio::test(start_paused = true)]
async fn wrong_terminal_result_fails_on_the_first_poll() {
    let fake = Arc::new(FakeClient::new().default_result(RunResult::ErrorContent));
    let cond = submitted(&fake, PipelineRunCheck::HasStateResult(RunResult::Success)).await;

    let outcome = waiter(&fake).observe(&cond).await;

    assert!(!outcome.satisfied);
    assert_eq!(outcome.polls, 1);
    assert_eq!(outcome.elapsed, Duration::ZERO);
    let err = outcome.into_result().unwrap_err();
    assert!(err.is_definitive_failure());
    match err {
        Error::ConditionFailed {
            condition, source, ..
        } => {
            assert_eq!(condition, "ok_1");
            assert!(matches!(
                *source,
                Error::UnexpectedResult {
                    expected: RunResult::Success,
                    actual: RunResult::ErrorContent,
                    ..
                }
            ));
        }
        other => panic!("expected a condition failure, got {other:?}"),
    }

    tokio::time::sleep(10 * TICK).await;
    assert_eq!(fake.calls().run_gets, 1, "no polling after a definitive failure");
}

#[tokio::test(start_paused = true)]
async fn missing_pipeline_run_is_a_definitive_failure() {
    let fake = Arc::new(FakeClient::new());
    let run = lifecycle::create_pipeline_run(fake.as_ref(), &PipelineRunBuilder::new("tn-1").build())
        .await
        .unwrap();
    lifecycle::delete_pipeline_run(fake.as_ref(), &run).await.unwrap();
    let cond = PipelineRunCondition::new(
        &run,
        PipelineRunCheck::HasStateResult(RunResult::Success),
        "gone",
    );

    let err = waiter(&fake).wait_for(&cond).await.unwrap_err();
    assert!(err.is_definitive_failure(), "{err}");
}

#[tokio::test(start_paused = true)]
async fn concurrent_waits_share_one_client() {
    let fake = Arc::new(FakeClient::new().run_pending_polls(2));
    let w = waiter(&fake);
    let a = submitted(&fake, PipelineRunCheck::HasStateResult(RunResult::Success)).await;
    let b = submitted(&fake, PipelineRunCheck::HasStateResult(RunResult::Success)).await;

    let (ra, rb) = tokio::join!(w.wait_for(&a), w.wait_for(&b));

    ra.unwrap();
    rb.unwrap();
    assert_eq!(fake.calls().run_gets, 6);
}
