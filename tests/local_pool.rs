// tests/local_pool.rs

mod common;
use crate::common::{FakeCollaborator, init_tracing, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use url::Url;

use lso::backend::{JobSubmitter, LocalPool, SubmitError};
use lso::engine::JobRunner;
use lso::handlers::WebhookClient;
use lso::model::{Job, JobKind};

fn runner(fake: &FakeCollaborator) -> Arc<JobRunner> {
    let client = WebhookClient::new(Duration::from_secs(2)).unwrap();
    Arc::new(JobRunner::new(Arc::new(fake.clone()), client))
}

fn executable_job(callback: Option<Url>) -> Job {
    Job::new(JobKind::Executable {
        executable_path: "/opt/bin/job.sh".into(),
        args: vec![],
    })
    .callback(callback)
}

#[tokio::test]
async fn queued_jobs_all_run_and_shutdown_drains() {
    init_tracing();
    let mut server = Server::new_async().await;
    let callback = server
        .mock("POST", "/done")
        .match_body(Matcher::PartialJson(json!({"status": "successful"})))
        .expect(6)
        .create_async()
        .await;
    let url = Url::parse(&format!("{}/done", server.url())).unwrap();

    let fake = FakeCollaborator::new()
        .with_lines(&["x", "y"])
        .with_line_delay(Duration::from_millis(20));
    let pool = LocalPool::new(2, runner(&fake), false);

    for _ in 0..6 {
        pool.submit(executable_job(Some(url.clone()))).await.unwrap();
    }
    with_timeout(pool.shutdown()).await;

    callback.assert_async().await;
    assert_eq!(fake.run_count(), 6);
    assert!(fake.peak_concurrency() <= 2, "peak {}", fake.peak_concurrency());
}

#[tokio::test]
async fn submit_does_not_wait_outside_testing_mode() {
    let fake = FakeCollaborator::new()
        .with_lines(&["slow"])
        .with_line_delay(Duration::from_millis(500));
    let pool = LocalPool::new(1, runner(&fake), false);

    let submitted = tokio::time::timeout(
        Duration::from_millis(100),
        pool.submit(executable_job(None)),
    )
    .await;

    assert!(matches!(submitted, Ok(Ok(()))));
    with_timeout(pool.shutdown()).await;
}

#[tokio::test]
async fn failing_job_does_not_take_down_the_worker() {
    let mut server = Server::new_async().await;
    let broken = server
        .mock("POST", "/broken")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let fine = server
        .mock("POST", "/fine")
        .expect(1)
        .create_async()
        .await;

    let fake = FakeCollaborator::new();
    let pool = LocalPool::new(1, runner(&fake), true);

    let broken_url = Url::parse(&format!("{}/broken", server.url())).unwrap();
    let fine_url = Url::parse(&format!("{}/fine", server.url())).unwrap();

    let err = pool.submit(executable_job(Some(broken_url))).await.unwrap_err();
    assert!(matches!(err, SubmitError::Job { .. }));

    pool.submit(executable_job(Some(fine_url))).await.unwrap();

    broken.assert_async().await;
    fine.assert_async().await;
    pool.shutdown().await;
}

#[tokio::test]
async fn submit_after_shutdown_is_refused() {
    let fake = FakeCollaborator::new();
    let pool = LocalPool::new(1, runner(&fake), false);
    pool.shutdown().await;

    let err = pool.submit(executable_job(None)).await.unwrap_err();

    assert!(matches!(err, SubmitError::Closed));
    assert_eq!(fake.run_count(), 0);
}

#[tokio::test]
async fn zero_size_still_gets_one_worker() {
    let fake = FakeCollaborator::new();
    let pool = LocalPool::new(0, runner(&fake), true);

    assert_eq!(pool.size(), 1);
    pool.submit(executable_job(None)).await.unwrap();
    assert_eq!(fake.run_count(), 1);
}
