//! Background-job tests: scans as cancellable tasks delivering events.

use std::sync::Arc;
use std::time::Duration;

use tablescope_core::Event;
use tablescope_core::services::JobRunner;

use crate::{TEST_TABLE, seeded_services};

#[tokio::test]
async fn test_should_replace_result_set_from_job_event() {
    let (read, _, _) = seeded_services().await;
    let read = Arc::new(read);
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());

    let (runner, mut events) = JobRunner::channel();
    let service = read.clone();
    let handle = runner.submit(async move {
        match service.scan(info).await {
            Ok(rs) => Event::ResultSetLoaded(rs),
            Err(err) => Event::Error(err.to_string()),
        }
    });

    // The owner mutates its state only while draining events.
    let Some(Event::ResultSetLoaded(rs)) = events.recv().await else {
        panic!("expected a result set event");
    };
    assert_eq!(rs.len(), 2);
    handle.join().await;
}

#[tokio::test]
async fn test_should_publish_no_partial_result_set_on_cancel() {
    let (read, _, _) = seeded_services().await;
    let read = Arc::new(read);
    let info = Arc::new(read.describe(TEST_TABLE).await.unwrap());

    let (runner, mut events) = JobRunner::channel();
    let service = read.clone();
    let handle = runner.submit(async move {
        // Simulate a slow store round trip before the scan completes.
        tokio::time::sleep(Duration::from_secs(60)).await;
        match service.scan(info).await {
            Ok(rs) => Event::ResultSetLoaded(rs),
            Err(err) => Event::Error(err.to_string()),
        }
    });

    handle.cancel();
    assert!(matches!(events.recv().await, Some(Event::Cancelled)));
    handle.join().await;
    assert!(events.try_recv().is_err());
}
