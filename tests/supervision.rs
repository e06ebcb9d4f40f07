//! Task group and shutdown coordinator behaviour.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use chat_service::lifecycle::{task_fn, GroupState, TaskError, TaskGroup, TaskUnit};
use tokio::net::TcpListener;
use tokio::sync::{Barrier, Notify};
use tokio_util::sync::CancellationToken;

mod common;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct UnitFailure(&'static str);

/// A unit that waits for cancellation and records that it saw it.
fn waiter(
    name: &'static str,
    started: Arc<Barrier>,
    observed: Arc<AtomicBool>,
) -> Box<dyn TaskUnit> {
    task_fn(name, move |shutdown: CancellationToken| async move {
        started.wait().await;
        shutdown.cancelled().await;
        observed.store(true, Ordering::SeqCst);
        Err(TaskError::Canceled)
    })
}

#[tokio::test]
async fn test_first_failure_cancels_siblings() {
    let started = Arc::new(Barrier::new(3));
    let observed_1 = Arc::new(AtomicBool::new(false));
    let observed_3 = Arc::new(AtomicBool::new(false));

    let mut group = TaskGroup::new();
    group.spawn(waiter("unit-1", started.clone(), observed_1.clone()));
    group.spawn(task_fn("unit-2", {
        let started = started.clone();
        move |_shutdown: CancellationToken| async move {
            started.wait().await;
            Err(TaskError::failed(UnitFailure("unit two broke")))
        }
    }));
    group.spawn(waiter("unit-3", started.clone(), observed_3.clone()));
    assert_eq!(group.len(), 3);

    let err = group.run(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.task, "unit-2");
    assert_eq!(err.source.to_string(), "unit two broke");
    assert!(observed_1.load(Ordering::SeqCst));
    assert!(observed_3.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_parent_cancellation_is_not_an_error() {
    let started = Arc::new(Barrier::new(3));
    let observed = Arc::new(AtomicBool::new(false));

    let mut group = TaskGroup::new();
    group.spawn(waiter("a", started.clone(), observed.clone()));
    group.spawn(waiter("b", started.clone(), Arc::new(AtomicBool::new(false))));
    group.spawn(task_fn("clean", |shutdown: CancellationToken| async move {
        shutdown.cancelled().await;
        Ok(())
    }));

    let root = CancellationToken::new();
    let trigger = root.clone();
    tokio::spawn(async move {
        started.wait().await;
        trigger.cancel();
    });

    assert!(group.run(&root).await.is_ok());
    assert!(observed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_first_detected_failure_wins() {
    let mut group = TaskGroup::new();
    group.spawn(task_fn("slow", |_shutdown: CancellationToken| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Err(TaskError::failed(UnitFailure("slow")))
    }));
    group.spawn(task_fn("fast", |_shutdown: CancellationToken| async move {
        Err(TaskError::failed(UnitFailure("fast")))
    }));

    let err = group.run(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.task, "fast");
}

#[tokio::test]
async fn test_unexpected_cancellation_is_a_failure() {
    let mut group = TaskGroup::new();
    group.spawn(task_fn("quitter", |_shutdown: CancellationToken| async move {
        Err(TaskError::Canceled)
    }));

    let err = group.run(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.task, "quitter");
    assert!(err.source.is_cancellation());
}

#[tokio::test]
async fn test_panic_fails_group_and_cancels_siblings() {
    let observed = Arc::new(AtomicBool::new(false));
    let started = Arc::new(Barrier::new(2));

    let mut group = TaskGroup::new();
    group.spawn(waiter("sibling", started.clone(), observed.clone()));
    group.spawn(task_fn("crasher", move |_shutdown: CancellationToken| async move {
        started.wait().await;
        panic!("kaboom");
    }));

    let err = group.run(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.task, "crasher");
    assert!(matches!(err.source, TaskError::Panicked(ref msg) if msg == "kaboom"));
    assert!(observed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_panic_outranks_earlier_failure() {
    let mut group = TaskGroup::new();
    group.spawn(task_fn("failer", |_shutdown: CancellationToken| async move {
        Err(TaskError::failed(UnitFailure("ordinary")))
    }));
    group.spawn(task_fn("late-crasher", |shutdown: CancellationToken| async move {
        shutdown.cancelled().await;
        panic!("after cancel");
    }));

    let err = group.run(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.task, "late-crasher");
    assert!(matches!(err.source, TaskError::Panicked(_)));
}

#[tokio::test]
async fn test_state_transitions() {
    let mut group = TaskGroup::new();
    group.spawn(task_fn("once", |shutdown: CancellationToken| async move {
        shutdown.cancelled().await;
        Ok(())
    }));
    let state = group.state();
    assert_eq!(*state.borrow(), GroupState::Idle);

    let root = CancellationToken::new();
    let run = tokio::spawn({
        let root = root.clone();
        async move { group.run(&root).await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*state.borrow(), GroupState::Running);

    root.cancel();
    run.await.unwrap().unwrap();
    assert_eq!(*state.borrow(), GroupState::Done);
}

#[tokio::test]
async fn test_empty_group_returns_immediately() {
    let group = TaskGroup::new();
    assert!(group.is_empty());
    assert!(group.run(&CancellationToken::new()).await.is_ok());
}

#[tokio::test]
async fn test_in_flight_request_finishes_during_drain() {
    let entered = Arc::new(Notify::new());
    let router = Router::new().route(
        "/slow",
        get({
            let entered = entered.clone();
            move || async move {
                entered.notify_one();
                tokio::time::sleep(Duration::from_millis(200)).await;
                "done"
            }
        }),
    );

    let server = common::start_router(router, Duration::from_secs(2)).await;
    let request = tokio::spawn(common::client().get(server.url("/slow")).send());

    entered.notified().await;
    let result = server.stop().await;

    assert!(result.is_ok());
    let res = request.await.unwrap().unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "done");
}

#[tokio::test]
async fn test_stuck_request_is_aborted_after_grace() {
    let grace = Duration::from_millis(300);
    let entered = Arc::new(Notify::new());
    let router = Router::new().route(
        "/stuck",
        get({
            let entered = entered.clone();
            move || async move {
                entered.notify_one();
                tokio::time::sleep(Duration::from_secs(30)).await;
                "never"
            }
        }),
    );

    let server = common::start_router(router, grace).await;
    let request = tokio::spawn(common::client().get(server.url("/stuck")).send());
    entered.notified().await;

    let started = Instant::now();
    let result = server.stop().await;
    let elapsed = started.elapsed();

    assert!(result.is_ok());
    assert!(elapsed >= grace, "returned before grace: {elapsed:?}");
    assert!(elapsed < grace + Duration::from_secs(1), "took {elapsed:?}");
    assert!(request.await.unwrap().is_err());
}

#[tokio::test]
async fn test_listener_stops_accepting_after_cancel() {
    let router = Router::new().route("/", get(|| async { "ok" }));
    let server = common::start_router(router, Duration::from_millis(100)).await;
    let url = server.url("/");

    let res = common::client().get(&url).send().await.unwrap();
    assert_eq!(res.status(), 200);

    server.stop().await.unwrap();
    assert!(common::client().get(&url).send().await.is_err());
}

#[tokio::test]
async fn test_group_with_stuck_server_returns_within_grace() {
    let grace = Duration::from_millis(300);
    let entered = Arc::new(Notify::new());
    let router = Router::new().route(
        "/stuck",
        get({
            let entered = entered.clone();
            move || async move {
                entered.notify_one();
                tokio::time::sleep(Duration::from_secs(30)).await;
                "never"
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/stuck", listener.local_addr().unwrap());

    let mut group = TaskGroup::new();
    group.spawn(task_fn("server-stuck", move |shutdown: CancellationToken| {
        chat_service::net::serve(listener, router, shutdown, grace)
    }));

    let root = CancellationToken::new();
    let run = tokio::spawn({
        let root = root.clone();
        async move { group.run(&root).await }
    });

    let request = tokio::spawn(common::client().get(url).send());
    entered.notified().await;

    let started = Instant::now();
    root.cancel();
    let result = run.await.unwrap();
    let elapsed = started.elapsed();

    assert!(result.is_ok(), "{result:?}");
    assert!(elapsed >= grace, "returned before grace: {elapsed:?}");
    assert!(elapsed < grace + Duration::from_secs(1), "took {elapsed:?}");
    assert!(request.await.unwrap().is_err());
}
