mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeService, LONG, drain};
use runvisor::{ControllerState, EventKind, LifecycleController};
use tokio::time::timeout;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_spawn_exactly_one_run() {
    let svc = FakeService::ready_after(Duration::from_millis(50));
    let ctl = LifecycleController::new(svc.clone());

    let callers: Vec<_> = (0..16)
        .map(|_| {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move { ctl.start(true, Some(LONG)).await })
        })
        .collect();

    for c in callers {
        assert!(c.await.unwrap(), "every caller observes readiness");
    }
    assert_eq!(svc.starts(), 1);
    assert_eq!(ctl.state(), ControllerState::Running);

    ctl.reset().await;
    assert_eq!(svc.stops(), 1);
}

#[tokio::test]
async fn stop_before_start_never_hangs() {
    let svc = FakeService::instant();
    let ctl = LifecycleController::new(svc.clone());

    ctl.stop();
    let finished = timeout(LONG, ctl.join(None)).await.expect("join hung");

    assert!(finished);
    assert_eq!(ctl.state(), ControllerState::Stopped);
    assert_eq!(svc.starts(), 0);
    assert_eq!(svc.stops(), 0);
    assert_eq!(svc.prepares.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn full_cycle_stops_service_once() {
    let svc = FakeService::instant();
    let ctl = LifecycleController::new(svc.clone());
    let mut rx = ctl.subscribe();

    assert!(ctl.start(true, Some(LONG)).await);
    assert_eq!(ctl.state(), ControllerState::Running);

    ctl.stop();
    assert!(ctl.join(None).await);

    assert_eq!(svc.starts(), 1);
    assert_eq!(svc.stops(), 1);
    assert_eq!(ctl.state(), ControllerState::Stopped);
    assert_eq!(
        drain(&mut rx),
        vec![
            EventKind::StartRequested,
            EventKind::ServiceStarting,
            EventKind::Ready,
            EventKind::StopRequested,
            EventKind::ServiceStopping,
            EventKind::Stopped,
        ]
    );
}

#[tokio::test]
async fn reset_restores_idle() {
    let svc = FakeService::ready_after(Duration::from_millis(100));
    let ctl = LifecycleController::new(svc.clone());

    assert!(ctl.start(true, Some(LONG)).await);
    ctl.reset().await;
    assert_eq!(ctl.state(), ControllerState::Idle);
    assert!(!ctl.signals().ready().is_set());
    assert!(!ctl.signals().stopped().is_set());

    // no stale readiness from the previous run
    assert!(!ctl.start(false, None).await);
    assert_eq!(ctl.state(), ControllerState::Pending);

    assert!(ctl.start(true, Some(LONG)).await);
    assert_eq!(svc.starts(), 2);

    ctl.reset().await;
    assert_eq!(svc.stops(), 2);
}

#[tokio::test]
async fn reset_without_start_is_noop() {
    let svc = FakeService::instant();
    let ctl = LifecycleController::new(svc.clone());

    timeout(LONG, ctl.reset()).await.expect("reset hung");

    assert_eq!(ctl.state(), ControllerState::Idle);
    assert_eq!(svc.starts(), 0);
    assert_eq!(svc.stops(), 0);

    assert!(ctl.start(true, Some(LONG)).await);
    assert_eq!(svc.starts(), 1);
    ctl.reset().await;
}

#[tokio::test]
async fn zero_timeout_start_does_not_corrupt_state() {
    let svc = FakeService::ready_after(Duration::from_millis(200));
    let ctl = LifecycleController::new(svc.clone());

    assert!(!ctl.start(true, Some(Duration::ZERO)).await);
    assert_eq!(ctl.state(), ControllerState::Pending);

    // the run keeps going in the background
    assert!(ctl.wait_ready(Some(LONG)).await.is_ok());

    ctl.stop();
    assert!(timeout(LONG, ctl.join(None)).await.expect("join hung"));
    assert_eq!(svc.starts(), 1);
    assert_eq!(svc.stops(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_stops_call_service_stop_once() {
    let svc = FakeService::instant();
    let ctl = LifecycleController::new(svc.clone());
    assert!(ctl.start(true, Some(LONG)).await);

    let stoppers: Vec<_> = (0..8)
        .map(|_| {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move { ctl.stop() })
        })
        .collect();
    for s in stoppers {
        s.await.unwrap();
    }
    ctl.stop();

    assert!(ctl.join(None).await);
    assert_eq!(svc.stops(), 1);
}

#[tokio::test]
async fn join_before_start_waits_for_a_run() {
    let svc = FakeService::instant();
    let ctl = LifecycleController::new(svc.clone());

    let joiner = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.join(None).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!joiner.is_finished());

    assert!(ctl.start(true, Some(LONG)).await);
    ctl.stop();

    assert!(timeout(LONG, joiner).await.expect("join hung").unwrap());
    assert_eq!(svc.stops(), 1);
}

#[tokio::test]
async fn join_timeout_keeps_run_handle() {
    let svc = FakeService::instant();
    let ctl = LifecycleController::new(svc.clone());
    assert!(ctl.start(true, Some(LONG)).await);

    assert!(!ctl.join(Some(Duration::from_millis(20))).await);
    assert_eq!(ctl.state(), ControllerState::Running);

    ctl.stop();
    assert!(ctl.join(Some(LONG)).await);
    assert_eq!(ctl.state(), ControllerState::Stopped);
}

#[tokio::test]
async fn start_after_stop_reports_not_ready_until_reset() {
    let svc = FakeService::instant();
    let ctl = LifecycleController::new(svc.clone());

    ctl.stop();
    ctl.join(None).await;

    assert!(!ctl.start(true, Some(LONG)).await);
    assert_eq!(svc.starts(), 0);

    ctl.reset().await;
    assert!(ctl.start(true, Some(LONG)).await);
    assert_eq!(svc.starts(), 1);
    ctl.reset().await;
}

const ROUNDS: usize = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_racing_start_never_hangs() {
    for _ in 0..ROUNDS {
        let svc = FakeService::instant();
        let ctl = LifecycleController::new(svc.clone());

        let starter = {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move { ctl.start(true, Some(LONG)).await })
        };
        let stopper = {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move { ctl.stop() })
        };

        timeout(LONG, async {
            starter.await.unwrap();
            stopper.await.unwrap();
            assert!(ctl.join(None).await);
        })
        .await
        .expect("stop racing start hung");

        assert_eq!(ctl.state(), ControllerState::Stopped);
        assert_eq!(svc.stops(), svc.starts());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resets_never_hang() {
    for _ in 0..ROUNDS {
        let svc = FakeService::instant();
        let ctl = LifecycleController::new(svc.clone());
        assert!(ctl.start(true, Some(LONG)).await);

        let resets: Vec<_> = (0..2)
            .map(|_| {
                let ctl = Arc::clone(&ctl);
                tokio::spawn(async move { ctl.reset().await })
            })
            .collect();

        timeout(LONG, async {
            for r in resets {
                r.await.unwrap();
            }
        })
        .await
        .expect("concurrent resets hung");

        assert_eq!(ctl.state(), ControllerState::Idle);
        assert_eq!(svc.starts(), 1);
        assert_eq!(svc.stops(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn join_racing_reset_never_hangs() {
    for _ in 0..ROUNDS {
        let svc = FakeService::instant();
        let ctl = LifecycleController::new(svc.clone());
        assert!(ctl.start(true, Some(LONG)).await);

        let joiner = {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move { ctl.join(None).await })
        };
        timeout(LONG, ctl.reset()).await.expect("reset hung");

        // a joiner that arrived after the reset waits for the next run
        assert!(ctl.start(true, Some(LONG)).await);
        ctl.stop();

        let joined = timeout(LONG, joiner).await.expect("join racing reset hung");
        assert!(joined.unwrap());

        timeout(LONG, ctl.reset()).await.expect("reset hung");
        assert_eq!(svc.starts(), 2);
        assert_eq!(svc.stops(), 2);
    }
}
