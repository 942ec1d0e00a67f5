//! End-to-end checks of the image's health contract: real probe runs fed into the
//! model of the runtime's interval, start period and retry rules.

use healthcheck::{
    health::{HealthState, HealthStatusTracker},
    probe_once, HealthcheckPolicy, ProbeConfig,
};
use healthcheck_testing_framework::{unused_port, HealthBehavior, MockHealthServer};
use std::{sync::Arc, time::Duration};

fn probe_config(port: u16) -> ProbeConfig {
    ProbeConfig::new(port, "actuator/health".parse().unwrap())
        .with_host("127.0.0.1")
        .with_timeout(Duration::from_millis(500))
}

#[tokio::test]
async fn test_three_consecutive_failures_mark_unhealthy() {
    let server = MockHealthServer::new(HealthBehavior::Respond(503), Arc::default());
    let port = server.run().await.unwrap();

    let mut tracker = HealthStatusTracker::new(HealthcheckPolicy::default());
    // All three runs land after the 30s start period.
    let schedule: Vec<Duration> = tracker
        .probe_schedule()
        .skip_while(|at| *at < Duration::from_secs(30))
        .take(3)
        .collect();

    let mut states = vec![];
    for at in schedule {
        let result = probe_once(probe_config(port)).await;
        assert_ne!(result.exit_code(), 0);
        states.push(tracker.observe(at, &result));
    }

    assert_eq!(
        states,
        vec![
            HealthState::Starting,
            HealthState::Starting,
            HealthState::Unhealthy
        ]
    );
    assert_eq!(tracker.failing_streak(), 3);
}

#[tokio::test]
async fn test_refused_connections_during_start_period_do_not_count() {
    let port = unused_port().await.unwrap();
    let policy = HealthcheckPolicy::default();
    let mut tracker = HealthStatusTracker::new(policy.clone());

    // The service is still booting: every probe inside the start period is refused.
    for at in [5, 10, 15, 20, 25] {
        let result = probe_once(probe_config(port)).await;
        assert_ne!(result.exit_code(), 0);
        assert_eq!(
            tracker.observe(Duration::from_secs(at), &result),
            HealthState::Starting
        );
    }
    assert_eq!(tracker.failing_streak(), 0);

    // Once up, one success is enough.
    let server = MockHealthServer::new(HealthBehavior::Respond(200), Arc::default());
    let port = server.run().await.unwrap();
    let result = probe_once(probe_config(port)).await;
    assert_eq!(
        tracker.observe(policy.start_period(), &result),
        HealthState::Healthy
    );
}

#[tokio::test]
async fn test_hanging_service_becomes_unhealthy() {
    let server = MockHealthServer::new(HealthBehavior::Hang, Arc::default());
    let port = server.run().await.unwrap();

    let policy = HealthcheckPolicy::default();
    let mut tracker = HealthStatusTracker::new(policy.clone());
    let mut state = tracker.state();
    for n in 1..=policy.retries {
        let result = probe_once(probe_config(port)).await;
        state = tracker.observe(policy.start_period() + policy.interval() * n, &result);
    }
    assert_eq!(state, HealthState::Unhealthy);
}

#[test]
fn test_policy_from_yaml_uses_defaults() {
    let policy: HealthcheckPolicy = serde_yaml::from_str("retries: 5").unwrap();
    assert_eq!(policy.retries, 5);
    assert_eq!(policy.interval_secs, 30);
    assert_eq!(policy.timeout_secs, 5);
    assert_eq!(policy.start_period_secs, 30);
}
