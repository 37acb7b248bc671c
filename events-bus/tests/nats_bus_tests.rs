//! NATS event bus tests.
//!
//! These need a running server:
//! 1. `docker run -p 4222:4222 nats:2`
//! 2. `NATS_URL=nats://localhost:4222 cargo test --test nats_bus_tests`
//!
//! Without `NATS_URL` every test returns early.

use events_bus::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub run: String,
    pub seq: u32,
}

event_set! {
    pub enum PingEvent {
        Ping(Ping) => "OnNatsBusTestPing",
    }
}

fn nats_config(queue_group: &str) -> Option<NatsConfig> {
    let url = std::env::var("NATS_URL").ok()?;
    Some(NatsConfig {
        server_url: url,
        queue_group: queue_group.to_string(),
        client_name: "events-bus-tests".to_string(),
        ..NatsConfig::default()
    })
}

fn unique_run() -> String {
    format!(
        "{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

#[tokio::test]
async fn test_connect_to_unreachable_server_fails_fast() {
    let config = NatsConfig {
        server_url: "nats://127.0.0.1:1".to_string(),
        connection_timeout: Duration::from_millis(200),
        ..NatsConfig::default()
    };
    let result = timeout(Duration::from_secs(5), NatsEventBus::<PingEvent>::connect(config))
        .await
        .expect("connect must not hang");
    assert!(matches!(result, Err(EventBusError::BrokerConnection(_))));
}

#[tokio::test]
async fn test_published_event_reaches_handler_as_decoded_copy() {
    let Some(config) = nats_config("events-bus-tests-roundtrip") else {
        return;
    };
    let run = unique_run();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut bus = NatsEventBus::<PingEvent>::connect(config).await.unwrap();
    let log = Arc::clone(&seen);
    let expected_run = run.clone();
    bus.register_handler::<Ping, _>(HandlerFn(move |ping: Ping| {
        let log = Arc::clone(&log);
        let expected_run = expected_run.clone();
        async move {
            if ping.run == expected_run {
                log.lock().unwrap().push(ping.seq);
            }
        }
    }))
    .await
    .unwrap();
    assert_eq!(bus.subscribed_subjects(), vec![EventName::new("OnNatsBusTestPing")]);

    let (token, watcher) = ShutdownToken::new();
    bus.run(watcher).await.unwrap();
    bus.push_event(Ping { run, seq: 1 }.into()).await;

    timeout(Duration::from_secs(5), async {
        while seen.lock().unwrap().is_empty() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1]);

    token.cancel();
    bus.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_queue_group_delivers_each_event_to_one_replica() {
    const EVENTS: u32 = 40;
    let Some(config) = nats_config("events-bus-tests-queue") else {
        return;
    };
    let run = unique_run();
    let handled = Arc::new(AtomicUsize::new(0));

    let mut replicas = Vec::new();
    for _ in 0..2 {
        let mut bus = NatsEventBus::<PingEvent>::connect(config.clone()).await.unwrap();
        let counter = Arc::clone(&handled);
        let expected_run = run.clone();
        bus.register_handler::<Ping, _>(HandlerFn(move |ping: Ping| {
            let counter = Arc::clone(&counter);
            let expected_run = expected_run.clone();
            async move {
                if ping.run == expected_run {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }
        }))
        .await
        .unwrap();
        replicas.push(bus);
    }

    let publisher = NatsEventBus::<PingEvent>::connect(config).await.unwrap();
    for seq in 0..EVENTS {
        publisher
            .push_event(
                Ping {
                    run: run.clone(),
                    seq,
                }
                .into(),
            )
            .await;
    }

    timeout(Duration::from_secs(5), async {
        while handled.load(Ordering::SeqCst) < EVENTS as usize {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    sleep(Duration::from_millis(200)).await;
    assert_eq!(handled.load(Ordering::SeqCst), EVENTS as usize);

    for mut bus in replicas {
        bus.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_push_after_shutdown_is_dropped() {
    let Some(config) = nats_config("events-bus-tests-closed") else {
        return;
    };
    let mut bus = NatsEventBus::<PingEvent>::connect(config).await.unwrap();
    bus.shutdown().await.unwrap();

    bus.push_event(
        Ping {
            run: unique_run(),
            seq: 0,
        }
        .into(),
    )
    .await;
    let err = bus
        .register_handler::<Ping, _>(HandlerFn(|_ping: Ping| async {}))
        .await
        .unwrap_err();
    assert!(matches!(err, EventBusError::BrokerConnection(_)));
}
