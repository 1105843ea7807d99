mod common;

use common::{
    FakePipeline, coordinator_for, coordinator_with_timeout, normalize_echo, raw_responder,
    silent_responder,
};
use logcheck::{Coordinator, HarnessConfig, HarnessError, MessageTypeInfo, Registry};
use logcheck_network::{NetworkError, Transport, TransportErrorKind};
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_tcp_round_trip_returns_normalized_event() {
    let fake = FakePipeline::json_tcp("echo_tcp", normalize_echo).await;
    let coordinator = coordinator_for(&[&fake]).await;

    let result = coordinator.round_trip("echo_tcp", "hello pipeline").await.unwrap();
    assert_eq!(result["log"]["raw"], "hello pipeline");
    assert!(result["log"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_udp_round_trip_returns_normalized_event() {
    let fake = FakePipeline::json_udp("echo_udp", normalize_echo).await;
    let coordinator = coordinator_for(&[&fake]).await;

    let result = coordinator.round_trip("echo_udp", "hello over udp").await.unwrap();
    assert_eq!(result["log"]["raw"], "hello over udp");
    assert_eq!(fake.received(), vec!["hello over udp".to_string()]);
}

#[tokio::test]
async fn test_tcp_payload_arrives_terminated_once() {
    let fake = FakePipeline::json_tcp("echo_tcp", normalize_echo).await;
    let coordinator = coordinator_for(&[&fake]).await;

    coordinator.round_trip("echo_tcp", "payload").await.unwrap();
    coordinator.round_trip("echo_tcp", "terminated\n").await.unwrap();
    assert_eq!(
        fake.received(),
        vec!["payload\n".to_string(), "terminated\n".to_string()]
    );
}

#[tokio::test]
async fn test_distinct_types_run_concurrently_without_cross_talk() {
    let tcp = FakePipeline::json_tcp("echo_tcp", normalize_echo).await;
    let udp = FakePipeline::json_udp("echo_udp", normalize_echo).await;
    let coordinator = coordinator_for(&[&tcp, &udp]).await;

    let (from_tcp, from_udp) = tokio::join!(
        coordinator.round_trip("echo_tcp", "first"),
        coordinator.round_trip("echo_udp", "second"),
    );
    assert_eq!(from_tcp.unwrap()["log"]["raw"], "first");
    assert_eq!(from_udp.unwrap()["log"]["raw"], "second");
}

#[tokio::test]
async fn test_same_type_round_trips_each_get_their_own_event() {
    let fake = FakePipeline::json_tcp("echo_tcp", normalize_echo).await;
    let coordinator = coordinator_for(&[&fake]).await;

    let (a, b, c) = tokio::join!(
        coordinator.round_trip("echo_tcp", "a"),
        coordinator.round_trip("echo_tcp", "b"),
        coordinator.round_trip("echo_tcp", "c"),
    );
    assert_eq!(a.unwrap()["log"]["raw"], "a");
    assert_eq!(b.unwrap()["log"]["raw"], "b");
    assert_eq!(c.unwrap()["log"]["raw"], "c");
    assert_eq!(fake.received().len(), 3);
}

#[tokio::test]
async fn test_silent_pipeline_times_out() {
    let fake = FakePipeline::start("silent", Transport::Tcp, silent_responder()).await;
    let coordinator = coordinator_with_timeout(&[&fake], Duration::from_millis(200)).await;

    let err = coordinator.round_trip("silent", "anyone there?").await.unwrap_err();
    assert!(err.is_timeout(), "Expected a timeout, got {err:?}");
}

#[tokio::test]
async fn test_non_json_result_is_a_decode_error_with_raw_bytes() {
    let fake = FakePipeline::start("garbled", Transport::Udp, raw_responder(b"not json")).await;
    let coordinator = coordinator_for(&[&fake]).await;

    match coordinator.round_trip("garbled", "message").await {
        Err(HarnessError::Network(NetworkError::Decode { raw, .. })) => {
            assert_eq!(raw, b"not json")
        }
        other => panic!("Expected a decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refused_producer_port_is_a_transport_error() {
    let fake = FakePipeline::json_tcp("echo_tcp", normalize_echo).await;
    let closed_port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let registry = Registry::from_entries([MessageTypeInfo::new(
        "nowhere",
        Transport::Tcp,
        closed_port,
        fake.info.result_port,
    )]);
    let config = HarnessConfig::default().with_host(common::LOCALHOST);
    let coordinator = Coordinator::new(registry, config).await.unwrap();

    let err = coordinator.round_trip("nowhere", "message").await.unwrap_err();
    assert_eq!(err.as_transport().map(|e| e.kind()), Some(TransportErrorKind::Connect));
}

#[tokio::test]
async fn test_unknown_message_type_is_rejected_before_any_io() {
    let config = HarnessConfig::default().with_host(common::LOCALHOST);
    let coordinator = Coordinator::new(Registry::default(), config).await.unwrap();

    match coordinator.round_trip("nonexistent", "message").await {
        Err(HarnessError::UnknownMessageType(name)) => assert_eq!(name, "nonexistent"),
        other => panic!("Expected an unknown message type, got {other:?}"),
    }
}

#[tokio::test]
async fn test_custom_trigger_runs_after_the_listener_connects() {
    let fake = FakePipeline::json_udp("echo_udp", normalize_echo).await;
    let coordinator = coordinator_for(&[&fake]).await;
    let sender = coordinator.sender();
    let port = fake.info.destination_port;

    let result = coordinator
        .round_trip_with("echo_udp", || async move {
            sender.send(port, Transport::Udp, "from a trigger").await
        })
        .await
        .unwrap();
    assert_eq!(result["log"]["raw"], "from a trigger");
}
