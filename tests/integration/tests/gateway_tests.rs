//! End-to-end tests of the PBX app service and the presence pipeline
//!
//! A test PBX logs in over a real WebSocket, identifies itself, replicates its
//! user table and then receives the presence produced from room events.

use integration_tests::*;
use presence_core::{DomainError, PbxConnection};
use serde_json::json;

fn lookups() -> (MapParticipants, MapUsers) {
    (
        MapParticipants::default().insert("r1", "p1", "u42"),
        MapUsers::default().insert("u42", "alice@example.com"),
    )
}

/// Log in, identify as pbx1 and replicate one user for alice
async fn replicated_pbx(gateway: &TestGateway) -> anyhow::Result<PbxClient> {
    let mut pbx = gateway.connect().await?;
    pbx.login().await?;
    pbx.send(pbx_info("pbx1", "example.com", &["PbxApi", "PbxTableUsers"]))
        .await?;

    let start = pbx.expect("ReplicateStart").await?;
    assert_eq!(start["api"], "PbxTableUsers");

    pbx.send(json!({"api": "PbxTableUsers", "mt": "ReplicateStartResult"}))
        .await?;
    pbx.expect("ReplicateNext").await?;

    pbx.send(replicated_user("g1", "pbx1", &["alice"])).await?;
    pbx.expect("ReplicateNext").await?;

    pbx.send(replication_end()).await?;
    gateway.wait_for_directory(1).await?;

    Ok(pbx)
}

#[tokio::test]
async fn test_login_and_identify() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();

    let mut pbx = gateway.connect().await.unwrap();
    pbx.login().await.unwrap();
    pbx.send(pbx_info("pbx1", "example.com", &["PbxApi"]))
        .await
        .unwrap();

    // Without PbxTableUsers no replication is requested; wait for registration
    for _ in 0..100 {
        if gateway.connections.identified_count() == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(gateway.connections.identified_count(), 1);
}

#[tokio::test]
async fn test_wrong_password_closes_connection() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();

    let mut pbx = gateway.connect().await.unwrap();
    let ok = pbx.login_with("wrong-password").await.unwrap();
    assert!(!ok);

    match pbx.recv().await.unwrap() {
        Received::Closed(code) => assert_eq!(code, Some(4004)),
        Received::Json(value) => panic!("unexpected message {value}"),
    }
}

#[tokio::test]
async fn test_message_before_login_closes_connection() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();

    let mut pbx = gateway.connect().await.unwrap();
    pbx.send(pbx_info("pbx1", "example.com", &["PbxApi"]))
        .await
        .unwrap();

    match pbx.recv().await.unwrap() {
        Received::Closed(code) => assert_eq!(code, Some(4003)),
        Received::Json(value) => panic!("unexpected message {value}"),
    }
}

#[tokio::test]
async fn test_invalid_json_closes_connection() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();

    let mut pbx = gateway.connect().await.unwrap();
    pbx.send(json!("not an object")).await.unwrap();

    match pbx.recv().await.unwrap() {
        Received::Closed(code) => assert_eq!(code, Some(4002)),
        Received::Json(value) => panic!("unexpected message {value}"),
    }
}

#[tokio::test]
async fn test_joined_sets_busy_on_pbx() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();
    let mut pbx = replicated_pbx(&gateway).await.unwrap();

    let outcome = gateway
        .pipeline
        .handle_payload(&room_event("r1", "p1", "joined"))
        .await
        .unwrap();
    assert_eq!(outcome.record.guid, "g1");
    assert_eq!(outcome.event.email, "alice@example.com");

    let presence = pbx.expect("SetPresence").await.unwrap();
    assert_eq!(presence["api"], "PbxApi");
    assert_eq!(presence["guid"], "g1");
    assert_eq!(presence["activity"], "Busy");
    assert_eq!(presence["note"], "In a meeting");

    pbx.send(json!({"api": "PbxApi", "mt": "SetPresenceResult", "src": presence["id"]}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_left_sets_available_on_pbx() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();
    let mut pbx = replicated_pbx(&gateway).await.unwrap();

    gateway
        .pipeline
        .handle_payload(&room_event("r1", "p1", "left"))
        .await
        .unwrap();

    let presence = pbx.expect("SetPresence").await.unwrap();
    assert_eq!(presence["guid"], "g1");
    assert_eq!(presence["activity"], "Available");
    assert_eq!(presence["note"], "");
}

#[tokio::test]
async fn test_unknown_participant_sends_nothing() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();
    let _pbx = replicated_pbx(&gateway).await.unwrap();

    let err = gateway
        .pipeline
        .handle_payload(&room_event("r1", "p9", "joined"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::LookupNotFound { .. }));
}

#[tokio::test]
async fn test_replication_changes_update_directory() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();
    let mut pbx = replicated_pbx(&gateway).await.unwrap();

    pbx.send(json!({
        "api": "PbxTableUsers", "mt": "ReplicateAdd",
        "columns": {"guid": "g2", "h323": "bob", "loc": "pbx1", "emails": [{"email": "bob@example.com"}]}
    }))
    .await
    .unwrap();
    gateway.wait_for_directory(2).await.unwrap();

    pbx.send(json!({"api": "PbxTableUsers", "mt": "ReplicateDel", "columns": {"guid": "g1"}}))
        .await
        .unwrap();
    gateway.wait_for_directory(1).await.unwrap();

    // alice is gone, so the event misses the directory
    let err = gateway
        .pipeline
        .handle_payload(&room_event("r1", "p1", "joined"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DirectoryMiss { .. }));
}

#[tokio::test]
async fn test_closed_pbx_leaves_registry() {
    let (participants, users) = lookups();
    let gateway = TestGateway::start(participants, users).await.unwrap();
    let pbx = replicated_pbx(&gateway).await.unwrap();

    let registered = gateway.connections.identified();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].pbx_info().unwrap().pbx, "pbx1");

    drop(pbx);
    for _ in 0..100 {
        if gateway.connections.connection_count() == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(gateway.connections.connection_count(), 0);

    let err = gateway
        .pipeline
        .handle_payload(&room_event("r1", "p1", "joined"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NoCanonicalConnection));
}
