use std::sync::Arc;

use tokio::sync::oneshot;

use beacon_api::AppStateInner;
use beacon_client::{ApiClient, ClientError};
use beacon_db::Database;
use beacon_types::api::SendMessageRequest;
use beacon_types::models::{BROADCAST_RECEIVER, Category, Priority};

/// Bind the API router on an ephemeral port backed by a scratch database.
/// Returns a client pointed at it plus a shutdown handle.
async fn start_server(dir: &tempfile::TempDir) -> (ApiClient, oneshot::Sender<()>) {
    let db = Database::open(dir.path().join("api.db")).expect("open db");
    let state = Arc::new(AppStateInner { db });
    let app = beacon_api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move {
        let _ = server.await;
    });

    (ApiClient::new(format!("http://{}", addr)), shutdown_tx)
}

fn request(sender: &str, receiver: &str, title: &str, content: &str) -> SendMessageRequest {
    SendMessageRequest {
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        category: None,
        priority: None,
    }
}

#[tokio::test]
async fn message_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    let id = client.send(&request("a", "b", "T", "C")).await.expect("send");
    assert_eq!(id, 1);

    let all = client.list_all().await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].sender_id, "a");
    assert_eq!(all[0].receiver_id, "b");
    assert_eq!(all[0].title, "T");
    assert_eq!(all[0].content, "C");
    assert!(!all[0].is_read);

    let fetched = client.get(id).await.expect("get by id");
    assert_eq!(fetched.content, "C");

    client.mark_read(id).await.expect("mark read");

    let unread = client.list_unread("b").await.expect("unread");
    assert!(unread.is_empty());

    let all = client.list_all().await.expect("list after read");
    assert!(all[0].is_read);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn ids_keep_increasing() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    let first = client.send(&request("a", "b", "1", "x")).await.unwrap();
    let second = client.send(&request("a", "b", "2", "x")).await.unwrap();
    assert!(second > first);

    // newest first
    let all = client.list_all().await.unwrap();
    assert_eq!(all[0].id, second);
    assert_eq!(all[1].id, first);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn rejects_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    let err = client
        .send(&request("a", "", "", "C"))
        .await
        .expect_err("empty fields must be rejected");

    match err {
        ClientError::Api { status, details, .. } => {
            assert_eq!(status.as_u16(), 400);
            let details = details.expect("per-field details");
            assert!(details.receiver_id.is_some());
            assert!(details.title.is_some());
            assert!(details.sender_id.is_none());
            assert!(details.content.is_none());
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // nothing was stored
    let all = client.list_all().await.unwrap();
    assert!(all.is_empty());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn rejects_unknown_category() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    let mut req = request("a", "b", "T", "C");
    req.category = Some("weather".to_string());

    let err = client.send(&req).await.expect_err("unknown category");
    match err {
        ClientError::Api { status, details, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert!(details.unwrap().category.is_some());
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let _ = shutdown.send(());
}

#[tokio::test]
async fn absent_ids_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    for err in [
        client.mark_read(999).await.expect_err("mark_read"),
        client.delete(999).await.expect_err("delete"),
        client.get(999).await.map(|_| ()).expect_err("get"),
    ] {
        match err {
            ClientError::Api { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    let _ = shutdown.send(());
}

#[tokio::test]
async fn delete_removes_message() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    let first = client.send(&request("a", "b", "1", "x")).await.unwrap();
    let second = client.send(&request("a", "b", "2", "x")).await.unwrap();

    client.delete(first).await.expect("delete");

    let all = client.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, second);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn broadcast_is_a_single_sentinel_row() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    client
        .broadcast(
            "admin",
            "Evacuation",
            "Proceed to the gathering point",
            Some(Category::Evacuation),
            Some(Priority::Critical),
        )
        .await
        .expect("broadcast");

    let all = client.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].receiver_id, BROADCAST_RECEIVER);
    assert_eq!(all[0].category, Some(Category::Evacuation));
    assert_eq!(all[0].priority, Some(Priority::Critical));

    // not fanned out: no per-user unread entry
    let unread = client.list_unread("citizen-1").await.unwrap();
    assert!(unread.is_empty());
    let unread = client.list_unread(BROADCAST_RECEIVER).await.unwrap();
    assert_eq!(unread.len(), 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn list_filters_by_category() {
    let dir = tempfile::tempdir().unwrap();
    let (client, shutdown) = start_server(&dir).await;

    let mut req = request("a", "b", "T", "C");
    req.category = Some("evacuation".to_string());
    client.send(&req).await.unwrap();

    let mut req = request("a", "b", "T", "C");
    req.category = Some("resources".to_string());
    req.priority = Some("high".to_string());
    client.send(&req).await.unwrap();

    client.send(&request("a", "b", "T", "C")).await.unwrap();

    let evac = client
        .list_filtered(Some(Category::Evacuation), None)
        .await
        .unwrap();
    assert_eq!(evac.len(), 1);
    assert_eq!(evac[0].category, Some(Category::Evacuation));

    let high = client.list_filtered(None, Some(Priority::High)).await.unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].category, Some(Category::Resources));

    let all = client.list_all().await.unwrap();
    assert_eq!(all.len(), 3);

    let _ = shutdown.send(());
}
