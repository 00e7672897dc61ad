// SPDX-License-Identifier: MIT

mod common;

use std::sync::Arc;

use challenge_sync::config::Config;
use challenge_sync::error::SyncError;
use challenge_sync::models::MediaType;
use challenge_sync::repos::ChallengeRepo;
use challenge_sync::services::{AirtableClient, ExternalChallengeRecord, MediaKind, SyncService};
use challenge_sync::store::{MemoryStorage, MemoryStore, ObjectStorage, RemoteStore};
use common::FixedClassifier;

/// Bridge over an in-memory store, pointed at the given Airtable
/// endpoint.
fn bridge_at(
    verdict: MediaKind,
    base_url: String,
) -> (Arc<MemoryStore>, ChallengeRepo, SyncService) {
    common::init_tracing();
    let store = Arc::new(MemoryStore::new());
    let storage = Arc::new(MemoryStorage::new());
    let challenges = ChallengeRepo::new(
        store.clone() as Arc<dyn RemoteStore>,
        storage as Arc<dyn ObjectStorage>,
    );
    let airtable = AirtableClient::with_base_url(&Config::test_default(), base_url);
    let sync = SyncService::new(airtable, Arc::new(FixedClassifier(verdict)), challenges.clone());
    (store, challenges, sync)
}

/// Bridge whose Airtable endpoint is a closed local port, so status
/// flips fail fast and deterministically.
fn bridge(verdict: MediaKind) -> (Arc<MemoryStore>, ChallengeRepo, SyncService) {
    bridge_at(verdict, "http://127.0.0.1:1/v0".to_string())
}

/// Minimal local Airtable stand-in: every GET serves the given listing
/// page, every PATCH answers with an empty object.
async fn spawn_airtable_stub(list_body: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    let list_body = list_body.to_string();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let list_body = list_body.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let body = if request.starts_with("PATCH") {
                    "{}"
                } else {
                    list_body.as_str()
                };
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{addr}/v0")
}

fn record(link: &str) -> ExternalChallengeRecord {
    ExternalChallengeRecord {
        record_id: "rec1".to_string(),
        title: "Dance off".to_string(),
        prompt: "Show us your moves".to_string(),
        point_value: 15,
        media_link: link.to_string(),
        up_to_date: false,
    }
}

#[tokio::test]
async fn test_promote_rejects_unrecognized_media() {
    let (store, _challenges, sync) = bridge(MediaKind::Other);

    let err = sync.promote(&record("https://example.com/whatever")).await.unwrap_err();
    assert!(err.to_string().contains(SyncError::INVALID_MEDIA_TYPE));

    // No partial challenge was created.
    assert!(store.writes().await.is_empty());
}

#[tokio::test]
async fn test_promote_video_uses_embed_link() {
    let (_store, challenges, sync) = bridge(MediaKind::Video);

    // The challenge is created, then the status flip fails (endpoint is
    // unreachable); the error carries the created challenge id.
    let err = sync.promote(&record("https://youtu.be/abc123")).await.unwrap_err();
    let challenge_id = err.partial_created_id().expect("created id").to_string();

    let challenge = challenges.get_one(&challenge_id).await.unwrap();
    let media = challenge.media.expect("media");
    assert_eq!(media.kind, MediaType::LinkedVideo);
    assert_eq!(media.link, "https://www.youtube.com/embed/abc123");
    assert_eq!(challenge.point_value, 15);
}

#[tokio::test]
async fn test_promote_gif_keeps_original_link() {
    let (_store, challenges, sync) = bridge(MediaKind::Gif);

    let err = sync.promote(&record("https://cdn.example.com/fun.gif")).await.unwrap_err();
    let challenge_id = err.partial_created_id().expect("created id").to_string();

    let challenge = challenges.get_one(&challenge_id).await.unwrap();
    let media = challenge.media.expect("media");
    assert_eq!(media.kind, MediaType::Gif);
    assert_eq!(media.link, "https://cdn.example.com/fun.gif");
    assert_eq!(media.storage_path, None);
}

#[tokio::test]
async fn test_promote_success_flips_status_and_returns_id() {
    let base = spawn_airtable_stub(r#"{"records":[]}"#).await;
    let (_store, challenges, sync) = bridge_at(MediaKind::Gif, base);

    let id = sync.promote(&record("https://cdn.example.com/fun.gif")).await.unwrap();

    let challenge = challenges.get_one(&id).await.unwrap();
    assert_eq!(challenge.media.expect("media").kind, MediaType::Gif);
    assert_eq!(challenge.point_value, 15);
}

#[tokio::test]
async fn test_sync_all_promotes_pending_rows_only() {
    let list_body = r#"{"records":[
        {"id":"rec1","fields":{
            "Title":"Dance off","Prompt":"Show us your moves",
            "Point value":"15","Link":"https://cdn.example.com/fun.gif"}},
        {"id":"rec2","fields":{"Title":"No prompt here"}},
        {"id":"rec3","fields":{
            "Title":"Karaoke night","Prompt":"Sing it",
            "Point value":"10","Link":"https://cdn.example.com/old.gif",
            "Up to Date?":"Yes"}}
    ]}"#;
    let base = spawn_airtable_stub(list_body).await;
    let (_store, challenges, sync) = bridge_at(MediaKind::Gif, base);

    let report = sync.sync_all().await.unwrap();

    // The undecodable row is reported, the up-to-date row is skipped,
    // and the pending row becomes a challenge.
    assert_eq!(report.irretrievable, vec!["rec2 – Prompt".to_string()]);
    assert!(report.failed.is_empty());
    assert_eq!(report.promoted.len(), 1);

    let challenge = challenges.get_one(&report.promoted[0]).await.unwrap();
    assert_eq!(challenge.title, "Dance off");
    assert_eq!(challenge.media.expect("media").link, "https://cdn.example.com/fun.gif");
}

#[tokio::test]
async fn test_promote_image_maps_to_static() {
    let (_store, challenges, sync) = bridge(MediaKind::Image);

    let err = sync.promote(&record("https://cdn.example.com/poster.png")).await.unwrap_err();
    let challenge_id = err.partial_created_id().expect("created id").to_string();

    let challenge = challenges.get_one(&challenge_id).await.unwrap();
    assert_eq!(challenge.media.expect("media").kind, MediaType::StaticImage);
}
