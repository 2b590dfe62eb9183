//! Uploads through a broker grant against a stand-in storage endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::put;
use axum::Router;
use tokio::sync::Mutex;
use url::Url;

use ::common::prelude::{ContentKind, EditorSession, MemorySurface, ObjectName};
use docvault_daemon::http_server::api::client::{ApiClient, ApiError, UploadError};
use docvault_daemon::http_server::router;
use docvault_daemon::serve;

mod common;

use crate::common::{spawn_router, state, FakeSigner};

#[derive(Debug, Clone)]
struct StoredPut {
    key: String,
    content_type: Option<String>,
    body: Bytes,
}

#[derive(Clone)]
struct Storage {
    status: StatusCode,
    puts: Arc<Mutex<Vec<StoredPut>>>,
}

async fn accept_put(
    State(storage): State<Storage>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    storage.puts.lock().await.push(StoredPut {
        key,
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    storage.status
}

/// Start a storage stand-in answering every PUT with `status`, and a broker
/// whose grants point at it.
async fn setup(status: StatusCode, signer_works: bool) -> (ApiClient, Storage) {
    let storage = Storage {
        status,
        puts: Arc::new(Mutex::new(Vec::new())),
    };
    let storage_addr = spawn_router(
        Router::new()
            .route("/docs/*key", put(accept_put))
            .with_state(storage.clone()),
    )
    .await;

    let signer = if signer_works {
        FakeSigner::Working(Url::parse(&format!("http://{}/docs/", storage_addr)).unwrap())
    } else {
        FakeSigner::Broken
    };
    let broker_addr = spawn_router(router(state(signer))).await;

    let client = ApiClient::new(&Url::parse(&format!("http://{}", broker_addr)).unwrap()).unwrap();
    (client, storage)
}

fn edited_export(kind: ContentKind) -> (ObjectName, ::common::prelude::LocalExport) {
    let session = EditorSession::local(MemorySurface::ready());
    session
        .open_local("report.sfdt", br#"{"sections":[{"text":"q3"}]}"#)
        .unwrap();
    let name = ObjectName::new("report").unwrap();
    let export = session.export_local(&name, kind);
    (name, export)
}

#[tokio::test]
async fn upload_puts_export_through_grant() {
    let (mut client, storage) = setup(StatusCode::OK, true).await;
    let (name, export) = edited_export(ContentKind::StructuredDocument);

    let url = client.upload(&name, &export).await.unwrap();
    assert_eq!(url.path(), "/docs/report.sfdt");

    let puts = storage.puts.lock().await;
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].key, "report.sfdt");
    assert_eq!(
        puts[0].content_type.as_deref(),
        Some("application/vnd.syncfusion.sfdt")
    );
    assert_eq!(puts[0].body.as_ref(), export.bytes.as_slice());
}

#[tokio::test]
async fn upload_json_uses_json_key_and_type() {
    let (mut client, storage) = setup(StatusCode::OK, true).await;
    let (name, export) = edited_export(ContentKind::GenericJson);

    client.upload(&name, &export).await.unwrap();

    let puts = storage.puts.lock().await;
    assert_eq!(puts[0].key, "report.json");
    assert_eq!(puts[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn rejected_put_is_upload_failed_without_retry() {
    let (mut client, storage) = setup(StatusCode::FORBIDDEN, true).await;
    let (name, export) = edited_export(ContentKind::StructuredDocument);

    match client.upload(&name, &export).await {
        Err(UploadError::UploadFailed(ApiError::HttpStatus(status, _))) => {
            assert_eq!(status, StatusCode::FORBIDDEN)
        }
        other => panic!("expected a rejected upload, got {:?}", other),
    }
    assert_eq!(storage.puts.lock().await.len(), 1);
}

#[tokio::test]
async fn grant_failure_never_reaches_storage() {
    let (mut client, storage) = setup(StatusCode::OK, false).await;
    let (name, export) = edited_export(ContentKind::StructuredDocument);

    match client.upload(&name, &export).await {
        Err(UploadError::Grant(ApiError::HttpStatus(status, _))) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
        }
        other => panic!("expected a grant failure, got {:?}", other),
    }
    assert!(storage.puts.lock().await.is_empty());
}

#[tokio::test]
async fn programmatic_shutdown_stops_the_broker() {
    let handle = serve(state(FakeSigner::working()), 0).unwrap();
    handle.shutdown();
    assert!(tokio::time::timeout(Duration::from_secs(10), handle.wait())
        .await
        .is_ok());
}
