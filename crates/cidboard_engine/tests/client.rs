use std::fs;

use cidboard_engine::{
    ApiClient, ClientSettings, CollectionList, ControlKind, FailureKind, LoginRequest,
    RegisterRequest, Reply, ReqwestApiClient, RetryRequest, StartRequest,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn client_for(server: &MockServer, download_dir: &TempDir) -> ReqwestApiClient {
    ReqwestApiClient::new(ClientSettings {
        base_url: server.uri(),
        download_dir: download_dir.path().to_path_buf(),
        ..ClientSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn rejects_unparseable_base_url() {
    let err = ReqwestApiClient::new(ClientSettings {
        base_url: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn login_posts_credentials_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@b.co", "password": "secret1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "db_name": "cid"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let ack = client
        .login(&LoginRequest {
            email: "a@b.co".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .expect("login ok");
    assert_eq!(ack.success, Some(true));
    assert_eq!(ack.db_name.as_deref(), Some("cid"));
}

#[tokio::test]
async fn auth_failure_keeps_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "User already exists"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let err = client
        .register(&RegisterRequest {
            username: "Ada".to_string(),
            email: "a@b.co".to_string(),
            password: "secret1".to_string(),
            role: "user".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(409));
    assert_eq!(err.server_message.as_deref(), Some("User already exists"));
}

#[tokio::test]
async fn auth_failure_without_json_has_no_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let err = client
        .login(&LoginRequest {
            email: "a@b.co".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.server_message, None);
}

#[tokio::test]
async fn upload_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"tag\""))
        .and(body_string_contains("q1"))
        .and(body_string_contains("name=\"collection\""))
        .and(body_string_contains("east"))
        .and(body_string_contains("filename=\"batch.xlsx\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "inserted": 3,
            "skipped": 1,
            "collection": "east",
            "tag": "q1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("batch.xlsx");
    fs::write(&file, b"PK\x03\x04sheet").unwrap();

    let client = client_for(&server, &dir);
    let reply = client.upload(&file, "q1", "east").await.expect("upload ok");
    match reply {
        Reply::Success(receipt) => {
            assert_eq!(receipt.inserted, 3);
            assert_eq!(receipt.skipped, 1);
            assert_eq!(receipt.collection, "east");
        }
        other => panic!("unexpected reply {other:?}"),
    }
}

#[tokio::test]
async fn upload_of_missing_file_is_io_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);

    let err = client
        .upload(&dir.path().join("absent.xlsx"), "q1", "east")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn error_field_is_a_refusal_whatever_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/start"))
        .and(body_json(json!({"workers": 4, "collection": "east"})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Processing already active"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let reply = client
        .start(&StartRequest {
            workers: 4,
            collection: "east".to_string(),
        })
        .await
        .expect("body readable");
    assert_eq!(reply, Reply::Refused("Processing already active".to_string()));
}

#[tokio::test]
async fn control_returns_acknowledgement_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pause"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Processing paused"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let reply = client.control(ControlKind::Pause).await.unwrap();
    assert_eq!(reply, Reply::Success("Processing paused".to_string()));
}

#[tokio::test]
async fn status_parses_counters_and_collection_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .and(query_param("collection", "east side"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processing_active": true,
            "active_workers": 2,
            "paused": false,
            "stopped": false,
            "current_collection": "east side",
            "total": 10,
            "processed": 4,
            "failed": 1,
            "new": 5,
            "processing": 0,
            "tags": ["q1", "q2"],
            "max_workers": 10
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let report = match client.status(Some("east side")).await.unwrap() {
        Reply::Success(report) => report,
        other => panic!("unexpected reply {other:?}"),
    };
    assert!(report.processing_active);
    assert_eq!(report.active_workers, 2);
    assert_eq!(report.current_collection.as_deref(), Some("east side"));
    assert_eq!(report.total, 10);
    assert_eq!(report.tags, vec!["q1".to_string(), "q2".to_string()]);
    assert_eq!(report.max_workers, Some(10));
    assert_eq!(report.total_failed, 0);
}

#[tokio::test]
async fn empty_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let err = client.collections().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn null_collections_decode_as_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"collections": null, "current_collection": "east"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let reply = client.collections().await.unwrap();
    assert_eq!(
        reply,
        Reply::Success(CollectionList {
            collections: Vec::new(),
            current_collection: Some("east".to_string()),
        })
    );
}

#[tokio::test]
async fn delete_encodes_collection_name_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/collections/east%20side"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Collection deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let reply = client.delete_collection("east side").await.unwrap();
    assert_eq!(reply, Reply::Success("Collection deleted".to_string()));
}

#[tokio::test]
async fn retry_failed_reports_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/retry-failed"))
        .and(body_json(json!({"collection": "east"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Reset 2 failed records",
            "count": 2
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let receipt = match client
        .retry_failed(&RetryRequest {
            collection: "east".to_string(),
        })
        .await
        .unwrap()
    {
        Reply::Success(receipt) => receipt,
        other => panic!("unexpected reply {other:?}"),
    };
    assert_eq!(receipt.count, 2);
}

#[tokio::test]
async fn download_saves_file_under_server_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .and(query_param("tag", "q1"))
        .and(query_param("collection", "east"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"east_q1.xlsx\"")
                .set_body_raw(b"PK\x03\x04data".to_vec(), XLSX),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);

    let first = match client.download("q1", "east").await.unwrap() {
        Reply::Success(file) => file,
        other => panic!("unexpected reply {other:?}"),
    };
    assert_eq!(first.file_name, "east_q1.xlsx");
    assert_eq!(first.bytes, 8);
    assert_eq!(fs::read(&first.path).unwrap(), b"PK\x03\x04data");

    let second = match client.download("q1", "east").await.unwrap() {
        Reply::Success(file) => file,
        other => panic!("unexpected reply {other:?}"),
    };
    assert_eq!(second.file_name, "east_q1 (1).xlsx");
    assert!(first.path.exists());
}

#[tokio::test]
async fn download_without_disposition_uses_fallback_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"xlsx".to_vec(), XLSX))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let file = match client.download("all", "east").await.unwrap() {
        Reply::Success(file) => file,
        other => panic!("unexpected reply {other:?}"),
    };
    assert_eq!(file.file_name, "processed_data_east_all.xlsx");
}

#[tokio::test]
async fn download_not_found_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "No processed data found"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = client_for(&server, &dir);
    let reply = client.download("q9", "east").await.unwrap();
    assert_eq!(reply, Reply::Refused("No processed data found".to_string()));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn download_over_cap_is_too_large() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 64], XLSX))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = ReqwestApiClient::new(ClientSettings {
        base_url: server.uri(),
        download_dir: dir.path().to_path_buf(),
        max_download_bytes: 16,
        ..ClientSettings::default()
    })
    .unwrap();
    let err = client.download("all", "east").await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}
