use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use cidboard_engine::{
    ApiClient, ApiError, AuthAck, ChannelEventSink, CollectionList, ControlKind, DownloadedFile,
    EngineCommand, EngineEvent, EngineHandle, LoginRequest, RegisterRequest, Reply, RetryReceipt,
    RetryRequest, StartReceipt, StartRequest, StatusReport, UploadReceipt,
};
use pretty_assertions::assert_eq;

/// Answers every call from memory and records what it was asked.
#[derive(Default)]
struct ScriptedClient {
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl ApiClient for ScriptedClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthAck, ApiError> {
        self.record(format!("login {}", request.email));
        Ok(AuthAck::default())
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthAck, ApiError> {
        self.record(format!("register {}", request.username));
        Ok(AuthAck::default())
    }

    async fn upload(
        &self,
        file: &Path,
        tag: &str,
        collection: &str,
    ) -> Result<Reply<UploadReceipt>, ApiError> {
        self.record(format!("upload {}", file.display()));
        Ok(Reply::Success(UploadReceipt {
            inserted: 1,
            tag: tag.to_string(),
            collection: collection.to_string(),
            ..UploadReceipt::default()
        }))
    }

    async fn start(&self, request: &StartRequest) -> Result<Reply<StartReceipt>, ApiError> {
        self.record(format!("start {}", request.workers));
        Ok(Reply::Refused("Processing already active".to_string()))
    }

    async fn control(&self, kind: ControlKind) -> Result<Reply<String>, ApiError> {
        self.record(kind.path());
        Ok(Reply::Success(format!("{} ok", kind.path())))
    }

    async fn status(&self, collection: Option<&str>) -> Result<Reply<StatusReport>, ApiError> {
        self.record(format!("status {collection:?}"));
        Ok(Reply::Success(StatusReport {
            current_collection: collection.map(str::to_owned),
            ..StatusReport::default()
        }))
    }

    async fn collections(&self) -> Result<Reply<CollectionList>, ApiError> {
        self.record("collections");
        Ok(Reply::Success(CollectionList::default()))
    }

    async fn delete_collection(&self, name: &str) -> Result<Reply<String>, ApiError> {
        self.record(format!("delete {name}"));
        Ok(Reply::Success("Collection deleted".to_string()))
    }

    async fn retry_failed(&self, request: &RetryRequest) -> Result<Reply<RetryReceipt>, ApiError> {
        self.record(format!("retry {}", request.collection));
        Ok(Reply::Success(RetryReceipt::default()))
    }

    async fn download(
        &self,
        tag: &str,
        collection: &str,
    ) -> Result<Reply<DownloadedFile>, ApiError> {
        self.record(format!("download {collection}/{tag}"));
        Ok(Reply::Refused("No processed data found".to_string()))
    }
}

fn spawn_engine() -> (EngineHandle, Arc<ScriptedClient>, mpsc::Receiver<EngineEvent>) {
    let client = Arc::new(ScriptedClient::default());
    let (tx, rx) = mpsc::channel();
    let handle = EngineHandle::spawn(client.clone(), Arc::new(ChannelEventSink::new(tx)))
        .expect("engine starts");
    (handle, client, rx)
}

fn next_event(rx: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    rx.recv_timeout(Duration::from_secs(5)).expect("engine event")
}

#[test]
fn status_event_carries_requested_collection() {
    let (engine, _client, rx) = spawn_engine();
    engine.submit(EngineCommand::Status {
        collection: Some("east".to_string()),
    });

    match next_event(&rx) {
        EngineEvent::Status { collection, result } => {
            assert_eq!(collection.as_deref(), Some("east"));
            let report = match result.unwrap() {
                Reply::Success(report) => report,
                other => panic!("unexpected reply {other:?}"),
            };
            assert_eq!(report.current_collection.as_deref(), Some("east"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn every_command_produces_exactly_one_event() {
    let (engine, client, rx) = spawn_engine();
    let commands = vec![
        EngineCommand::Login(LoginRequest {
            email: "a@b.co".to_string(),
            password: "secret1".to_string(),
        }),
        EngineCommand::Control(ControlKind::Stop),
        EngineCommand::Collections,
        EngineCommand::DeleteCollection {
            name: "old".to_string(),
        },
        EngineCommand::RetryFailed(RetryRequest {
            collection: "east".to_string(),
        }),
        EngineCommand::Download {
            tag: "all".to_string(),
            collection: "east".to_string(),
        },
    ];
    let count = commands.len();
    for command in commands {
        engine.submit(command);
    }

    let mut seen = Vec::new();
    for _ in 0..count {
        seen.push(next_event(&rx));
    }
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    assert!(seen.iter().any(|event| matches!(
        event,
        EngineEvent::Controlled {
            kind: ControlKind::Stop,
            result: Ok(Reply::Success(_))
        }
    )));
    assert!(seen
        .iter()
        .any(|event| matches!(event, EngineEvent::Deleted { name, .. } if name == "old")));
    assert!(seen.iter().any(|event| matches!(
        event,
        EngineEvent::Downloaded(Ok(Reply::Refused(message))) if message == "No processed data found"
    )));
    assert_eq!(client.calls.lock().unwrap().len(), count);
}
