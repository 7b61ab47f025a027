use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use board_logging::{board_debug, board_warn};

use crate::client::ApiClient;
use crate::{EngineCommand, EngineEvent};

/// Where finished calls are reported. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            board_debug!("event receiver gone; dropping engine event");
        }
    }
}

/// Runs commands on a background tokio runtime. Each command is its own task,
/// so a slow download never holds up a status refresh.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn spawn(client: Arc<dyn ApiClient>, sink: Arc<dyn EventSink>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("cidboard-engine")
            .build()?;

        thread::Builder::new()
            .name("cidboard-engine-loop".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let client = client.clone();
                    let sink = sink.clone();
                    runtime.spawn(async move {
                        let event = execute(client.as_ref(), command).await;
                        sink.emit(event);
                    });
                }
                board_debug!("engine command channel closed");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn submit(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            board_warn!("engine thread is gone; command dropped");
        }
    }
}

/// Runs one command to completion and wraps its outcome.
pub async fn execute(client: &dyn ApiClient, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::Login(request) => EngineEvent::LoggedIn(client.login(&request).await),
        EngineCommand::Register(request) => {
            EngineEvent::Registered(client.register(&request).await)
        }
        EngineCommand::Upload {
            file,
            tag,
            collection,
        } => EngineEvent::Uploaded(client.upload(&file, &tag, &collection).await),
        EngineCommand::Start(request) => EngineEvent::Started(client.start(&request).await),
        EngineCommand::Control(kind) => EngineEvent::Controlled {
            kind,
            result: client.control(kind).await,
        },
        EngineCommand::Status { collection } => {
            let result = client.status(collection.as_deref()).await;
            EngineEvent::Status { collection, result }
        }
        EngineCommand::Collections => EngineEvent::Collections(client.collections().await),
        EngineCommand::DeleteCollection { name } => {
            let result = client.delete_collection(&name).await;
            EngineEvent::Deleted { name, result }
        }
        EngineCommand::RetryFailed(request) => {
            EngineEvent::RetriedFailed(client.retry_failed(&request).await)
        }
        EngineCommand::Download { tag, collection } => {
            EngineEvent::Downloaded(client.download(&tag, &collection).await)
        }
    }
}
