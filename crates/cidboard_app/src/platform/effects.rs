use std::sync::{mpsc, Arc};

use board_logging::{board_info, board_warn};
use cidboard_core::{
    AuthFailure, AuthMsg, CallResult, ControlAction, DashboardMsg, DownloadSummary, Effect, Msg,
    StatusSnapshot, UploadSummary,
};
use cidboard_engine::{
    ApiClient, ApiError, ControlKind, EngineCommand, EngineEvent, EngineHandle, EventSink,
    FailureKind, LoginRequest, RegisterRequest, RetryRequest, StartRequest, StatusReport,
};

use super::app::AppEvent;

/// Forwards engine completions into the console's event queue.
struct ForwardingSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for ForwardingSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Engine(event));
    }
}

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(client: Arc<dyn ApiClient>, tx: mpsc::Sender<AppEvent>) -> std::io::Result<Self> {
        let engine = EngineHandle::spawn(client, Arc::new(ForwardingSink { tx }))?;
        Ok(Self { engine })
    }

    /// Submits every effect the engine can carry out and hands back the
    /// confirmation the user must answer first, if any.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Option<(String, String)> {
        let mut confirm = None;
        for effect in effects {
            match effect {
                Effect::ConfirmDelete { collection, prompt } => {
                    confirm = Some((collection, prompt));
                }
                other => {
                    if let Some(command) = to_command(other) {
                        self.engine.submit(command);
                    }
                }
            }
        }
        confirm
    }
}

pub(crate) fn to_command(effect: Effect) -> Option<EngineCommand> {
    let command = match effect {
        Effect::Login { email, password } => {
            board_info!("Login email={}", email);
            EngineCommand::Login(LoginRequest { email, password })
        }
        Effect::Register {
            username,
            email,
            password,
            role,
        } => {
            board_info!("Register email={} role={}", email, role);
            EngineCommand::Register(RegisterRequest {
                username,
                email,
                password,
                role,
            })
        }
        Effect::Upload {
            file,
            tag,
            collection,
        } => EngineCommand::Upload {
            file,
            tag,
            collection,
        },
        Effect::StartProcessing {
            workers,
            collection,
        } => EngineCommand::Start(StartRequest {
            workers,
            collection,
        }),
        Effect::Control(action) => EngineCommand::Control(map_control(action)),
        Effect::FetchStatus => EngineCommand::Status { collection: None },
        Effect::FetchTags { collection } => EngineCommand::Status {
            collection: Some(collection),
        },
        Effect::FetchCollections => EngineCommand::Collections,
        Effect::DeleteCollection { collection } => {
            EngineCommand::DeleteCollection { name: collection }
        }
        Effect::Download { tag, collection } => EngineCommand::Download { tag, collection },
        Effect::RetryFailed { collection } => {
            EngineCommand::RetryFailed(RetryRequest { collection })
        }
        Effect::ConfirmDelete { .. } => return None,
    };
    Some(command)
}

pub(crate) fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::LoggedIn(result) => {
            Msg::Auth(AuthMsg::LoginFinished(auth_result("Login", result)))
        }
        EngineEvent::Registered(result) => {
            Msg::Auth(AuthMsg::RegisterFinished(auth_result("Register", result)))
        }
        EngineEvent::Uploaded(result) => Msg::Dashboard(DashboardMsg::UploadFinished(
            call_result(result, |receipt| UploadSummary {
                inserted: receipt.inserted,
                skipped: receipt.skipped,
                collection: receipt.collection,
                tag: receipt.tag,
            }),
        )),
        EngineEvent::Started(result) => Msg::Dashboard(DashboardMsg::StartFinished(call_result(
            result,
            |receipt| receipt.message,
        ))),
        EngineEvent::Controlled { kind, result } => {
            Msg::Dashboard(DashboardMsg::ControlFinished {
                action: map_kind(kind),
                result: call_result(result, |message| message),
            })
        }
        EngineEvent::Status {
            collection: None,
            result,
        } => Msg::Dashboard(DashboardMsg::StatusLoaded(call_result(result, snapshot))),
        EngineEvent::Status {
            collection: Some(collection),
            result,
        } => Msg::Dashboard(DashboardMsg::TagsLoaded {
            collection,
            result: call_result(result, |report| report.tags),
        }),
        EngineEvent::Collections(result) => Msg::Dashboard(DashboardMsg::CollectionsLoaded(
            call_result(result, |list| list.collections),
        )),
        EngineEvent::Deleted { name, result } => Msg::Dashboard(DashboardMsg::DeleteFinished {
            collection: name,
            result: call_result(result, |message| message),
        }),
        EngineEvent::RetriedFailed(result) => Msg::Dashboard(DashboardMsg::RetryFailedFinished(
            call_result(result, |receipt| receipt.message),
        )),
        EngineEvent::Downloaded(result) => Msg::Dashboard(DashboardMsg::DownloadFinished(
            call_result(result, |file| {
                board_info!("export written to {:?}", file.path);
                DownloadSummary {
                    file_name: file.file_name,
                    bytes: file.bytes,
                }
            }),
        )),
    }
}

fn snapshot(report: StatusReport) -> StatusSnapshot {
    StatusSnapshot {
        processing_active: report.processing_active,
        active_workers: report.active_workers,
        paused: report.paused,
        stopped: report.stopped,
        current_collection: report.current_collection.unwrap_or_default(),
        total: report.total,
        processed: report.processed,
        failed: report.failed,
        new: report.new,
        processing: report.processing,
        tags: report.tags,
        current_failed_count: report.current_failed_count,
        last_processed: report.last_processed,
        total_processed: report.total_processed,
        total_failed: report.total_failed,
        max_workers: report.max_workers,
    }
}

fn call_result<T, U>(
    result: Result<cidboard_engine::Reply<T>, ApiError>,
    f: impl FnOnce(T) -> U,
) -> CallResult<U> {
    match result {
        Ok(cidboard_engine::Reply::Success(value)) => {
            Ok(cidboard_core::Reply::Success(f(value)))
        }
        Ok(cidboard_engine::Reply::Refused(error)) => Ok(cidboard_core::Reply::Refused(error)),
        Err(err) => {
            board_warn!("request failed ({}): {}", err.kind, err.message);
            Err(err.message)
        }
    }
}

/// Only a status-code failure carries a message worth showing; transport
/// failures fall back to the generic text.
fn auth_result<T>(label: &str, result: Result<T, ApiError>) -> Result<(), AuthFailure> {
    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            board_warn!("{} failed ({}): {}", label, err.kind, err.message);
            let message = match err.kind {
                FailureKind::HttpStatus(_) => err.server_message,
                _ => None,
            };
            Err(AuthFailure { message })
        }
    }
}

fn map_control(action: ControlAction) -> ControlKind {
    match action {
        ControlAction::Pause => ControlKind::Pause,
        ControlAction::Resume => ControlKind::Resume,
        ControlAction::Stop => ControlKind::Stop,
    }
}

fn map_kind(kind: ControlKind) -> ControlAction {
    match kind {
        ControlKind::Pause => ControlAction::Pause,
        ControlKind::Resume => ControlAction::Resume,
        ControlKind::Stop => ControlAction::Stop,
    }
}
