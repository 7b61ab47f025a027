use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// A dashboard call's answer once its JSON body was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Success(T),
    /// Body carried a non-empty `error` field.
    Refused(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub workers: u32,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryRequest {
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AuthAck {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub db_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct UploadReceipt {
    pub inserted: u64,
    pub skipped: u64,
    pub collection: String,
    pub tag: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct StartReceipt {
    pub message: String,
    pub workers: Option<u32>,
    pub collection: Option<String>,
    pub max_workers: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct StatusReport {
    pub processing_active: bool,
    pub active_workers: u32,
    pub paused: bool,
    pub stopped: bool,
    pub current_collection: Option<String>,
    pub total: u64,
    pub processed: u64,
    pub failed: u64,
    pub new: u64,
    pub processing: u64,
    pub tags: Vec<String>,
    pub current_failed_count: u64,
    pub last_processed: u64,
    pub total_processed: u64,
    pub total_failed: u64,
    pub max_workers: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CollectionList {
    #[serde(deserialize_with = "null_as_empty")]
    pub collections: Vec<String>,
    pub current_collection: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RetryReceipt {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Acknowledgement {
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Pause,
    Resume,
    Stop,
}

impl ControlKind {
    pub fn path(self) -> &'static str {
        match self {
            ControlKind::Pause => "pause",
            ControlKind::Resume => "resume",
            ControlKind::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Login(LoginRequest),
    Register(RegisterRequest),
    Upload {
        file: PathBuf,
        tag: String,
        collection: String,
    },
    Start(StartRequest),
    Control(ControlKind),
    Status {
        collection: Option<String>,
    },
    Collections,
    DeleteCollection {
        name: String,
    },
    RetryFailed(RetryRequest),
    Download {
        tag: String,
        collection: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    LoggedIn(Result<AuthAck, ApiError>),
    Registered(Result<AuthAck, ApiError>),
    Uploaded(Result<Reply<UploadReceipt>, ApiError>),
    Started(Result<Reply<StartReceipt>, ApiError>),
    Controlled {
        kind: ControlKind,
        result: Result<Reply<String>, ApiError>,
    },
    Status {
        collection: Option<String>,
        result: Result<Reply<StatusReport>, ApiError>,
    },
    Collections(Result<Reply<CollectionList>, ApiError>),
    Deleted {
        name: String,
        result: Result<Reply<String>, ApiError>,
    },
    RetriedFailed(Result<Reply<RetryReceipt>, ApiError>),
    Downloaded(Result<Reply<DownloadedFile>, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// `message` field of an error body, for calls that surface it.
    pub server_message: Option<String>,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    pub(crate) fn with_server_message(mut self, server_message: Option<String>) -> Self {
        self.server_message = server_message;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body missing or not the expected JSON.
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unreadable response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
