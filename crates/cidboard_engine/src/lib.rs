//! cidboard engine: HTTP client for the processing service and effect execution.
mod client;
mod endpoint;
mod engine;
mod filename;
mod persist;
mod types;

pub use client::{ApiClient, ClientSettings, ReqwestApiClient};
pub use engine::{execute, ChannelEventSink, EngineHandle, EventSink};
pub use filename::download_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    ApiError, AuthAck, CollectionList, ControlKind, DownloadedFile, EngineCommand, EngineEvent,
    FailureKind, LoginRequest, RegisterRequest, Reply, RetryReceipt, RetryRequest, StartReceipt,
    StartRequest, StatusReport, UploadReceipt,
};
