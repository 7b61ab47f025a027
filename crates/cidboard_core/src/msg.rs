use std::path::PathBuf;

use crate::{AuthField, ControlAction, Route, StatusSnapshot};

/// What a dashboard call produced once the body was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Success(T),
    /// The backend answered with an `error` field.
    Refused(String),
}

/// `Err` holds the transport failure reason.
pub type CallResult<T> = Result<Reply<T>, String>;

/// Auth calls fail with the backend's `message`, when it sent one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthFailure {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub inserted: u64,
    pub skipped: u64,
    pub collection: String,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub file_name: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Route change requested by the user or by a finished action.
    Navigate(Route),
    Auth(AuthMsg),
    Dashboard(DashboardMsg),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMsg {
    FieldChanged { field: AuthField, value: String },
    TogglePasswordVisibility,
    ToggleConfirmVisibility,
    /// Switch between the login and register forms.
    ModeToggled,
    Submitted,
    LoginFinished(Result<(), AuthFailure>),
    RegisterFinished(Result<(), AuthFailure>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardMsg {
    TagInputChanged(String),
    CollectionInputChanged(String),
    FileSelected(Option<PathBuf>),
    WorkersChanged(u32),
    ProcessingCollectionSelected(String),
    DownloadCollectionSelected(String),
    DownloadTagSelected(String),

    UploadClicked,
    StartClicked,
    ControlClicked(ControlAction),
    DownloadClicked,
    RetryFailedClicked,
    DeleteCollectionClicked(String),
    DeleteConfirmed(String),
    DeleteCancelled,
    RefreshClicked,

    UploadFinished(CallResult<UploadSummary>),
    StartFinished(CallResult<String>),
    ControlFinished {
        action: ControlAction,
        result: CallResult<String>,
    },
    StatusLoaded(CallResult<StatusSnapshot>),
    TagsLoaded {
        collection: String,
        result: CallResult<Vec<String>>,
    },
    CollectionsLoaded(CallResult<Vec<String>>),
    DeleteFinished {
        collection: String,
        result: CallResult<String>,
    },
    DownloadFinished(CallResult<DownloadSummary>),
    RetryFailedFinished(CallResult<String>),
}
