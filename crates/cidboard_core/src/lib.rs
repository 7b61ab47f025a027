//! cidboard core: pure state machine and view-model helpers.
mod auth;
mod dashboard;
mod effect;
mod msg;
mod route;
mod state;
mod update;
mod validation;
mod view_model;

pub use auth::{AuthErrors, AuthField, AuthForm, AuthMode, DEFAULT_ROLE};
pub use dashboard::{
    ResponseEntry, StatusSnapshot, DEFAULT_DOWNLOAD_TAG, MAX_WORKERS, MIN_WORKERS,
};
pub use effect::{ControlAction, Effect};
pub use msg::{
    AuthFailure, AuthMsg, CallResult, DashboardMsg, DownloadSummary, Msg, Reply, UploadSummary,
};
pub use route::Route;
pub use state::AppState;
pub use update::update;
pub use validation::{validate_email, MIN_PASSWORD_LEN};
pub use view_model::{
    AppViewModel, AuthView, CollectionRow, ControlsView, DashboardView, PasswordView,
    StatusPanelView,
};
