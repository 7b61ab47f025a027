use std::path::Path;

use crate::auth::AuthState;
use crate::dashboard::DashboardState;
use crate::{AuthErrors, AuthMode, ResponseEntry, Route, StatusSnapshot, DEFAULT_DOWNLOAD_TAG};

const MASK_CHAR: char = '•';

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub route: Route,
    pub auth: AuthView,
    pub dashboard: DashboardView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthView {
    pub mode: AuthMode,
    pub title: &'static str,
    pub email: String,
    /// Only shown on the register form.
    pub full_name: Option<String>,
    pub role: String,
    pub password: PasswordView,
    /// Only shown on the register form.
    pub confirm_password: Option<PasswordView>,
    pub errors: AuthErrors,
    pub message: Option<String>,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub switch_prompt: &'static str,
    pub switch_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasswordView {
    pub masked: bool,
    /// The value as it should be drawn: bullets while masked.
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardView {
    pub tag_input: String,
    pub collection_input: String,
    pub selected_file: Option<String>,
    pub workers: u32,
    pub processing_collection: String,
    pub download_collection: String,
    pub download_tag: String,
    /// `"all"` followed by the tags of the last status snapshot.
    pub tag_options: Vec<String>,
    pub controls: ControlsView,
    pub status: StatusPanelView,
    pub collections: Vec<CollectionRow>,
    pub responses: Vec<ResponseEntry>,
    pub pending_delete: Option<String>,
}

/// Enabled flags, derived only from the last fetched snapshot and in-flight
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsView {
    pub upload_enabled: bool,
    pub start_enabled: bool,
    pub pause_enabled: bool,
    pub resume_enabled: bool,
    pub stop_enabled: bool,
    pub download_enabled: bool,
    pub refresh_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPanelView {
    Error(String),
    Snapshot(StatusSnapshot),
}

impl Default for StatusPanelView {
    fn default() -> Self {
        StatusPanelView::Snapshot(StatusSnapshot::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRow {
    pub name: String,
    pub is_current: bool,
}

pub(crate) fn auth_view(state: &AuthState) -> AuthView {
    let register = state.mode == AuthMode::Register;
    AuthView {
        mode: state.mode,
        title: if register { "Register" } else { "Login" },
        email: state.form.email.clone(),
        full_name: register.then(|| state.form.full_name.clone()),
        role: state.form.role.clone(),
        password: password_view(&state.form.password, state.show_password),
        confirm_password: register
            .then(|| password_view(&state.form.confirm_password, state.show_confirm_password)),
        errors: state.errors.clone(),
        message: state.message.clone(),
        submit_label: match (state.loading, register) {
            (true, _) => "Loading...",
            (false, true) => "Register",
            (false, false) => "Login",
        },
        submit_enabled: !state.loading,
        switch_prompt: if register {
            "Already have an account?"
        } else {
            "Don't have an account?"
        },
        switch_label: if register { "Login" } else { "Register" },
    }
}

fn password_view(value: &str, revealed: bool) -> PasswordView {
    PasswordView {
        masked: !revealed,
        display: if revealed {
            value.to_string()
        } else {
            std::iter::repeat(MASK_CHAR)
                .take(value.chars().count())
                .collect()
        },
    }
}

pub(crate) fn dashboard_view(state: &DashboardState) -> DashboardView {
    let status = &state.status;
    let mut tag_options = Vec::with_capacity(status.tags.len() + 1);
    tag_options.push(DEFAULT_DOWNLOAD_TAG.to_string());
    tag_options.extend(
        status
            .tags
            .iter()
            .filter(|tag| tag.as_str() != DEFAULT_DOWNLOAD_TAG)
            .cloned(),
    );

    DashboardView {
        tag_input: state.tag_input.clone(),
        collection_input: state.collection_input.clone(),
        selected_file: state.selected_file.as_deref().map(display_file_name),
        workers: state.workers,
        processing_collection: state.processing_collection.clone(),
        download_collection: state.download_collection.clone(),
        download_tag: state.download_tag.clone(),
        tag_options,
        controls: ControlsView {
            upload_enabled: !state.loading.upload,
            start_enabled: !state.loading.process,
            pause_enabled: status.can_pause(),
            resume_enabled: status.can_resume(),
            stop_enabled: status.can_stop(),
            download_enabled: !state.download_collection.is_empty(),
            refresh_enabled: !state.loading.status,
        },
        status: match &state.status_error {
            Some(error) => StatusPanelView::Error(error.clone()),
            None => StatusPanelView::Snapshot(status.clone()),
        },
        collections: state
            .collections
            .iter()
            .map(|name| CollectionRow {
                name: name.clone(),
                is_current: *name == status.current_collection,
            })
            .collect(),
        responses: state.responses.clone(),
        pending_delete: state.pending_delete.clone(),
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
