use std::path::PathBuf;

use board_logging::{board_debug, board_warn};
use chrono::{DateTime, Utc};

use crate::{CallResult, ControlAction, DashboardMsg, Effect, Reply};

pub const MIN_WORKERS: u32 = 1;
pub const MAX_WORKERS: u32 = 10;
pub const DEFAULT_DOWNLOAD_TAG: &str = "all";

/// Mirror of the backend's `/status` payload. Held verbatim; the last
/// response wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub processing_active: bool,
    pub active_workers: u32,
    pub paused: bool,
    pub stopped: bool,
    pub current_collection: String,
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

impl StatusSnapshot {
    pub fn can_pause(&self) -> bool {
        self.processing_active && !self.paused
    }

    pub fn can_resume(&self) -> bool {
        self.processing_active && self.paused
    }

    pub fn can_stop(&self) -> bool {
        self.processing_active
    }

    pub fn allows(&self, action: ControlAction) -> bool {
        match action {
            ControlAction::Pause => self.can_pause(),
            ControlAction::Resume => self.can_resume(),
            ControlAction::Stop => self.can_stop(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEntry {
    pub message: String,
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LoadingFlags {
    pub(crate) upload: bool,
    pub(crate) process: bool,
    pub(crate) status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DashboardState {
    pub(crate) tag_input: String,
    pub(crate) collection_input: String,
    pub(crate) selected_file: Option<PathBuf>,
    pub(crate) workers: u32,
    pub(crate) processing_collection: String,
    pub(crate) download_collection: String,
    pub(crate) download_tag: String,
    pub(crate) status: StatusSnapshot,
    pub(crate) status_error: Option<String>,
    pub(crate) collections: Vec<String>,
    pub(crate) responses: Vec<ResponseEntry>,
    pub(crate) loading: LoadingFlags,
    pub(crate) pending_delete: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            tag_input: String::new(),
            collection_input: String::new(),
            selected_file: None,
            workers: MIN_WORKERS,
            processing_collection: String::new(),
            download_collection: String::new(),
            download_tag: DEFAULT_DOWNLOAD_TAG.to_string(),
            status: StatusSnapshot::default(),
            status_error: None,
            collections: Vec::new(),
            responses: Vec::new(),
            loading: LoadingFlags::default(),
            pending_delete: None,
        }
    }
}

impl DashboardState {
    /// Requests issued when the dashboard is first shown.
    pub(crate) fn mount(&mut self) -> Vec<Effect> {
        self.loading.status = true;
        vec![Effect::FetchStatus, Effect::FetchCollections]
    }

    /// Returns `None` when the message was ignored.
    pub(crate) fn handle(&mut self, msg: DashboardMsg) -> Option<Vec<Effect>> {
        let effects = match msg {
            DashboardMsg::TagInputChanged(value) => {
                self.tag_input = value;
                Vec::new()
            }
            DashboardMsg::CollectionInputChanged(value) => {
                self.collection_input = value;
                Vec::new()
            }
            DashboardMsg::FileSelected(file) => {
                self.selected_file = file;
                Vec::new()
            }
            DashboardMsg::WorkersChanged(workers) => {
                self.workers = workers.clamp(MIN_WORKERS, MAX_WORKERS);
                Vec::new()
            }
            DashboardMsg::ProcessingCollectionSelected(name) => {
                self.processing_collection = name;
                Vec::new()
            }
            DashboardMsg::DownloadCollectionSelected(name) => {
                self.download_collection = name;
                self.tags_for_download_collection()
            }
            DashboardMsg::DownloadTagSelected(tag) => {
                self.download_tag = tag;
                Vec::new()
            }

            DashboardMsg::UploadClicked => return self.upload(),
            DashboardMsg::StartClicked => return self.start(),
            DashboardMsg::ControlClicked(action) => {
                if !self.status.allows(action) {
                    board_debug!("{} ignored: control disabled by last status", action.label());
                    return None;
                }
                self.responses.clear();
                vec![Effect::Control(action)]
            }
            DashboardMsg::DownloadClicked => self.download(),
            DashboardMsg::RetryFailedClicked => {
                self.responses.clear();
                if self.processing_collection.is_empty() {
                    self.push_error("Please select a collection to retry");
                    Vec::new()
                } else {
                    vec![Effect::RetryFailed {
                        collection: self.processing_collection.clone(),
                    }]
                }
            }
            DashboardMsg::DeleteCollectionClicked(collection) => {
                let prompt = format!(
                    "Are you sure you want to delete collection \"{collection}\"? This cannot be undone."
                );
                self.pending_delete = Some(collection.clone());
                vec![Effect::ConfirmDelete { collection, prompt }]
            }
            DashboardMsg::DeleteConfirmed(collection) => {
                if self.pending_delete.as_deref() != Some(collection.as_str()) {
                    return None;
                }
                self.pending_delete = None;
                vec![Effect::DeleteCollection { collection }]
            }
            DashboardMsg::DeleteCancelled => {
                self.pending_delete.take()?;
                Vec::new()
            }
            DashboardMsg::RefreshClicked => {
                if self.loading.status {
                    return None;
                }
                self.loading.status = true;
                vec![Effect::FetchStatus]
            }

            DashboardMsg::UploadFinished(result) => {
                self.loading.upload = false;
                match result {
                    Ok(Reply::Success(summary)) => {
                        self.push_info(format!(
                            "Success! Inserted {} records, skipped {} duplicates in \"{}\" with tag \"{}\"",
                            summary.inserted, summary.skipped, summary.collection, summary.tag
                        ));
                        self.refresh_collections_and_status()
                    }
                    Ok(Reply::Refused(error)) => {
                        self.push_error(format!("Error: {error}"));
                        Vec::new()
                    }
                    Err(reason) => {
                        self.push_error(format!("Upload failed: {reason}"));
                        Vec::new()
                    }
                }
            }
            DashboardMsg::StartFinished(result) => {
                self.loading.process = false;
                self.acknowledge("Start", result, false)
            }
            DashboardMsg::ControlFinished { action, result } => {
                self.acknowledge(action.label(), result, false)
            }
            DashboardMsg::RetryFailedFinished(result) => self.acknowledge("Retry", result, false),
            DashboardMsg::DeleteFinished { collection, result } => {
                board_debug!("delete of {collection} finished");
                self.acknowledge("Delete", result, true)
            }
            DashboardMsg::DownloadFinished(result) => {
                match result {
                    Ok(Reply::Success(summary)) => self.push_info(format!(
                        "Downloaded {} ({} bytes)",
                        summary.file_name, summary.bytes
                    )),
                    Ok(Reply::Refused(error)) => self.push_error(format!("Error: {error}")),
                    Err(reason) => self.push_error(format!("Download failed: {reason}")),
                }
                Vec::new()
            }
            DashboardMsg::StatusLoaded(result) => self.status_loaded(result),
            DashboardMsg::TagsLoaded { collection, result } => match result {
                Ok(Reply::Success(tags)) => {
                    self.status.tags = tags;
                    Vec::new()
                }
                Ok(Reply::Refused(error)) => {
                    board_warn!("Failed to update tags for {}: {}", collection, error);
                    return None;
                }
                Err(reason) => {
                    board_warn!("Failed to update tags for {}: {}", collection, reason);
                    return None;
                }
            },
            DashboardMsg::CollectionsLoaded(result) => match result {
                Ok(Reply::Success(collections)) => {
                    self.collections = collections;
                    let current = self.status.current_collection.clone();
                    self.auto_select(&current)
                }
                Ok(Reply::Refused(error)) => {
                    board_warn!("Collections refused: {}", error);
                    self.collections.clear();
                    Vec::new()
                }
                Err(reason) => {
                    board_warn!("Failed to fetch collections: {}", reason);
                    return None;
                }
            },
        };
        Some(effects)
    }

    fn upload(&mut self) -> Option<Vec<Effect>> {
        if self.loading.upload {
            return None;
        }
        self.responses.clear();

        let Some(file) = self.selected_file.clone() else {
            self.push_error("Please select a file to upload");
            return Some(Vec::new());
        };
        let tag = self.tag_input.trim().to_string();
        if tag.is_empty() {
            self.push_error("Please enter a tag for this batch");
            return Some(Vec::new());
        }
        let collection = self.collection_input.trim().to_string();
        if collection.is_empty() {
            self.push_error("Please enter a collection name");
            return Some(Vec::new());
        }

        let effect = Effect::Upload {
            file,
            tag,
            collection,
        };
        self.loading.upload = true;
        Some(vec![effect])
    }

    fn start(&mut self) -> Option<Vec<Effect>> {
        if self.loading.process {
            return None;
        }
        self.responses.clear();
        if self.processing_collection.is_empty() {
            self.push_error("Please select a collection to process");
            return Some(Vec::new());
        }
        self.loading.process = true;
        Some(vec![Effect::StartProcessing {
            workers: self.workers,
            collection: self.processing_collection.clone(),
        }])
    }

    fn download(&mut self) -> Vec<Effect> {
        if self.download_collection.is_empty() {
            self.push_error("Please select a collection to download");
            return Vec::new();
        }
        if self.download_tag.is_empty() {
            self.push_error("Please select a tag to download");
            return Vec::new();
        }
        vec![Effect::Download {
            tag: self.download_tag.clone(),
            collection: self.download_collection.clone(),
        }]
    }

    /// Shared handling for calls that answer with a plain `message`.
    fn acknowledge(
        &mut self,
        label: &str,
        result: CallResult<String>,
        refresh_collections: bool,
    ) -> Vec<Effect> {
        match result {
            Ok(Reply::Success(message)) => {
                self.push_info(message);
                if refresh_collections {
                    self.refresh_collections_and_status()
                } else {
                    self.refresh_status()
                }
            }
            Ok(Reply::Refused(error)) => {
                self.push_error(format!("Error: {error}"));
                Vec::new()
            }
            Err(reason) => {
                self.push_error(format!("{label} failed: {reason}"));
                Vec::new()
            }
        }
    }

    fn status_loaded(&mut self, result: CallResult<StatusSnapshot>) -> Vec<Effect> {
        self.loading.status = false;
        match result {
            Ok(Reply::Success(snapshot)) => {
                let current = snapshot.current_collection.clone();
                self.status = snapshot;
                self.status_error = None;
                self.auto_select(&current)
            }
            Ok(Reply::Refused(error)) => {
                self.status_error = Some(error);
                Vec::new()
            }
            Err(reason) => {
                self.status_error = Some(format!("Failed to get status: {reason}"));
                Vec::new()
            }
        }
    }

    /// One-time default: fill still-empty selectors with the backend's current
    /// collection, provided it is a known collection.
    fn auto_select(&mut self, current: &str) -> Vec<Effect> {
        if self.collections.is_empty()
            || current.is_empty()
            || !self.collections.iter().any(|name| name == current)
        {
            return Vec::new();
        }
        if self.processing_collection.is_empty() {
            self.processing_collection = current.to_string();
        }
        if self.download_collection.is_empty() {
            self.download_collection = current.to_string();
            return self.tags_for_download_collection();
        }
        Vec::new()
    }

    fn tags_for_download_collection(&self) -> Vec<Effect> {
        if self.download_collection.is_empty() {
            Vec::new()
        } else {
            vec![Effect::FetchTags {
                collection: self.download_collection.clone(),
            }]
        }
    }

    fn refresh_status(&mut self) -> Vec<Effect> {
        self.loading.status = true;
        vec![Effect::FetchStatus]
    }

    fn refresh_collections_and_status(&mut self) -> Vec<Effect> {
        self.loading.status = true;
        vec![Effect::FetchCollections, Effect::FetchStatus]
    }

    fn push_info(&mut self, message: impl Into<String>) {
        self.push(message.into(), false);
    }

    fn push_error(&mut self, message: impl Into<String>) {
        self.push(message.into(), true);
    }

    fn push(&mut self, message: String, is_error: bool) {
        self.responses.push(ResponseEntry {
            message,
            is_error,
            timestamp: Utc::now(),
        });
    }
}
