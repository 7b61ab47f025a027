use std::path::PathBuf;

/// Requests the platform layer must carry out on behalf of `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Login {
        email: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
        role: String,
    },
    Upload {
        file: PathBuf,
        tag: String,
        collection: String,
    },
    StartProcessing {
        workers: u32,
        collection: String,
    },
    Control(ControlAction),
    FetchStatus,
    /// Status scoped to one collection; only its tags are used.
    FetchTags {
        collection: String,
    },
    FetchCollections,
    /// Ask the user before a destructive call.
    ConfirmDelete {
        collection: String,
        prompt: String,
    },
    DeleteCollection {
        collection: String,
    },
    Download {
        tag: String,
        collection: String,
    },
    RetryFailed {
        collection: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Pause,
    Resume,
    Stop,
}

impl ControlAction {
    pub fn label(self) -> &'static str {
        match self {
            ControlAction::Pause => "Pause",
            ControlAction::Resume => "Resume",
            ControlAction::Stop => "Stop",
        }
    }
}
