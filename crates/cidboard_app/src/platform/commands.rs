//! Line commands typed at the console prompt.
//!
//! Each command stands for one control on the page: setting an input,
//! toggling a switch, or pressing a button.

use std::path::PathBuf;

use cidboard_core::{AuthField, AuthMsg, ControlAction, DashboardMsg, Msg, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Msg(Msg),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
pages:      go /login | go /dashboard | show | help | quit
auth:       email <v> | password <v> | confirm <v> | name <v> | role <v>
            reveal | reveal-confirm | switch | submit
upload:     file <path> | tag <v> | collection <v> | upload
processing: workers <1-10> | process <collection> | start | pause | resume | stop | retry
download:   download-collection <name> | download-tag <tag> | download
other:      delete <collection> | refresh";

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    // Passwords keep their spaces; only the separator after the word goes.
    let (word, raw) = match line.trim_start().split_once(' ') {
        Some((word, raw)) => (word, raw),
        None => (line.trim(), ""),
    };
    let rest = raw.trim();

    let msg = match word {
        "" | "show" => return Ok(Command::Show),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "go" => match Route::from_path(rest) {
            Some(route) => Msg::Navigate(route),
            None => return Err(format!("unknown page: {rest}")),
        },

        "email" => field(AuthField::Email, rest),
        "password" => field(AuthField::Password, raw),
        "confirm" => field(AuthField::ConfirmPassword, raw),
        "name" => field(AuthField::FullName, rest),
        "role" => field(AuthField::Role, rest),
        "reveal" => Msg::Auth(AuthMsg::TogglePasswordVisibility),
        "reveal-confirm" => Msg::Auth(AuthMsg::ToggleConfirmVisibility),
        "switch" => Msg::Auth(AuthMsg::ModeToggled),
        "submit" => Msg::Auth(AuthMsg::Submitted),

        "file" => dashboard(DashboardMsg::FileSelected(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        )),
        "tag" => dashboard(DashboardMsg::TagInputChanged(rest.to_string())),
        "collection" => dashboard(DashboardMsg::CollectionInputChanged(rest.to_string())),
        "upload" => dashboard(DashboardMsg::UploadClicked),
        "workers" => {
            let workers = rest
                .parse::<u32>()
                .map_err(|_| format!("workers expects a number, got {rest:?}"))?;
            dashboard(DashboardMsg::WorkersChanged(workers))
        }
        "process" => dashboard(DashboardMsg::ProcessingCollectionSelected(rest.to_string())),
        "start" => dashboard(DashboardMsg::StartClicked),
        "pause" => dashboard(DashboardMsg::ControlClicked(ControlAction::Pause)),
        "resume" => dashboard(DashboardMsg::ControlClicked(ControlAction::Resume)),
        "stop" => dashboard(DashboardMsg::ControlClicked(ControlAction::Stop)),
        "retry" => dashboard(DashboardMsg::RetryFailedClicked),
        "download-collection" => {
            dashboard(DashboardMsg::DownloadCollectionSelected(rest.to_string()))
        }
        "download-tag" => dashboard(DashboardMsg::DownloadTagSelected(rest.to_string())),
        "download" => dashboard(DashboardMsg::DownloadClicked),
        "delete" => {
            if rest.is_empty() {
                return Err("delete expects a collection name".to_string());
            }
            dashboard(DashboardMsg::DeleteCollectionClicked(rest.to_string()))
        }
        "refresh" => dashboard(DashboardMsg::RefreshClicked),
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Command::Msg(msg))
}

/// `y`/`yes` confirms; anything else cancels, like dismissing a dialog.
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn field(field: AuthField, value: &str) -> Msg {
    Msg::Auth(AuthMsg::FieldChanged {
        field,
        value: value.to_string(),
    })
}

fn dashboard(msg: DashboardMsg) -> Msg {
    Msg::Dashboard(msg)
}
