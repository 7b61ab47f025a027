use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use board_logging::{board_debug, board_info};
use cidboard_core::{update, AppState, AuthField, AuthMsg, DashboardMsg, Msg, Route};
use cidboard_engine::{EngineEvent, ReqwestApiClient};

use super::commands::{self, Command};
use super::config::AppConfig;
use super::effects::{self, EffectRunner};
use super::ui;

/// Everything the console loop reacts to, funnelled through one channel.
pub enum AppEvent {
    Input(String),
    InputClosed,
    Engine(EngineEvent),
}

pub fn run_app(config: &AppConfig, start: Route) -> anyhow::Result<()> {
    let client = ReqwestApiClient::new(config.client_settings())
        .with_context(|| format!("invalid base url {:?}", config.base_url))?;
    board_info!("cidboard talking to {}", client.base_url());

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(Arc::new(client), tx.clone())
        .context("could not start the request engine")?;
    spawn_stdin_reader(tx)?;

    let mut console = Console::new(runner);
    console.print(commands::HELP);
    console.render();
    if start != Route::Login {
        console.dispatch(Msg::Navigate(start));
    }

    while let Ok(event) = rx.recv() {
        let keep_going = match event {
            AppEvent::Input(line) => console.handle_line(&line),
            AppEvent::Engine(event) => {
                console.dispatch(effects::to_msg(event));
                true
            }
            AppEvent::InputClosed => false,
        };
        if !keep_going {
            break;
        }
    }
    board_info!("console closed");
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("cidboard-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(AppEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(AppEvent::InputClosed);
        })?;
    Ok(())
}

struct Console {
    state: AppState,
    runner: EffectRunner,
    /// Collection awaiting a yes/no answer.
    pending_confirm: Option<String>,
}

impl Console {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            pending_confirm: None,
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        if let Some(collection) = self.pending_confirm.take() {
            let msg = if commands::is_confirmation(line) {
                DashboardMsg::DeleteConfirmed(collection)
            } else {
                DashboardMsg::DeleteCancelled
            };
            self.dispatch(Msg::Dashboard(msg));
            return true;
        }

        match commands::parse(line) {
            Ok(Command::Msg(msg)) => self.dispatch(msg),
            Ok(Command::Show) => self.render(),
            Ok(Command::Help) => self.print(commands::HELP),
            Ok(Command::Quit) => return false,
            Err(reason) => self.print(&reason),
        }
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        board_debug!("dispatch {:?}", redact(&msg));
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        let was_dirty = self.state.consume_dirty();

        let confirm = self.runner.enqueue(effects);
        if was_dirty {
            self.render();
        }
        if let Some((collection, prompt)) = confirm {
            self.pending_confirm = Some(collection);
            self.print(&format!("{prompt} [y/N]"));
        }
    }

    fn render(&self) {
        self.print(&ui::render::render(&self.state.view()));
    }

    fn print(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.flush();
    }
}

/// Keeps typed passwords out of the log file.
fn redact(msg: &Msg) -> String {
    match msg {
        Msg::Auth(AuthMsg::FieldChanged {
            field: field @ (AuthField::Password | AuthField::ConfirmPassword),
            ..
        }) => format!("FieldChanged({field:?})"),
        other => format!("{other:?}"),
    }
}
