use board_logging::board_debug;

use crate::validation::validate_form;
use crate::{AuthFailure, AuthMsg, Effect, Route};

pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    ConfirmPassword,
    FullName,
    Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub role: String,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            full_name: String::new(),
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

/// Field-scoped validation messages. `None` means the field is fine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthErrors {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub full_name: Option<String>,
}

impl AuthErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
            && self.full_name.is_none()
    }

    fn clear(&mut self, field: AuthField) {
        match field {
            AuthField::Email => self.email = None,
            AuthField::Password => self.password = None,
            AuthField::ConfirmPassword => self.confirm_password = None,
            AuthField::FullName => self.full_name = None,
            AuthField::Role => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct AuthState {
    pub(crate) mode: AuthMode,
    pub(crate) form: AuthForm,
    pub(crate) errors: AuthErrors,
    pub(crate) show_password: bool,
    pub(crate) show_confirm_password: bool,
    pub(crate) loading: bool,
    pub(crate) message: Option<String>,
}

/// Result of a handled auth message.
pub(crate) struct AuthStep {
    pub(crate) effects: Vec<Effect>,
    pub(crate) navigate_to: Option<Route>,
}

impl AuthStep {
    fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            navigate_to: None,
        }
    }

    fn navigate(route: Route) -> Self {
        Self {
            effects: Vec::new(),
            navigate_to: Some(route),
        }
    }
}

const FALLBACK_FAILURE: &str = "Something went wrong";

impl AuthState {
    /// Returns `None` when the message was ignored.
    pub(crate) fn handle(&mut self, msg: AuthMsg) -> Option<AuthStep> {
        match msg {
            AuthMsg::FieldChanged { field, value } => {
                let slot = match field {
                    AuthField::Email => &mut self.form.email,
                    AuthField::Password => &mut self.form.password,
                    AuthField::ConfirmPassword => &mut self.form.confirm_password,
                    AuthField::FullName => &mut self.form.full_name,
                    AuthField::Role => &mut self.form.role,
                };
                *slot = value;
                self.errors.clear(field);
                Some(AuthStep::effects(Vec::new()))
            }
            AuthMsg::TogglePasswordVisibility => {
                self.show_password = !self.show_password;
                Some(AuthStep::effects(Vec::new()))
            }
            AuthMsg::ToggleConfirmVisibility => {
                self.show_confirm_password = !self.show_confirm_password;
                Some(AuthStep::effects(Vec::new()))
            }
            AuthMsg::ModeToggled => {
                self.mode = match self.mode {
                    AuthMode::Login => AuthMode::Register,
                    AuthMode::Register => AuthMode::Login,
                };
                self.errors = AuthErrors::default();
                self.form = AuthForm::default();
                self.message = None;
                Some(AuthStep::effects(Vec::new()))
            }
            AuthMsg::Submitted => self.submit(),
            AuthMsg::LoginFinished(result) => {
                self.loading = false;
                match result {
                    Ok(()) => {
                        self.message = Some("Login successful".to_string());
                        Some(AuthStep::navigate(Route::Dashboard))
                    }
                    Err(failure) => {
                        self.fail(failure);
                        Some(AuthStep::effects(Vec::new()))
                    }
                }
            }
            AuthMsg::RegisterFinished(result) => {
                self.loading = false;
                match result {
                    Ok(()) => {
                        self.mode = AuthMode::Login;
                        self.message = Some("Registration successful".to_string());
                        Some(AuthStep::navigate(Route::Login))
                    }
                    Err(failure) => {
                        self.fail(failure);
                        Some(AuthStep::effects(Vec::new()))
                    }
                }
            }
        }
    }

    fn submit(&mut self) -> Option<AuthStep> {
        if self.loading {
            return None;
        }
        let errors = validate_form(self.mode, &self.form);
        if !errors.is_empty() {
            board_debug!("auth form rejected locally: {:?}", errors);
            self.errors = errors;
            return Some(AuthStep::effects(Vec::new()));
        }
        self.errors = AuthErrors::default();
        self.loading = true;

        let effect = match self.mode {
            AuthMode::Login => Effect::Login {
                email: self.form.email.clone(),
                password: self.form.password.clone(),
            },
            AuthMode::Register => Effect::Register {
                username: self.form.full_name.clone(),
                email: self.form.email.clone(),
                password: self.form.password.clone(),
                role: self.form.role.clone(),
            },
        };
        Some(AuthStep::effects(vec![effect]))
    }

    fn fail(&mut self, failure: AuthFailure) {
        self.message = Some(
            failure
                .message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| FALLBACK_FAILURE.to_string()),
        );
    }
}
