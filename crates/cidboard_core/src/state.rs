use crate::auth::AuthState;
use crate::dashboard::DashboardState;
use crate::view_model::{self, AppViewModel};
use crate::Route;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) route: Route,
    pub(crate) auth: AuthState,
    pub(crate) dashboard: DashboardState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            route: self.route,
            auth: view_model::auth_view(&self.auth),
            dashboard: view_model::dashboard_view(&self.dashboard),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
