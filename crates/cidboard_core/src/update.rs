use board_logging::board_info;

use crate::{AppState, Effect, Msg, Route};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let handled = match msg {
        Msg::Navigate(route) => navigate(&mut state, route),
        Msg::Auth(msg) => state.auth.handle(msg).map(|step| {
            let mut effects = step.effects;
            if let Some(route) = step.navigate_to {
                effects.extend(navigate(&mut state, route).unwrap_or_default());
            }
            effects
        }),
        Msg::Dashboard(msg) => state.dashboard.handle(msg),
    };

    match handled {
        Some(effects) => {
            state.mark_dirty();
            (state, effects)
        }
        None => (state, Vec::new()),
    }
}

/// Switches pages. Entering the dashboard from elsewhere mounts it.
fn navigate(state: &mut AppState, route: Route) -> Option<Vec<Effect>> {
    if state.route == route {
        return None;
    }
    board_info!("navigate {} -> {}", state.route.path(), route.path());
    state.route = route;
    match route {
        Route::Dashboard => Some(state.dashboard.mount()),
        Route::Login => Some(Vec::new()),
    }
}
