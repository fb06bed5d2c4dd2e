use auth_core::{Location, Navigation, Navigator};
use yew_router::history::{BrowserHistory, History};

/// History state attached to auth redirects.
#[derive(Debug, Clone, PartialEq)]
struct NavState {
    from: Option<String>,
    error: Option<String>,
    notice: Option<String>,
}

/// Navigator over the same browser history the router listens to.
pub struct BrowserNavigator {
    history: BrowserHistory,
}

impl BrowserNavigator {
    pub fn new() -> Self {
        Self {
            history: BrowserHistory::new(),
        }
    }
}

impl Navigator for BrowserNavigator {
    fn location(&self) -> Location {
        let current = self.history.location();
        let mut location = Location::new(current.path()).with_query(current.query_str());
        if let Some(state) = current.state::<NavState>() {
            location.from = state.from.clone();
            location.error = state.error.clone();
            location.notice = state.notice.clone();
        }
        location
    }

    fn navigate(&self, navigation: Navigation) {
        let state = NavState {
            from: navigation.from,
            error: navigation.error,
            notice: navigation.notice,
        };
        if navigation.replace {
            self.history.replace_with_state(navigation.to, state);
        } else {
            self.history.push_with_state(navigation.to, state);
        }
    }
}
