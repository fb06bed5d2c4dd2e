//! Route guards and location reconciliation.
//!
//! Both are pure functions of the session status and the current location;
//! neither keeps state of its own.

use crate::config::ClientConfig;
use crate::navigation::{Location, Navigation};
use crate::session::SessionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only for unauthenticated sessions, e.g. the login form
    PublicOnly,
    /// Only for authenticated sessions, e.g. the dashboard
    AuthRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Loading,
    Render,
    Redirect(Navigation),
}

impl Guard {
    pub fn evaluate(
        self,
        status: SessionStatus,
        location: &Location,
        config: &ClientConfig,
    ) -> GuardOutcome {
        if !status.is_resolved() {
            return GuardOutcome::Loading;
        }

        let authenticated = status == SessionStatus::Authenticated;
        match self {
            Guard::PublicOnly if authenticated => {
                GuardOutcome::Redirect(to_return_target(location, config))
            }
            Guard::AuthRequired if !authenticated => {
                GuardOutcome::Redirect(to_login(location, config))
            }
            _ => GuardOutcome::Render,
        }
    }
}

/// Redirect needed to bring `location` in line with `status`, if any.
///
/// Returns `None` until the initial check has resolved so startup never
/// redirects spuriously, and while the OAuth callback view still carries its
/// token so a signed-in user can switch accounts.
pub fn reconcile(
    status: SessionStatus,
    location: &Location,
    config: &ClientConfig,
) -> Option<Navigation> {
    if config.is_oauth_callback(&location.path) && location.query_param("token").is_some() {
        return None;
    }

    let guard = if config.is_public(&location.path) {
        Guard::PublicOnly
    } else {
        Guard::AuthRequired
    };

    match guard.evaluate(status, location, config) {
        GuardOutcome::Redirect(navigation) => Some(navigation),
        GuardOutcome::Loading | GuardOutcome::Render => None,
    }
}

/// Captured `from` location, or the protected home.
fn to_return_target(location: &Location, config: &ClientConfig) -> Navigation {
    let target = location
        .from
        .as_deref()
        .filter(|from| {
            let path = from.split('?').next().unwrap_or_default();
            !config.is_public(path) && path != "/"
        })
        .unwrap_or(config.home_path.as_str());

    Navigation::replace(target)
}

fn to_login(location: &Location, config: &ClientConfig) -> Navigation {
    let from = (location.path != "/").then(|| location.href());
    Navigation::replace(config.login_path.clone()).with_from(from)
}
