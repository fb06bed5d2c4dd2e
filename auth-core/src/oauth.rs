//! OAuth redirect completion.

use crate::error::AuthResult;
use crate::navigation::Navigation;
use crate::session::{LoginArgs, SessionService};

/// Finish a login started at the identity provider.
///
/// Reads the token from the current location, drops the query from the URL so
/// the token does not linger in history, then logs in. `return_to` is where the
/// user was before leaving the app; without it the session lands on the home
/// view. On failure the user is sent to the login view with a readable error.
/// Runs once per callback visit; there are no retries.
pub async fn complete_oauth_login(
    session: &SessionService,
    return_to: Option<String>,
) -> AuthResult<()> {
    let location = session.navigator().location();

    let outcome = match session.client().complete_oauth_callback(&location).await {
        Ok(completion) => {
            session.navigate(
                Navigation::replace(location.path.clone())
                    .with_from(return_to.or(location.from.clone())),
            );
            session.login(LoginArgs::new(completion.user, completion.token))
        }
        Err(err) => Err(err),
    };

    if let Err(err) = &outcome {
        tracing::warn!(error = %err, "OAuth login failed");
        session.navigate(
            Navigation::replace(session.config().login_path.clone())
                .with_error(err.user_message()),
        );
    }

    outcome
}
