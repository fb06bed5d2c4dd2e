use auth_core::KeyValueStore;
use yew::prelude::*;

use crate::context::use_auth;
use crate::services::storage::{WebStorage, REDIRECT_AFTER_LOGIN_KEY};

/// Leaves the app for the server's Google authorization endpoint.
#[function_component(GoogleLoginButton)]
pub fn google_login_button() -> Html {
    let auth = use_auth();

    let onclick = {
        let session = auth.session.clone();
        Callback::from(move |_: MouseEvent| {
            let location = session.navigator().location();
            let pending = WebStorage::session();
            match location.from {
                Some(from) => {
                    if let Err(err) = pending.set(REDIRECT_AFTER_LOGIN_KEY, &from) {
                        tracing::warn!(error = %err, "Could not remember return path");
                    }
                }
                None => pending.remove(REDIRECT_AFTER_LOGIN_KEY),
            }

            let url = session.client().authorization_url("google");
            tracing::info!(url = %url, "Starting Google login");
            if let Err(e) = gloo::utils::window().location().set_href(&url) {
                tracing::error!("Failed to leave for Google login: {:?}", e);
            }
        })
    };

    html! {
        <button type="button" class="btn btn-google" {onclick}>
            { "Continue with Google" }
        </button>
    }
}
