use auth_core::complete_oauth_login;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::loading::Loading;
use crate::context::use_auth;
use crate::services::storage::{WebStorage, REDIRECT_AFTER_LOGIN_KEY};

/// Landing view for `/oauth2/redirect`.
#[function_component(OAuthCallback)]
pub fn oauth_callback() -> Html {
    let auth = use_auth();

    {
        let session = auth.session.clone();
        use_effect_with((), move |_| {
            let return_to = WebStorage::session().take(REDIRECT_AFTER_LOGIN_KEY);
            spawn_local(async move {
                if let Err(err) = complete_oauth_login(&session, return_to).await {
                    tracing::error!(error = %err, "OAuth callback failed");
                }
            });
            || ()
        });
    }

    html! { <Loading message="Completing authentication..." /> }
}
