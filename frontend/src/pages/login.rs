use auth_core::{AuthResult, LoginArgs, SessionService};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::context::use_auth;
use crate::pages::bind_input;
use crate::router::Route;

async fn sign_in(session: &SessionService, identifier: &str, secret: &str) -> AuthResult<()> {
    let response = session.client().sign_in(identifier, secret).await?;
    let token = response.access_token.clone().unwrap_or_default();
    session.login(LoginArgs::new(response.profile(identifier), token))
}

#[function_component(LoginPage)]
pub fn login_page() -> Html {
    let auth = use_auth();
    let location = auth.session.navigator().location();

    let username = use_state(String::new);
    let password = use_state(String::new);
    let busy = use_state(|| false);
    let error = {
        let location = location.clone();
        use_state(move || location.error.clone().or_else(|| location.query_param("error")))
    };

    let onsubmit = {
        let session = auth.session.clone();
        let username = username.clone();
        let password = password.clone();
        let busy = busy.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *busy {
                return;
            }
            busy.set(true);
            error.set(None);

            let session = session.clone();
            let identifier = username.trim().to_string();
            let secret = (*password).clone();
            let busy = busy.clone();
            let error = error.clone();
            spawn_local(async move {
                if let Err(err) = sign_in(&session, &identifier, &secret).await {
                    tracing::warn!(error = %err, "Login failed");
                    error.set(Some(err.user_message()));
                }
                busy.set(false);
            });
        })
    };

    html! {
        <div class="container">
            <div class="card">
                <h2>{ "Sign in to your account" }</h2>
                if let Some(notice) = location.notice.clone() {
                    <div class="alert alert-success" role="status">{ notice }</div>
                }
                if let Some(message) = (*error).clone() {
                    <div class="alert alert-danger" role="alert">{ message }</div>
                }
                <form {onsubmit}>
                    <label for="username">{ "Username or Email" }</label>
                    <input
                        id="username"
                        type="text"
                        required=true
                        disabled={*busy}
                        value={(*username).clone()}
                        oninput={bind_input(&username)}
                    />
                    <label for="password">{ "Password" }</label>
                    <input
                        id="password"
                        type="password"
                        required=true
                        disabled={*busy}
                        value={(*password).clone()}
                        oninput={bind_input(&password)}
                    />
                    <button type="submit" class="btn btn-primary" disabled={*busy}>
                        { if *busy { "Signing in..." } else { "Sign in" } }
                    </button>
                </form>
                <p>
                    { "Don't have an account? " }
                    <Link<Route> to={Route::Register}>{ "Sign up" }</Link<Route>>
                </p>
                <p>
                    <Link<Route> to={Route::LoginSso}>{ "Sign in with SSO" }</Link<Route>>
                </p>
            </div>
        </div>
    }
}
