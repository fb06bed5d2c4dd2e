use auth_core::Navigation;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::context::use_auth;
use crate::pages::bind_input;
use crate::router::Route;

#[function_component(RegisterPage)]
pub fn register_page() -> Html {
    let auth = use_auth();

    let username = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let busy = use_state(|| false);
    let error = use_state(|| None::<String>);

    let onsubmit = {
        let session = auth.session.clone();
        let username = username.clone();
        let email = email.clone();
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
            let (username, email, password) =
                ((*username).clone(), (*email).clone(), (*password).clone());
            let busy = busy.clone();
            let error = error.clone();
            spawn_local(async move {
                match session.client().sign_up(&username, &email, &password).await {
                    Ok(response) => {
                        tracing::info!(username = %username, "Registration accepted");
                        session.navigate(
                            Navigation::push(session.config().login_path.clone())
                                .with_notice(response.message),
                        );
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Registration failed");
                        error.set(Some(err.user_message()));
                    }
                }
                busy.set(false);
            });
        })
    };

    html! {
        <div class="container">
            <div class="card">
                <h2>{ "Create an account" }</h2>
                if let Some(message) = (*error).clone() {
                    <div class="alert alert-danger" role="alert">{ message }</div>
                }
                <form {onsubmit}>
                    <label for="username">{ "Username" }</label>
                    <input
                        id="username"
                        type="text"
                        required=true
                        minlength="3"
                        maxlength="20"
                        disabled={*busy}
                        value={(*username).clone()}
                        oninput={bind_input(&username)}
                    />
                    <label for="email">{ "Email" }</label>
                    <input
                        id="email"
                        type="email"
                        required=true
                        maxlength="50"
                        disabled={*busy}
                        value={(*email).clone()}
                        oninput={bind_input(&email)}
                    />
                    <label for="password">{ "Password" }</label>
                    <input
                        id="password"
                        type="password"
                        required=true
                        minlength="6"
                        maxlength="40"
                        disabled={*busy}
                        value={(*password).clone()}
                        oninput={bind_input(&password)}
                    />
                    <button type="submit" class="btn btn-primary" disabled={*busy}>
                        { if *busy { "Creating account..." } else { "Sign up" } }
                    </button>
                </form>
                <p>
                    { "Already have an account? " }
                    <Link<Route> to={Route::Login}>{ "Sign in" }</Link<Route>>
                </p>
            </div>
        </div>
    }
}
