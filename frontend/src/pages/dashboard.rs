use gloo::timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::loading::Loading;
use crate::context::use_auth;

/// Delay before a failed profile refresh signs the user out.
const LOGOUT_DELAY_MS: u32 = 1_500;

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    let auth = use_auth();

    let user = {
        let stored = auth.session.client().stored_session().user;
        let fallback = auth.snapshot.user.clone();
        use_state(move || stored.or(fallback))
    };
    let loading = use_state(|| true);
    let error = use_state(|| None::<String>);

    {
        let session = auth.session.clone();
        let user = user.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let refreshed = session.client().fetch_current_user().await;
                match refreshed {
                    Ok(profile) => user.set(Some(profile)),
                    Err(err) => {
                        tracing::warn!(error = %err, "Failed to refresh user profile");
                        error.set(Some(
                            "Failed to load user data. Redirecting to login...".to_string(),
                        ));
                        Timeout::new(LOGOUT_DELAY_MS, move || session.logout()).forget();
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    let on_logout = {
        let session = auth.session.clone();
        Callback::from(move |_: MouseEvent| session.logout())
    };

    if *loading && user.is_none() {
        return html! { <Loading /> };
    }

    html! {
        <div class="container">
            <div class="card">
                <div class="card-header">
                    <h2>{ "Dashboard" }</h2>
                    <button class="btn btn-outline-danger" onclick={on_logout}>{ "Logout" }</button>
                </div>
                if let Some(message) = (*error).clone() {
                    <div class="alert alert-warning" role="alert">{ message }</div>
                }
                if let Some(profile) = (*user).clone() {
                    <h3>{ format!("Welcome, {}!", profile.display_name()) }</h3>
                    <h4>{ "Your Profile" }</h4>
                    <table class="table">
                        <tbody>
                            <tr>
                                <th scope="row">{ "User ID" }</th>
                                <td>{ profile.id.map(|id| id.to_string()).unwrap_or_else(|| "N/A".to_string()) }</td>
                            </tr>
                            <tr>
                                <th scope="row">{ "Username" }</th>
                                <td>{ profile.username.clone() }</td>
                            </tr>
                            <tr>
                                <th scope="row">{ "Email" }</th>
                                <td>{ profile.email.clone().unwrap_or_else(|| "N/A".to_string()) }</td>
                            </tr>
                        </tbody>
                    </table>
                }
            </div>
        </div>
    }
}
