use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::google_login_button::GoogleLoginButton;
use crate::context::use_auth;
use crate::router::Route;

#[function_component(LoginSsoPage)]
pub fn login_sso_page() -> Html {
    let auth = use_auth();
    let error = auth.session.navigator().location().error;

    html! {
        <div class="container">
            <div class="card">
                <h2>{ "Sign in with SSO" }</h2>
                if let Some(message) = error {
                    <div class="alert alert-danger" role="alert">{ message }</div>
                }
                <p>{ "Choose your SSO provider" }</p>
                <GoogleLoginButton />
                <p>
                    <Link<Route> to={Route::Login}>{ "Back to email login" }</Link<Route>>
                </p>
            </div>
        </div>
    }
}
