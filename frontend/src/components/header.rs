use yew::prelude::*;
use yew_router::prelude::*;

use crate::context::use_auth;
use crate::router::Route;

#[function_component(Header)]
pub fn header() -> Html {
    let auth = use_auth();

    let on_logout = {
        let session = auth.session.clone();
        Callback::from(move |_: MouseEvent| session.logout())
    };

    html! {
        <header class="header">
            <div class="container">
                <h1>{ "Login Screen" }</h1>
                <nav>
                    if let Some(user) = auth.snapshot.user.as_ref().filter(|_| auth.snapshot.is_authenticated) {
                        <Link<Route> to={Route::Dashboard}>{ "Dashboard" }</Link<Route>>
                        { " | " }
                        <span class="username">{ user.display_name() }</span>
                        { " " }
                        <button class="btn-logout" onclick={on_logout}>{ "Logout" }</button>
                    } else {
                        <Link<Route> to={Route::Login}>{ "Sign in" }</Link<Route>>
                        { " | " }
                        <Link<Route> to={Route::Register}>{ "Register" }</Link<Route>>
                    }
                </nav>
            </div>
        </header>
    }
}
