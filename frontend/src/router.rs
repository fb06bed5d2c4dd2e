use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::guards::{AuthRequired, PublicOnly};
use crate::pages::{
    dashboard::Dashboard, login::LoginPage, login_sso::LoginSsoPage,
    oauth_callback::OAuthCallback, register::RegisterPage, root::RootRedirect,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Root,
    #[at("/login")]
    Login,
    #[at("/login/sso")]
    LoginSso,
    #[at("/register")]
    Register,
    #[at("/oauth2/redirect")]
    OAuthRedirect,
    #[at("/dashboard")]
    Dashboard,
    #[not_found]
    #[at("/404")]
    NotFound,
}

pub fn switch(routes: Route) -> Html {
    match routes {
        Route::Root => html! { <RootRedirect /> },
        Route::Login => html! { <PublicOnly><LoginPage /></PublicOnly> },
        Route::LoginSso => html! { <PublicOnly><LoginSsoPage /></PublicOnly> },
        Route::Register => html! { <PublicOnly><RegisterPage /></PublicOnly> },
        Route::OAuthRedirect => html! { <OAuthCallback /> },
        Route::Dashboard => html! { <AuthRequired><Dashboard /></AuthRequired> },
        Route::NotFound => html! { <Redirect<Route> to={Route::Root} /> },
    }
}
