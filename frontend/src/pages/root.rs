use auth_core::Navigation;
use yew::prelude::*;

use crate::components::guards::AuthRequired;
use crate::context::use_auth;

#[function_component(HomeRedirect)]
fn home_redirect() -> Html {
    let auth = use_auth();
    {
        let session = auth.session.clone();
        use_effect_with((), move |_| {
            let home = session.config().home_path.clone();
            session.navigate(Navigation::replace(home));
            || ()
        });
    }
    html! {}
}

/// `/` sends signed-in users home; the guard sends everyone else to login.
#[function_component(RootRedirect)]
pub fn root_redirect() -> Html {
    html! {
        <AuthRequired>
            <HomeRedirect />
        </AuthRequired>
    }
}
