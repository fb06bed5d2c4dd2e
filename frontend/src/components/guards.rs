//! Route guard components.
//!
//! Both render a spinner until the initial auth check resolves, then either
//! their children or nothing while the redirect is applied.

use auth_core::{Guard, GuardOutcome};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::loading::Loading;
use crate::context::use_auth;

#[derive(Properties, PartialEq)]
pub struct GuardProps {
    pub children: Children,
}

#[hook]
fn use_guard(guard: Guard) -> GuardOutcome {
    let auth = use_auth();
    // Subscribes the guard to route changes.
    let _route = use_location();

    let location = auth.session.navigator().location();
    let outcome = guard.evaluate(auth.snapshot.status, &location, auth.session.config());

    {
        let session = auth.session.clone();
        use_effect_with(outcome.clone(), move |outcome| {
            if let GuardOutcome::Redirect(navigation) = outcome {
                tracing::debug!(to = %navigation.to, "Guard redirect");
                session.navigate(navigation.clone());
            }
            || ()
        });
    }

    outcome
}

fn render(outcome: GuardOutcome, children: &Children) -> Html {
    match outcome {
        GuardOutcome::Loading => html! { <Loading /> },
        GuardOutcome::Render => html! { <>{ children.clone() }</> },
        GuardOutcome::Redirect(_) => html! {},
    }
}

/// Views only unauthenticated users should see, e.g. the login form.
#[function_component(PublicOnly)]
pub fn public_only(props: &GuardProps) -> Html {
    let outcome = use_guard(Guard::PublicOnly);
    render(outcome, &props.children)
}

/// Views that require a signed-in user.
#[function_component(AuthRequired)]
pub fn auth_required(props: &GuardProps) -> Html {
    let outcome = use_guard(Guard::AuthRequired);
    render(outcome, &props.children)
}
