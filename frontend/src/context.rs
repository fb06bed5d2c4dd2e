//! Auth state provider for the component tree.
//!
//! One [`SessionService`] lives for the whole app. The provider mirrors its
//! snapshot into Yew state so consumers re-render on every transition, runs
//! the initial check, forwards client events and re-checks redirects whenever
//! the route changes.

use std::rc::Rc;

use auth_core::{AuthClient, SessionService, SessionSnapshot, SystemClock, TokenStore};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::config::client_config;
use crate::services::http::GlooTransport;
use crate::services::navigator::BrowserNavigator;
use crate::services::storage::WebStorage;

#[derive(Clone)]
pub struct AuthContext {
    pub snapshot: SessionSnapshot,
    pub session: SessionService,
}

impl PartialEq for AuthContext {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot == other.snapshot
    }
}

fn build_session() -> SessionService {
    let store = TokenStore::new(Rc::new(WebStorage::local()));
    let (client, events) = AuthClient::new(
        client_config(),
        Rc::new(GlooTransport),
        store,
        Rc::new(SystemClock),
    );
    SessionService::new(client, events, Rc::new(BrowserNavigator::new()))
}

#[derive(Properties, PartialEq)]
pub struct AuthProviderProps {
    pub children: Children,
}

#[function_component(AuthProvider)]
pub fn auth_provider(props: &AuthProviderProps) -> Html {
    let session = use_memo((), |_| build_session());
    let snapshot = use_state(|| session.snapshot());

    {
        let session = session.clone();
        let setter = snapshot.setter();
        use_effect_with((), move |_| {
            let id = session.subscribe(Rc::new(move |next: &SessionSnapshot| {
                setter.set(next.clone());
            }));

            let checker = (*session).clone();
            spawn_local(async move { checker.initialize().await });
            let listener = (*session).clone();
            spawn_local(async move { listener.listen().await });

            move || session.unsubscribe(id)
        });
    }

    let route = use_location().map(|l| format!("{}{}", l.path(), l.query_str()));
    {
        let session = session.clone();
        use_effect_with(route, move |_| {
            session.on_navigation();
            || ()
        });
    }

    let context = AuthContext {
        snapshot: (*snapshot).clone(),
        session: (*session).clone(),
    };

    html! {
        <ContextProvider<AuthContext> context={context}>
            { props.children.clone() }
        </ContextProvider<AuthContext>>
    }
}

/// Auth state for components under [`AuthProvider`].
#[hook]
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("use_auth called outside AuthProvider")
}
