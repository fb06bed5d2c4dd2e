pub mod dashboard;
pub mod login;
pub mod login_sso;
pub mod oauth_callback;
pub mod register;
pub mod root;

use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Keep a text state in sync with an input element.
pub(crate) fn bind_input(state: &UseStateHandle<String>) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        state.set(input.value());
    })
}
