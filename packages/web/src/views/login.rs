//! Login page view with a username/password form.

use dioxus::prelude::*;
use ui::use_auth;

use crate::Route;

/// Login page component.
#[component]
pub fn Login() -> Element {
    let mut auth = use_auth();
    let nav = use_navigator();
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    // If already logged in, go to the workspace
    if !auth().loading && auth().user.is_some() {
        nav.replace(Route::Workspace {});
    }

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);

            let u = username().trim().to_string();
            let p = password();
            if u.is_empty() || p.is_empty() {
                error.set(Some("Username and password are required".to_string()));
                return;
            }

            loading.set(true);
            match api::login(u, p).await {
                Ok(user) => {
                    let mut state = auth();
                    state.user = Some(user);
                    state.loading = false;
                    auth.set(state);
                    nav.push(Route::Workspace {});
                }
                Err(e) => {
                    loading.set(false);
                    password.set(String::new());
                    error.set(Some(api::error_message(&e)));
                }
            }
        });
    };

    rsx! {
        div {
            class: "login-page",

            div {
                class: "login-box",
                h1 { "Classboard" }

                if let Some(err) = error() {
                    div { class: "flash-msg", "{err}" }
                }

                form {
                    onsubmit: handle_login,

                    label { r#for: "login-username", "Username" }
                    input {
                        id: "login-username",
                        r#type: "text",
                        autocomplete: "username",
                        required: true,
                        value: username(),
                        oninput: move |evt: FormEvent| username.set(evt.value()),
                    }

                    label { r#for: "login-password", "Password" }
                    input {
                        id: "login-password",
                        r#type: "password",
                        autocomplete: "current-password",
                        required: true,
                        value: password(),
                        oninput: move |evt: FormEvent| password.set(evt.value()),
                    }

                    button {
                        r#type: "submit",
                        disabled: loading(),
                        if loading() { "Logging in..." } else { "Log In" }
                    }
                }
            }
        }
    }
}
