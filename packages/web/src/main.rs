use dioxus::prelude::*;

use ui::{ActivityLogProvider, AuthProvider};
use views::{Login, Workspace};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/workspace")]
    Workspace {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        init_tracing();
        let result = tokio::runtime::Runtime::new()
            .map_err(anyhow::Error::from)
            .and_then(|runtime| runtime.block_on(launch_server()));
        if let Err(e) = result {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[cfg(feature = "server")]
async fn launch_server() -> anyhow::Result<()> {
    use anyhow::Context as _;
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use std::time::Duration;
    use tower_sessions::cookie::SameSite;
    use tower_sessions::{Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;

    let settings = api::settings::Settings::new().context("Failed to load settings")?;

    let pool = api::db::get_pool()
        .await
        .context("Failed to connect to database")?;

    api::db::MIGRATOR
        .run(pool)
        .await
        .context("Failed to run migrations")?;

    if let Some(user) = api::db::seed_initial_user(&settings.seed)
        .await
        .context("Failed to create the initial user")?
    {
        tracing::info!(username = %user.username, "Created initial user");
    }

    // Create session store
    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .context("Failed to migrate session store")?;

    let inactivity = Duration::from_secs(60 * 60 * 24 * u64::from(settings.session.inactivity_days));
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(settings.session.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(
            inactivity.try_into().context("Invalid session expiry")?,
        ));

    let router = axum::Router::new()
        .serve_dioxus_application(ServeConfig::new(), App)
        .layer(session_layer);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .await
        .context("Server stopped")?;
    Ok(())
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AuthProvider {
            ActivityLogProvider {
                Router::<Route> {}
            }
        }
    }
}

/// Redirect `/` to `/workspace`
#[component]
fn Root() -> Element {
    let nav = use_navigator();
    nav.replace(Route::Workspace {});
    rsx! {}
}
