//! # API crate: shared fullstack server functions for Classboard
//!
//! Defines every Dioxus server function the web frontend calls, along with the
//! server-side modules they depend on.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | `server` | Argon2 password hashing, reading/writing [`store::SessionData`] in the HTTP session |
//! | [`db`] | `server` | PostgreSQL pool, the Postgres [`store::DiagramStore`], migrations, first-run seeding |
//! | [`models`] | none | Client-safe projections ([`UserInfo`]) |
//! | [`settings`] | `server` | Layered configuration (defaults, `config.toml`, environment) |
//!
//! ## Server functions exposed here
//!
//! Every public `async fn` in this file is compiled twice: once with full server
//! logic (behind `#[cfg(feature = "server")]`) and once as a thin client stub that
//! forwards the call over HTTP.
//!
//! - **Authentication**: `get_current_user`, `login`, `logout`
//! - **Projects**: `list_projects`, `current_project`, `create_project`, `select_project`, `take_flash`
//! - **Diagram**: `save_classes`, `load_classes`
//!
//! Everything except `get_current_user` and `login` requires a signed-in session.

use dioxus::prelude::*;

pub mod auth;
pub mod db;
pub mod models;
#[cfg(feature = "server")]
pub mod settings;

pub use models::UserInfo;
pub use store::{ClassBox, ProjectId, ProjectInfo};

/// The user-facing text of a server function error.
pub fn error_message(e: &ServerFnError) -> String {
    match e {
        ServerFnError::ServerError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(feature = "server")]
async fn repository() -> Result<store::Repository<db::PgDiagramStore>, ServerFnError> {
    db::repository()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// Convert a domain error into the message and status shown to the user.
/// Storage details are logged and replaced by a generic message.
#[cfg(feature = "server")]
fn diagram_error(e: store::DiagramError) -> ServerFnError {
    let code = e.status_code();
    let message = match e {
        store::DiagramError::Storage(inner) => {
            tracing::error!("storage failure: {}", inner);
            "The request could not be completed. Please try again.".to_string()
        }
        other => {
            tracing::debug!(code, "request rejected: {}", other);
            other.to_string()
        }
    };
    ServerFnError::ServerError {
        message,
        code,
        details: None,
    }
}

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    let data = auth::load_session(&session).await?;
    let repo = repository().await?;
    let user = repo.current_user(&data).await.map_err(diagram_error)?;
    Ok(user.as_ref().map(UserInfo::from))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Log in with username and password.
#[cfg(feature = "server")]
#[post("/api/auth/login", session: tower_sessions::Session)]
pub async fn login(username: String, password: String) -> Result<UserInfo, ServerFnError> {
    let mut data = auth::load_session(&session).await?;
    let repo = repository().await?;

    let result = repo
        .login(&mut data, &username, |hash| {
            auth::verify_password(&password, hash).unwrap_or_else(|e| {
                tracing::error!("stored password hash unusable: {}", e);
                false
            })
        })
        .await;

    let user = match result {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(username = %username.trim(), "login rejected");
            return Err(diagram_error(e));
        }
    };

    // New id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    auth::store_session(&session, &data).await?;

    tracing::info!(user_id = user.id.0, "user logged in");
    Ok(UserInfo::from(&user))
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login")]
pub async fn login(username: String, password: String) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Log out the current user by clearing the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    session
        .flush()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

/// List the current user's projects.
#[cfg(feature = "server")]
#[get("/api/projects", session: tower_sessions::Session)]
pub async fn list_projects() -> Result<Vec<ProjectInfo>, ServerFnError> {
    let data = auth::load_session(&session).await?;
    let repo = repository().await?;
    repo.list_projects(&data).await.map_err(diagram_error)
}

#[cfg(not(feature = "server"))]
#[get("/api/projects")]
pub async fn list_projects() -> Result<Vec<ProjectInfo>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// The active project, if one is selected and still owned by the user.
#[cfg(feature = "server")]
#[get("/api/projects/current", session: tower_sessions::Session)]
pub async fn current_project() -> Result<Option<ProjectInfo>, ServerFnError> {
    let mut data = auth::load_session(&session).await?;
    let repo = repository().await?;
    let before = data.project_id;
    let project = repo.active_project(&mut data).await.map_err(diagram_error)?;
    if data.project_id != before {
        auth::store_session(&session, &data).await?;
    }
    Ok(project)
}

#[cfg(not(feature = "server"))]
#[get("/api/projects/current")]
pub async fn current_project() -> Result<Option<ProjectInfo>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Create a project for the current user and make it active.
#[cfg(feature = "server")]
#[post("/api/projects", session: tower_sessions::Session)]
pub async fn create_project(name: String) -> Result<ProjectInfo, ServerFnError> {
    let mut data = auth::load_session(&session).await?;
    let repo = repository().await?;
    let project = repo
        .create_project(&mut data, &name)
        .await
        .map_err(diagram_error)?;
    auth::store_session(&session, &data).await?;

    tracing::info!(project_id = project.id.0, "project created");
    Ok(project)
}

#[cfg(not(feature = "server"))]
#[post("/api/projects")]
pub async fn create_project(name: String) -> Result<ProjectInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Make an owned project the active one.
#[cfg(feature = "server")]
#[post("/api/projects/select", session: tower_sessions::Session)]
pub async fn select_project(project_id: ProjectId) -> Result<ProjectInfo, ServerFnError> {
    let mut data = auth::load_session(&session).await?;
    let repo = repository().await?;
    let result = repo.select_project(&mut data, project_id).await;

    // Persist the flash message whether or not the selection succeeded.
    auth::store_session(&session, &data).await?;
    result.map_err(diagram_error)
}

#[cfg(not(feature = "server"))]
#[post("/api/projects/select")]
pub async fn select_project(project_id: ProjectId) -> Result<ProjectInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Take the pending flash message, if any.
#[cfg(feature = "server")]
#[post("/api/flash", session: tower_sessions::Session)]
pub async fn take_flash() -> Result<Option<String>, ServerFnError> {
    let mut data = auth::load_session(&session).await?;
    let flash = data.take_flash();
    if flash.is_some() {
        auth::store_session(&session, &data).await?;
    }
    Ok(flash)
}

#[cfg(not(feature = "server"))]
#[post("/api/flash")]
pub async fn take_flash() -> Result<Option<String>, ServerFnError> {
    Ok(None)
}

/// Replace the active project's classes with `classes`.
#[cfg(feature = "server")]
#[post("/api/classes/save", session: tower_sessions::Session)]
pub async fn save_classes(classes: Vec<ClassBox>) -> Result<String, ServerFnError> {
    let data = auth::load_session(&session).await?;
    let repo = repository().await?;
    let saved = repo
        .save_classes(&data, classes)
        .await
        .map_err(diagram_error)?;

    tracing::info!(
        project_id = saved.project.0,
        classes = saved.classes,
        "diagram saved"
    );
    Ok(format!(
        "Classes saved successfully for project #{}",
        saved.project
    ))
}

#[cfg(not(feature = "server"))]
#[post("/api/classes/save")]
pub async fn save_classes(classes: Vec<ClassBox>) -> Result<String, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Load the active project's classes.
#[cfg(feature = "server")]
#[get("/api/classes", session: tower_sessions::Session)]
pub async fn load_classes() -> Result<Vec<ClassBox>, ServerFnError> {
    let data = auth::load_session(&session).await?;
    let repo = repository().await?;
    repo.load_classes(&data).await.map_err(diagram_error)
}

#[cfg(not(feature = "server"))]
#[get("/api/classes")]
pub async fn load_classes() -> Result<Vec<ClassBox>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_is_the_bare_message() {
        let e = ServerFnError::new("No project selected.");
        assert_eq!(error_message(&e), "No project selected.");
    }

    #[cfg(feature = "server")]
    fn reported(e: store::DiagramError) -> (String, u16) {
        match diagram_error(e) {
            ServerFnError::ServerError { message, code, .. } => (message, code),
            other => panic!("unexpected error shape: {other:?}"),
        }
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_missing_project_is_bad_request() {
        assert_eq!(
            reported(store::DiagramError::NoProject),
            ("No project selected.".to_string(), 400)
        );
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_foreign_project_is_forbidden() {
        assert_eq!(
            reported(store::DiagramError::NotAuthorized),
            ("Invalid project.".to_string(), 403)
        );
        assert_eq!(reported(store::DiagramError::NotAuthenticated).1, 401);
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_storage_details_are_hidden() {
        let (message, code) = reported(store::DiagramError::Storage(
            store::StoreError::Backend("relation \"classes\" does not exist".into()),
        ));
        assert_eq!(code, 500);
        assert!(!message.contains("classes"));
    }
}
