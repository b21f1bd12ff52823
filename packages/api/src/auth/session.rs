//! Reading and writing [`SessionData`] in the HTTP session.

use dioxus::prelude::ServerFnError;
use store::SessionData;
use tower_sessions::Session;

/// Key under which [`SessionData`] is stored in the session store.
pub const SESSION_DATA_KEY: &str = "classboard";

/// Load the session's data, or a signed-out default for a fresh session.
pub async fn load_session(session: &Session) -> Result<SessionData, ServerFnError> {
    let data: Option<SessionData> = session
        .get(SESSION_DATA_KEY)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    Ok(data.unwrap_or_default())
}

/// Write `data` back to the session.
pub async fn store_session(session: &Session, data: &SessionData) -> Result<(), ServerFnError> {
    session
        .insert(SESSION_DATA_KEY, data)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}
