//! Per-browser session state.

use serde::{Deserialize, Serialize};

use crate::error::DiagramError;
use crate::models::{ProjectId, UserId};

/// Session data stored in the session store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<UserId>,
    pub project_id: Option<ProjectId>,
    /// One-shot message shown after the next page action.
    pub flash: Option<String>,
}

impl SessionData {
    /// The signed-in user, or [`DiagramError::NotAuthenticated`].
    pub fn require_user(&self) -> Result<UserId, DiagramError> {
        self.user_id.ok_or(DiagramError::NotAuthenticated)
    }

    /// Bind the session to a user. Any previously active project is dropped.
    pub fn sign_in(&mut self, user: UserId) {
        self.user_id = Some(user);
        self.project_id = None;
    }

    pub fn set_flash(&mut self, message: impl Into<String>) {
        self.flash = Some(message.into());
    }

    pub fn take_flash(&mut self) -> Option<String> {
        self.flash.take()
    }
}
