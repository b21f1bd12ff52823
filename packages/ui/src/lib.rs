//! This crate contains all shared UI for the workspace.

mod auth;
pub use auth::{use_auth, AuthProvider, AuthState, LogoutButton};

pub mod activity_log;
pub use activity_log::{log_activity, use_activity_log, ActivityLogProvider, LogLevel, StatusBar};

mod class_card;
pub use class_card::{members_to_text, text_to_members, ClassCard};

mod class_canvas;
pub use class_canvas::{dragged_position, ClassCanvas};

mod project_panel;
pub use project_panel::ProjectPanel;
