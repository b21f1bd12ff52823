mod login;
pub use login::Login;

mod workspace;
pub use workspace::Workspace;
