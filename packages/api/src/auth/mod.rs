//! Authentication: password hashing and session state.

#[cfg(feature = "server")]
mod password;
#[cfg(feature = "server")]
mod session;

#[cfg(feature = "server")]
pub use password::{hash_password, verify_password, PasswordError};
#[cfg(feature = "server")]
pub use session::{load_session, store_session, SESSION_DATA_KEY};
