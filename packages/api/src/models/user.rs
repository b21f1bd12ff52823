//! # User information sent to the client
//!
//! [`store::UserAccount`] is the full row including the password hash and stays
//! on the server. [`UserInfo`] is the client-safe projection that crosses the
//! server/client boundary via Dioxus server functions.

use serde::{Deserialize, Serialize};
use store::UserAccount;

/// User information safe to send to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
}

impl UserInfo {
    /// Get display name, falling back to the username if the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

impl From<&UserAccount> for UserInfo {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id.0,
            name: account.name.clone(),
            email: account.email.clone(),
            username: account.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::UserId;

    #[test]
    fn test_info_omits_password_and_falls_back_to_username() {
        let account = UserAccount {
            id: UserId(3),
            name: " ".to_string(),
            email: "info@example.com".to_string(),
            username: "modeler".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };
        let info = UserInfo::from(&account);
        assert_eq!(info.id, 3);
        assert_eq!(info.display_name(), "modeler");
    }
}
