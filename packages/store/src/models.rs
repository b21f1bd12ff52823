//! # Domain models for users, projects and class boxes
//!
//! These types are `Serialize + Deserialize` so they can cross the
//! server/client boundary via Dioxus server functions.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`ClassBox`] | One node on the diagram canvas: a class name, its ordered properties and methods, and an `x`/`y` position in canvas pixels. Serialized as `{className, properties, methods, x, y}`. |
//! | [`ProjectInfo`] | A named container of class boxes owned by one user. |
//! | [`UserAccount`] | The stored user record, including the password hash. Never sent to the client. |
//! | [`NewUser`] | Input for creating a user (used for the first-run seed account). |

use serde::{Deserialize, Serialize};

/// Name given to a class box whose name is missing or blank.
pub const DEFAULT_CLASS_NAME: &str = "Class";

/// Canvas coordinate used for a class box with no stored position.
pub const DEFAULT_POSITION: f64 = 250.0;

/// Primary key of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Primary key of a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A class box on the diagram canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBox {
    #[serde(default = "default_class_name")]
    pub class_name: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default = "default_position")]
    pub x: f64,
    #[serde(default = "default_position")]
    pub y: f64,
}

fn default_class_name() -> String {
    DEFAULT_CLASS_NAME.to_string()
}

fn default_position() -> f64 {
    DEFAULT_POSITION
}

impl Default for ClassBox {
    fn default() -> Self {
        Self {
            class_name: default_class_name(),
            properties: Vec::new(),
            methods: Vec::new(),
            x: DEFAULT_POSITION,
            y: DEFAULT_POSITION,
        }
    }
}

impl ClassBox {
    /// Create an empty class box at the given position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Trim the class name, falling back to [`DEFAULT_CLASS_NAME`] when it is
    /// blank. Properties and methods are kept exactly as entered.
    pub fn normalized(self) -> Self {
        let name = self.class_name.trim();
        let class_name = if name.is_empty() {
            default_class_name()
        } else {
            name.to_string()
        };
        Self { class_name, ..self }
    }
}

/// A project owned by a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: ProjectId,
    pub name: String,
}

/// Stored user record.
#[derive(Clone, Debug, PartialEq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub username: String,
    /// PHC-format password hash.
    pub password_hash: String,
}

/// Fields required to create a user.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}
