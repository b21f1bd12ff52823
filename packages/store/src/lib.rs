pub mod error;
pub mod models;
pub mod repo;
pub mod session;

mod memory;
pub use memory::MemoryStore;

pub use error::{DiagramError, StoreError};
pub use models::{
    ClassBox, NewUser, ProjectId, ProjectInfo, UserAccount, UserId, DEFAULT_CLASS_NAME,
    DEFAULT_POSITION,
};
pub use repo::{DiagramStore, Repository, SavedDiagram};
pub use session::SessionData;
