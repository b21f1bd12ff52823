//! # Repository: project and diagram operations on an abstract store
//!
//! [`Repository`] holds every rule about who may see or change what. All reads
//! and writes go through the [`DiagramStore`] trait, so the same logic runs
//! against PostgreSQL on the server and against [`crate::MemoryStore`] in tests.
//!
//! ## [`DiagramStore`] trait
//!
//! An async interface over three tables: users, projects and class boxes.
//! [`replace_classes`](DiagramStore::replace_classes) must be all-or-nothing:
//! either the whole new set is stored or the previous set is left untouched.
//!
//! ## Session gate
//!
//! Every operation takes the caller's [`SessionData`]. Operations that act on a
//! project check, in order:
//!
//! 1. a user is signed in ([`DiagramError::NotAuthenticated`]),
//! 2. a project is active ([`DiagramError::NoProject`]),
//! 3. the active project belongs to that user ([`DiagramError::NotAuthorized`]).
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`seed_user`](Repository::seed_user) | Creates the first account when the store has no users. |
//! | [`login`](Repository::login) | Checks credentials and binds the session to the user. |
//! | [`create_project`](Repository::create_project) | Inserts a project for the current user and activates it. |
//! | [`select_project`](Repository::select_project) | Activates a project after an ownership check. |
//! | [`active_project`](Repository::active_project) | Validates the session's project, clearing it if stale. |
//! | [`save_classes`](Repository::save_classes) | Replaces the active project's class set. |
//! | [`load_classes`](Repository::load_classes) | Returns the active project's class set in saved order. |

use std::future::Future;

use crate::error::{DiagramError, StoreError};
use crate::models::{ClassBox, NewUser, ProjectId, ProjectInfo, UserAccount, UserId};
use crate::session::SessionData;

/// Async persistence interface for users, projects and class boxes.
pub trait DiagramStore {
    fn user_count(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn insert_user(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<UserAccount, StoreError>> + Send;

    fn get_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<UserAccount>, StoreError>> + Send;

    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<UserAccount>, StoreError>> + Send;

    fn insert_project(
        &self,
        owner: UserId,
        name: &str,
    ) -> impl Future<Output = Result<ProjectInfo, StoreError>> + Send;

    fn list_projects(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<ProjectInfo>, StoreError>> + Send;

    /// The project with the given id, if it exists and belongs to `owner`.
    fn find_owned_project(
        &self,
        owner: UserId,
        project: ProjectId,
    ) -> impl Future<Output = Result<Option<ProjectInfo>, StoreError>> + Send;

    /// Delete every class box of `project` and insert `classes` in order,
    /// as one atomic unit.
    fn replace_classes(
        &self,
        project: ProjectId,
        classes: &[ClassBox],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_classes(
        &self,
        project: ProjectId,
    ) -> impl Future<Output = Result<Vec<ClassBox>, StoreError>> + Send;
}

/// Outcome of a successful save.
#[derive(Clone, Debug, PartialEq)]
pub struct SavedDiagram {
    pub project: ProjectId,
    pub classes: usize,
}

/// Project and diagram operations backed by a [`DiagramStore`].
pub struct Repository<S: DiagramStore> {
    store: S,
}

impl<S: DiagramStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create `user` if the store has no users yet. Returns the new account,
    /// or `None` when users already exist.
    pub async fn seed_user(&self, user: NewUser) -> Result<Option<UserAccount>, DiagramError> {
        if self.store.user_count().await? > 0 {
            return Ok(None);
        }
        Ok(Some(self.store.insert_user(user).await?))
    }

    /// Authenticate `username` and bind the session to that user.
    ///
    /// `password_matches` receives the stored password hash and decides whether
    /// the submitted password is correct.
    pub async fn login<F>(
        &self,
        session: &mut SessionData,
        username: &str,
        password_matches: F,
    ) -> Result<UserAccount, DiagramError>
    where
        F: FnOnce(&str) -> bool,
    {
        let user = self
            .store
            .find_user_by_username(username.trim())
            .await?
            .ok_or(DiagramError::InvalidCredentials)?;

        if !password_matches(&user.password_hash) {
            return Err(DiagramError::InvalidCredentials);
        }

        session.sign_in(user.id);
        Ok(user)
    }

    /// The signed-in user's account. A session whose user no longer exists is
    /// treated as signed out.
    pub async fn current_user(
        &self,
        session: &SessionData,
    ) -> Result<Option<UserAccount>, DiagramError> {
        match session.user_id {
            Some(id) => Ok(self.store.get_user(id).await?),
            None => Ok(None),
        }
    }

    pub async fn list_projects(
        &self,
        session: &SessionData,
    ) -> Result<Vec<ProjectInfo>, DiagramError> {
        let user = session.require_user()?;
        Ok(self.store.list_projects(user).await?)
    }

    /// Create a project for the current user and make it the active project.
    pub async fn create_project(
        &self,
        session: &mut SessionData,
        name: &str,
    ) -> Result<ProjectInfo, DiagramError> {
        let user = session.require_user()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DiagramError::InvalidInput(
                "Project name is required".to_string(),
            ));
        }

        let project = self.store.insert_project(user, name).await?;
        session.project_id = Some(project.id);
        session.set_flash(format!("Project created: {}", project.name));
        Ok(project)
    }

    /// Make `project` the active project if the current user owns it.
    /// On rejection the active project is left unchanged.
    pub async fn select_project(
        &self,
        session: &mut SessionData,
        project: ProjectId,
    ) -> Result<ProjectInfo, DiagramError> {
        let user = session.require_user()?;
        match self.store.find_owned_project(user, project).await? {
            Some(found) => {
                session.project_id = Some(found.id);
                session.set_flash("Project selected.");
                Ok(found)
            }
            None => {
                session.set_flash("Invalid project selected.");
                Err(DiagramError::NotAuthorized)
            }
        }
    }

    /// The active project, if it is set and still owned by the current user.
    /// A stale project id is removed from the session.
    pub async fn active_project(
        &self,
        session: &mut SessionData,
    ) -> Result<Option<ProjectInfo>, DiagramError> {
        let user = session.require_user()?;
        let Some(project) = session.project_id else {
            return Ok(None);
        };

        let found = self.store.find_owned_project(user, project).await?;
        if found.is_none() {
            session.project_id = None;
        }
        Ok(found)
    }

    /// Replace the active project's class set with `classes`.
    pub async fn save_classes(
        &self,
        session: &SessionData,
        classes: Vec<ClassBox>,
    ) -> Result<SavedDiagram, DiagramError> {
        let project = self.owned_active_project(session).await?;

        if let Some(bad) = classes.iter().position(|c| !c.is_well_formed()) {
            return Err(DiagramError::InvalidInput(format!(
                "class #{} has a non-finite position",
                bad + 1
            )));
        }

        let classes: Vec<ClassBox> = classes.into_iter().map(ClassBox::normalized).collect();
        self.store.replace_classes(project, &classes).await?;

        Ok(SavedDiagram {
            project,
            classes: classes.len(),
        })
    }

    /// The active project's class set, in saved order.
    pub async fn load_classes(&self, session: &SessionData) -> Result<Vec<ClassBox>, DiagramError> {
        let project = self.owned_active_project(session).await?;
        Ok(self.store.list_classes(project).await?)
    }

    async fn owned_active_project(&self, session: &SessionData) -> Result<ProjectId, DiagramError> {
        let user = session.require_user()?;
        let project = session.project_id.ok_or(DiagramError::NoProject)?;
        self.store
            .find_owned_project(user, project)
            .await?
            .map(|p| p.id)
            .ok_or(DiagramError::NotAuthorized)
    }
}
