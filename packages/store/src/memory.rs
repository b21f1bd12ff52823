use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StoreError;
use crate::models::{ClassBox, NewUser, ProjectId, ProjectInfo, UserAccount, UserId};
use crate::repo::DiagramStore;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserAccount>,
    projects: Vec<(UserId, ProjectInfo)>,
    classes: HashMap<ProjectId, Vec<ClassBox>>,
    next_user_id: i64,
    next_project_id: i64,
    /// Number of class rows a replace may stage before failing.
    fail_class_writes_after: Option<usize>,
}

/// In-memory DiagramStore for testing.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `replace_classes` fail once it has staged `rows`
    /// class rows, the way a database error mid-transaction would.
    pub fn fail_class_writes_after(&self, rows: usize) {
        if let Ok(mut tables) = self.lock() {
            tables.fail_class_writes_after = Some(rows);
        }
    }

    /// Clear an injected failure.
    pub fn heal(&self) {
        if let Ok(mut tables) = self.lock() {
            tables.fail_class_writes_after = None;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl DiagramStore for MemoryStore {
    async fn user_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.users.len() as u64)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        tables.next_user_id += 1;
        let account = UserAccount {
            id: UserId(tables.next_user_id),
            name: user.name,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
        };
        tables.users.push(account.clone());
        Ok(account)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_project(&self, owner: UserId, name: &str) -> Result<ProjectInfo, StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.iter().any(|u| u.id == owner) {
            return Err(StoreError::Constraint(format!(
                "user {} does not exist",
                owner.0
            )));
        }
        tables.next_project_id += 1;
        let project = ProjectInfo {
            id: ProjectId(tables.next_project_id),
            name: name.to_string(),
        };
        tables.projects.push((owner, project.clone()));
        Ok(project)
    }

    async fn list_projects(&self, owner: UserId) -> Result<Vec<ProjectInfo>, StoreError> {
        Ok(self
            .lock()?
            .projects
            .iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn find_owned_project(
        &self,
        owner: UserId,
        project: ProjectId,
    ) -> Result<Option<ProjectInfo>, StoreError> {
        Ok(self
            .lock()?
            .projects
            .iter()
            .find(|(o, p)| *o == owner && p.id == project)
            .map(|(_, p)| p.clone()))
    }

    async fn replace_classes(
        &self,
        project: ProjectId,
        classes: &[ClassBox],
    ) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.projects.iter().any(|(_, p)| p.id == project) {
            return Err(StoreError::Constraint(format!(
                "project {project} does not exist"
            )));
        }

        // Stage the full set first so a failure leaves the old rows in place.
        let mut staged = Vec::with_capacity(classes.len());
        for class in classes {
            if tables
                .fail_class_writes_after
                .is_some_and(|limit| staged.len() >= limit)
            {
                return Err(StoreError::Backend(format!(
                    "write failed after {} class rows",
                    staged.len()
                )));
            }
            staged.push(class.clone());
        }

        tables.classes.insert(project, staged);
        Ok(())
    }

    async fn list_classes(&self, project: ProjectId) -> Result<Vec<ClassBox>, StoreError> {
        Ok(self
            .lock()?
            .classes
            .get(&project)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagramError;
    use crate::repo::Repository;
    use crate::session::SessionData;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            name: format!("{username} name"),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            password_hash: format!("{username}-secret"),
        }
    }

    fn uml_class(name: &str, x: f64, y: f64) -> ClassBox {
        ClassBox {
            class_name: name.to_string(),
            properties: vec!["id: i64".to_string(), "name: String".to_string()],
            methods: vec!["save()".to_string()],
            x,
            y,
        }
    }

    /// Repository with one signed-in user and a fresh session.
    async fn signed_in(username: &str) -> (Repository<MemoryStore>, SessionData) {
        let repo = Repository::new(MemoryStore::new());
        let user = repo.store().insert_user(new_user(username)).await.unwrap();
        let mut session = SessionData::default();
        session.sign_in(user.id);
        (repo, session)
    }

    #[tokio::test]
    async fn test_seed_user_only_on_first_run() {
        let repo = Repository::new(MemoryStore::new());

        let created = repo.seed_user(new_user("demo")).await.unwrap();
        assert_eq!(created.map(|u| u.username), Some("demo".to_string()));

        let again = repo.seed_user(new_user("other")).await.unwrap();
        assert!(again.is_none());
        assert_eq!(repo.store().user_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store.insert_user(new_user("demo")).await.unwrap();
        let err = store.insert_user(new_user("demo")).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_login() {
        let repo = Repository::new(MemoryStore::new());
        repo.seed_user(new_user("demo")).await.unwrap();
        let mut session = SessionData::default();

        let err = repo
            .login(&mut session, "demo", |hash| hash == "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, DiagramError::InvalidCredentials);
        assert_eq!(session.user_id, None);

        let err = repo
            .login(&mut session, "nobody", |_| true)
            .await
            .unwrap_err();
        assert_eq!(err, DiagramError::InvalidCredentials);

        let user = repo
            .login(&mut session, " demo ", |hash| hash == "demo-secret")
            .await
            .unwrap();
        assert_eq!(session.user_id, Some(user.id));
        assert_eq!(
            repo.current_user(&session).await.unwrap().map(|u| u.username),
            Some("demo".to_string())
        );
    }

    #[tokio::test]
    async fn test_anonymous_session_is_rejected() {
        let repo = Repository::new(MemoryStore::new());
        let mut session = SessionData::default();

        assert_eq!(
            repo.create_project(&mut session, "p").await.unwrap_err(),
            DiagramError::NotAuthenticated
        );
        assert_eq!(
            repo.load_classes(&session).await.unwrap_err(),
            DiagramError::NotAuthenticated
        );
        assert_eq!(
            repo.save_classes(&session, vec![]).await.unwrap_err(),
            DiagramError::NotAuthenticated
        );
        assert!(repo.current_user(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_project_activates_it() {
        let (repo, mut session) = signed_in("ada").await;

        let project = repo.create_project(&mut session, "  Shop  ").await.unwrap();
        assert_eq!(project.name, "Shop");
        assert_eq!(session.project_id, Some(project.id));
        assert_eq!(session.take_flash().as_deref(), Some("Project created: Shop"));

        let projects = repo.list_projects(&session).await.unwrap();
        assert_eq!(projects, vec![project]);
    }

    #[tokio::test]
    async fn test_create_project_requires_name() {
        let (repo, mut session) = signed_in("ada").await;
        let err = repo.create_project(&mut session, "   ").await.unwrap_err();
        assert!(matches!(err, DiagramError::InvalidInput(_)));
        assert_eq!(session.project_id, None);
    }

    #[tokio::test]
    async fn test_select_foreign_project_keeps_active_project() {
        let (repo, mut ada) = signed_in("ada").await;
        let bob_user = repo.store().insert_user(new_user("bob")).await.unwrap();
        let mut bob = SessionData::default();
        bob.sign_in(bob_user.id);

        let own = repo.create_project(&mut ada, "Ada's").await.unwrap();
        let foreign = repo.create_project(&mut bob, "Bob's").await.unwrap();
        ada.take_flash();

        let err = repo.select_project(&mut ada, foreign.id).await.unwrap_err();
        assert_eq!(err, DiagramError::NotAuthorized);
        assert_eq!(ada.project_id, Some(own.id));
        assert_eq!(ada.take_flash().as_deref(), Some("Invalid project selected."));

        let err = repo
            .select_project(&mut ada, ProjectId(9_999))
            .await
            .unwrap_err();
        assert_eq!(err, DiagramError::NotAuthorized);
        assert_eq!(ada.project_id, Some(own.id));
    }

    #[tokio::test]
    async fn test_select_own_project() {
        let (repo, mut session) = signed_in("ada").await;
        let first = repo.create_project(&mut session, "First").await.unwrap();
        repo.create_project(&mut session, "Second").await.unwrap();

        let selected = repo.select_project(&mut session, first.id).await.unwrap();
        assert_eq!(selected, first);
        assert_eq!(session.project_id, Some(first.id));
        assert_eq!(session.take_flash().as_deref(), Some("Project selected."));
    }

    #[tokio::test]
    async fn test_user_cannot_load_or_save_foreign_project() {
        let (repo, mut ada) = signed_in("ada").await;
        let bob_user = repo.store().insert_user(new_user("bob")).await.unwrap();
        let mut bob = SessionData::default();
        bob.sign_in(bob_user.id);

        let project = repo.create_project(&mut ada, "Private").await.unwrap();
        repo.save_classes(&ada, vec![uml_class("User", 1.0, 2.0)])
            .await
            .unwrap();

        // Forge bob's session to point at ada's project.
        bob.project_id = Some(project.id);
        assert_eq!(
            repo.load_classes(&bob).await.unwrap_err(),
            DiagramError::NotAuthorized
        );
        assert_eq!(
            repo.save_classes(&bob, vec![]).await.unwrap_err(),
            DiagramError::NotAuthorized
        );

        // Ada's diagram is untouched.
        assert_eq!(repo.load_classes(&ada).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_project_selected() {
        let (repo, session) = signed_in("ada").await;
        assert_eq!(
            repo.load_classes(&session).await.unwrap_err(),
            DiagramError::NoProject
        );
        assert_eq!(
            repo.save_classes(&session, vec![]).await.unwrap_err(),
            DiagramError::NoProject
        );
    }

    #[tokio::test]
    async fn test_save_empty_then_load() {
        let (repo, mut session) = signed_in("ada").await;
        repo.create_project(&mut session, "Empty").await.unwrap();

        let saved = repo.save_classes(&session, vec![]).await.unwrap();
        assert_eq!(saved.classes, 0);
        assert!(repo.load_classes(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order_and_positions() {
        let (repo, mut session) = signed_in("ada").await;
        let project = repo.create_project(&mut session, "Shop").await.unwrap();

        let classes = vec![
            uml_class("Order", 12.75, 300.5),
            uml_class("Customer", -40.125, 0.0),
            uml_class("Invoice", 1e-3, 1024.0),
        ];
        let saved = repo.save_classes(&session, classes.clone()).await.unwrap();
        assert_eq!(saved, crate::repo::SavedDiagram { project: project.id, classes: 3 });

        assert_eq!(repo.load_classes(&session).await.unwrap(), classes);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_set() {
        let (repo, mut session) = signed_in("ada").await;
        repo.create_project(&mut session, "Shop").await.unwrap();

        repo.save_classes(&session, vec![uml_class("A", 0.0, 0.0), uml_class("B", 1.0, 1.0)])
            .await
            .unwrap();
        repo.save_classes(&session, vec![uml_class("C", 2.0, 2.0)])
            .await
            .unwrap();

        let loaded = repo.load_classes(&session).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].class_name, "C");
    }

    #[tokio::test]
    async fn test_save_keeps_members_as_entered() {
        let (repo, mut session) = signed_in("ada").await;
        repo.create_project(&mut session, "Shop").await.unwrap();

        let raw = ClassBox {
            class_name: " Order ".to_string(),
            properties: vec!["".to_string(), " id ".to_string()],
            methods: vec!["ship() ".to_string(), "   ".to_string()],
            x: 5.0,
            y: 6.0,
        };
        repo.save_classes(&session, vec![raw.clone()]).await.unwrap();

        let loaded = repo.load_classes(&session).await.unwrap();
        assert_eq!(
            loaded,
            vec![ClassBox {
                class_name: "Order".to_string(),
                ..raw
            }]
        );
    }

    #[tokio::test]
    async fn test_save_names_blank_classes() {
        let (repo, mut session) = signed_in("ada").await;
        repo.create_project(&mut session, "Shop").await.unwrap();

        let blank = ClassBox {
            class_name: "  ".to_string(),
            properties: vec![String::new()],
            ..ClassBox::default()
        };
        repo.save_classes(&session, vec![blank]).await.unwrap();

        let loaded = repo.load_classes(&session).await.unwrap();
        assert_eq!(loaded[0].class_name, "Class");
        assert_eq!(loaded[0].properties, vec![String::new()]);
    }

    #[tokio::test]
    async fn test_save_rejects_non_finite_position() {
        let (repo, mut session) = signed_in("ada").await;
        repo.create_project(&mut session, "Shop").await.unwrap();
        repo.save_classes(&session, vec![uml_class("Keep", 1.0, 1.0)])
            .await
            .unwrap();

        let err = repo
            .save_classes(&session, vec![uml_class("Bad", f64::NAN, 0.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DiagramError::InvalidInput(_)));
        assert_eq!(repo.load_classes(&session).await.unwrap()[0].class_name, "Keep");
    }

    #[tokio::test]
    async fn test_failed_save_leaves_previous_set_intact() {
        let (repo, mut session) = signed_in("ada").await;
        repo.create_project(&mut session, "Shop").await.unwrap();

        let original = vec![uml_class("Order", 10.0, 20.0), uml_class("Item", 30.0, 40.0)];
        repo.save_classes(&session, original.clone()).await.unwrap();

        repo.store().fail_class_writes_after(1);
        let err = repo
            .save_classes(
                &session,
                vec![
                    uml_class("X", 0.0, 0.0),
                    uml_class("Y", 0.0, 0.0),
                    uml_class("Z", 0.0, 0.0),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DiagramError::Storage(StoreError::Backend(_))));
        assert_eq!(repo.load_classes(&session).await.unwrap(), original);

        repo.store().heal();
        repo.save_classes(&session, vec![uml_class("X", 0.0, 0.0)])
            .await
            .unwrap();
        assert_eq!(repo.load_classes(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_active_project_clears_stale_id() {
        let (repo, mut session) = signed_in("ada").await;
        assert_eq!(repo.active_project(&mut session).await.unwrap(), None);

        let project = repo.create_project(&mut session, "Shop").await.unwrap();
        assert_eq!(
            repo.active_project(&mut session).await.unwrap(),
            Some(project)
        );

        session.project_id = Some(ProjectId(404));
        assert_eq!(repo.active_project(&mut session).await.unwrap(), None);
        assert_eq!(session.project_id, None);
    }

    #[tokio::test]
    async fn test_projects_are_scoped_to_owner() {
        let (repo, mut ada) = signed_in("ada").await;
        let bob_user = repo.store().insert_user(new_user("bob")).await.unwrap();
        let mut bob = SessionData::default();
        bob.sign_in(bob_user.id);

        repo.create_project(&mut ada, "A1").await.unwrap();
        repo.create_project(&mut ada, "A2").await.unwrap();
        repo.create_project(&mut bob, "B1").await.unwrap();

        let names: Vec<String> = repo
            .list_projects(&ada)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["A1".to_string(), "A2".to_string()]);
        assert_eq!(repo.list_projects(&bob).await.unwrap().len(), 1);
    }
}
