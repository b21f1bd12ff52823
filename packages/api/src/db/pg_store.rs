//! PostgreSQL-backed [`DiagramStore`].

use sqlx::{FromRow, PgPool};
use store::{
    ClassBox, DiagramStore, NewUser, ProjectId, ProjectInfo, StoreError, UserAccount, UserId,
};

/// Database backed user
#[derive(FromRow)]
struct SqlUser {
    id: i64,
    name: String,
    email: String,
    username: String,
    password_hash: String,
}

impl SqlUser {
    fn into_account(self) -> UserAccount {
        UserAccount {
            id: UserId(self.id),
            name: self.name,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct SqlProject {
    id: i64,
    name: String,
}

impl SqlProject {
    fn into_info(self) -> ProjectInfo {
        ProjectInfo {
            id: ProjectId(self.id),
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct SqlClass {
    class_name: String,
    properties: Vec<String>,
    methods: Vec<String>,
    pos_x: f64,
    pos_y: f64,
}

impl SqlClass {
    fn into_class(self) -> ClassBox {
        ClassBox {
            class_name: self.class_name,
            properties: self.properties,
            methods: self.methods,
            x: self.pos_x,
            y: self.pos_y,
        }
    }
}

fn store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            StoreError::Constraint(db.message().to_string())
        }
        other => {
            tracing::error!("database error: {}", other);
            StoreError::Backend(other.to_string())
        }
    }
}

/// [`DiagramStore`] over a PostgreSQL pool.
#[derive(Clone, Debug)]
pub struct PgDiagramStore {
    pool: PgPool,
}

impl PgDiagramStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DiagramStore for PgDiagramStore {
    async fn user_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(count.max(0) as u64)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let row: SqlUser = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, username, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, username, password_hash
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.into_account())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let row: Option<SqlUser> = sqlx::query_as(
            "SELECT id, name, email, username, password_hash FROM users WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(SqlUser::into_account))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let row: Option<SqlUser> = sqlx::query_as(
            "SELECT id, name, email, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(SqlUser::into_account))
    }

    async fn insert_project(&self, owner: UserId, name: &str) -> Result<ProjectInfo, StoreError> {
        let row: SqlProject = sqlx::query_as(
            "INSERT INTO projects (user_id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(owner.0)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.into_info())
    }

    async fn list_projects(&self, owner: UserId) -> Result<Vec<ProjectInfo>, StoreError> {
        let rows: Vec<SqlProject> =
            sqlx::query_as("SELECT id, name FROM projects WHERE user_id = $1 ORDER BY id")
                .bind(owner.0)
                .fetch_all(&self.pool)
                .await
                .map_err(store_error)?;
        Ok(rows.into_iter().map(SqlProject::into_info).collect())
    }

    async fn find_owned_project(
        &self,
        owner: UserId,
        project: ProjectId,
    ) -> Result<Option<ProjectInfo>, StoreError> {
        let row: Option<SqlProject> =
            sqlx::query_as("SELECT id, name FROM projects WHERE id = $1 AND user_id = $2")
                .bind(project.0)
                .bind(owner.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error)?;
        Ok(row.map(SqlProject::into_info))
    }

    async fn replace_classes(
        &self,
        project: ProjectId,
        classes: &[ClassBox],
    ) -> Result<(), StoreError> {
        // Dropping `tx` without commit rolls everything back.
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        sqlx::query("DELETE FROM classes WHERE project_id = $1")
            .bind(project.0)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        for (ordinal, class) in classes.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO classes (project_id, ordinal, class_name, properties, methods, pos_x, pos_y)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(project.0)
            .bind(ordinal as i32)
            .bind(&class.class_name)
            .bind(&class.properties)
            .bind(&class.methods)
            .bind(class.x)
            .bind(class.y)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)?;
        Ok(())
    }

    async fn list_classes(&self, project: ProjectId) -> Result<Vec<ClassBox>, StoreError> {
        let rows: Vec<SqlClass> = sqlx::query_as(
            r#"
            SELECT class_name, properties, methods, pos_x, pos_y
            FROM classes
            WHERE project_id = $1
            ORDER BY ordinal
            "#,
        )
        .bind(project.0)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(rows.into_iter().map(SqlClass::into_class).collect())
    }
}
