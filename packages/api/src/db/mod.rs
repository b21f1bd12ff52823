//! # Database module: PostgreSQL persistence
//!
//! Gated behind `#[cfg(feature = "server")]` so client (WASM) builds never pull
//! in SQLx or Tokio networking code.
//!
//! - [`get_pool`]: returns `&'static PgPool`, initialising it on first use.
//! - [`PgDiagramStore`]: the [`store::DiagramStore`] used by every server function.
//! - [`seed_initial_user`]: creates the configured account when no user exists.
//! - [`MIGRATOR`]: the embedded schema migrations in `migrations/`.

#[cfg(feature = "server")]
mod pg_store;
#[cfg(feature = "server")]
mod pool;

#[cfg(feature = "server")]
pub use pg_store::PgDiagramStore;
#[cfg(feature = "server")]
pub use pool::get_pool;

#[cfg(feature = "server")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Repository over the shared pool.
#[cfg(feature = "server")]
pub async fn repository() -> Result<store::Repository<PgDiagramStore>, sqlx::Error> {
    let pool = get_pool().await?;
    Ok(store::Repository::new(PgDiagramStore::new(pool.clone())))
}

/// Why the first-run account could not be created.
#[cfg(feature = "server")]
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("database unavailable: {0}")]
    Pool(#[from] sqlx::Error),
    #[error(transparent)]
    Store(#[from] store::StoreError),
    #[error(transparent)]
    Repository(#[from] store::DiagramError),
    #[error(transparent)]
    Password(#[from] crate::auth::PasswordError),
}

/// Insert the seed account from settings if the users table is empty.
#[cfg(feature = "server")]
pub async fn seed_initial_user(
    seed: &crate::settings::Seed,
) -> Result<Option<store::UserAccount>, SeedError> {
    use store::DiagramStore;

    let repo = repository().await?;
    if repo.store().user_count().await? > 0 {
        return Ok(None);
    }
    let user = store::NewUser {
        name: seed.name.clone(),
        email: seed.email.clone(),
        username: seed.username.clone(),
        password_hash: crate::auth::hash_password(&seed.password)?,
    };
    Ok(repo.seed_user(user).await?)
}
