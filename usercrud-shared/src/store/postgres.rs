/// PostgreSQL-backed user store
///
/// Every write is a single statement with `RETURNING`, so the uniqueness
/// check is done by the `users_email_key` index at write time. A violation
/// surfaces as SQLSTATE `23505` and is mapped to
/// [`StoreError::DuplicateEmail`].
///
/// # Example
///
/// ```no_run
/// use usercrud_shared::db::pool::{create_pool, DatabaseConfig};
/// use usercrud_shared::store::{postgres::PgUserStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgUserStore::new(pool);
/// for user in store.list().await? {
///     println!("{} {}", user.id, user.email);
/// }
/// # Ok(())
/// # }
/// ```

use super::{StoreError, StoreResult, UserStore};
use crate::db::pool;
use crate::models::user::{CreateUser, UpdateUser, User, UserId};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

/// User store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique-index violations to `DuplicateEmail`, everything else to `Database`
fn map_write_error(err: sqlx::Error, email: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateEmail(email.unwrap_or_default().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let email = data.email.clone();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, last_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, first_name, last_name
            "#,
        )
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, Some(&email)))?;

        debug!(user_id = user.id, "Inserted user row");
        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, id: UserId, data: UpdateUser) -> StoreResult<Option<User>> {
        // Absent fields bind as NULL and keep the stored value
        let email = data.email.clone();

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email      = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name  = COALESCE($4, last_name)
            WHERE id = $1
            RETURNING id, email, first_name, last_name
            "#,
        )
        .bind(id)
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, email.as_deref()))?;

        debug!(user_id = id, found = user.is_some(), "Updated user row");
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(user_id = id, rows_affected = result.rows_affected(), "Deleted user row");
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        pool::health_check(&self.pool).await?;
        Ok(())
    }
}
