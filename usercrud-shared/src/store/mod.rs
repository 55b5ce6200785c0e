/// Storage interface for user records
///
/// `UserStore` is the narrow seam between the service layer and whatever
/// holds the rows. Implementations must enforce email uniqueness themselves,
/// in the same step as the write, so that two concurrent writers can never
/// both claim one address.
///
/// # Implementations
///
/// - [`postgres::PgUserStore`]: PostgreSQL via sqlx, relies on the
///   `users_email_key` unique index
/// - [`memory::InMemoryUserStore`]: single-writer in-process map, used by
///   tests and for running without a database
///
/// # Example
///
/// ```
/// use usercrud_shared::models::user::CreateUser;
/// use usercrud_shared::store::{memory::InMemoryUserStore, StoreError, UserStore};
///
/// # async fn example() -> Result<(), StoreError> {
/// let store = InMemoryUserStore::new();
/// let user = store
///     .create(CreateUser {
///         email: "ada@example.com".to_string(),
///         first_name: "Ada".to_string(),
///         last_name: "Lovelace".to_string(),
///     })
///     .await?;
///
/// assert_eq!(store.get(user.id).await?, Some(user));
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use crate::models::user::{CreateUser, UpdateUser, User, UserId};
use async_trait::async_trait;

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Write would give two live users the same email
    #[error("Email already in use: {0}")]
    DuplicateEmail(String),

    /// No IDs left to assign
    #[error("User ID space exhausted")]
    IdsExhausted,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for users
///
/// Lookups by ID return `Option`/`bool` rather than an error so that callers
/// decide how a missing row is reported.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user and assigns its ID
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create(&self, data: CreateUser) -> StoreResult<User>;

    /// Returns every live user in ascending ID order
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Looks up a user by ID
    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Merges `data` onto the user with the given ID
    ///
    /// Returns `Ok(None)` if no such user exists. Fails with
    /// [`StoreError::DuplicateEmail`] if the merged email belongs to a
    /// different user.
    async fn update(&self, id: UserId, data: UpdateUser) -> StoreResult<Option<User>>;

    /// Removes a user permanently
    ///
    /// Returns true if a row was deleted, false if the ID was unknown.
    async fn delete(&self, id: UserId) -> StoreResult<bool>;

    /// Checks that the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;
}
