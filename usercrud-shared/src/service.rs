/// User service
///
/// Validated reads and writes of users over any [`UserStore`]. This is the
/// layer that turns storage outcomes into the domain error taxonomy:
///
/// | Outcome | Error |
/// |---|---|
/// | input breaks a field rule | [`UserError::Validation`] |
/// | email already taken | [`UserError::Conflict`] |
/// | unknown ID | [`UserError::NotFound`] |
/// | store failure | [`UserError::Internal`] |
///
/// Input is validated before the store is touched, so invalid writes never
/// reach the database.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use usercrud_shared::models::user::CreateUser;
/// use usercrud_shared::service::{UserError, UserService};
/// use usercrud_shared::store::memory::InMemoryUserStore;
///
/// # async fn example() -> Result<(), UserError> {
/// let service = UserService::new(Arc::new(InMemoryUserStore::new()));
///
/// let user = service
///     .create(CreateUser {
///         email: "a@x.com".to_string(),
///         first_name: "A".to_string(),
///         last_name: "B".to_string(),
///     })
///     .await?;
///
/// service.delete(user.id).await?;
/// assert!(matches!(service.get(user.id).await, Err(UserError::NotFound(_))));
/// # Ok(())
/// # }
/// ```

use crate::models::user::{CreateUser, UpdateUser, User, UserId};
use crate::store::{StoreError, UserStore};
use std::sync::Arc;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

/// Message returned when a new user's email is taken
pub const DUPLICATE_EMAIL_ON_CREATE: &str = "Email address already exists.";

/// Message returned when an update would take another user's email
pub const DUPLICATE_EMAIL_ON_UPDATE: &str = "Email address already exists for another user.";

/// Domain error types
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Input failed field validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Email uniqueness would be violated
    #[error("{0}")]
    Conflict(String),

    /// No live user with this ID
    #[error("User with ID {0} not found")]
    NotFound(UserId),

    /// Unexpected store failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Service result type alias
pub type UserResult<T> = Result<T, UserError>;

/// Converts a store error, using `conflict_message` for duplicate emails
fn from_store(err: StoreError, conflict_message: &str) -> UserError {
    match err {
        StoreError::DuplicateEmail(_) => UserError::Conflict(conflict_message.to_string()),
        err @ StoreError::IdsExhausted => UserError::Internal(err.to_string()),
        StoreError::Database(e) => UserError::Internal(e.to_string()),
    }
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        from_store(err, DUPLICATE_EMAIL_ON_CREATE)
    }
}

/// User operations over a shared store
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    /// Creates a service over `store`
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Creates a user
    ///
    /// # Errors
    ///
    /// - [`UserError::Validation`] if a field is empty or the email is malformed
    /// - [`UserError::Conflict`] if the email belongs to a live user
    pub async fn create(&self, data: CreateUser) -> UserResult<User> {
        data.validate()?;

        let user = self
            .store
            .create(data)
            .await
            .map_err(|e| from_store(e, DUPLICATE_EMAIL_ON_CREATE))?;

        info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Lists all users
    pub async fn list(&self) -> UserResult<Vec<User>> {
        let users = self.store.list().await?;
        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Fetches one user
    ///
    /// # Errors
    ///
    /// [`UserError::NotFound`] if no live user has this ID
    pub async fn get(&self, id: UserId) -> UserResult<User> {
        self.store.get(id).await?.ok_or(UserError::NotFound(id))
    }

    /// Applies a partial update
    ///
    /// Fields left as `None` keep their stored value. An empty update returns
    /// the user unchanged.
    ///
    /// # Errors
    ///
    /// - [`UserError::Validation`] if a supplied field is empty or malformed
    /// - [`UserError::NotFound`] if no live user has this ID
    /// - [`UserError::Conflict`] if the new email belongs to another user
    pub async fn update(&self, id: UserId, data: UpdateUser) -> UserResult<User> {
        data.validate()?;

        if data.is_empty() {
            return self.get(id).await;
        }

        let user = self
            .store
            .update(id, data)
            .await
            .map_err(|e| from_store(e, DUPLICATE_EMAIL_ON_UPDATE))?
            .ok_or(UserError::NotFound(id))?;

        info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Deletes a user permanently
    ///
    /// # Errors
    ///
    /// [`UserError::NotFound`] if no live user has this ID
    pub async fn delete(&self, id: UserId) -> UserResult<()> {
        if !self.store.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Checks store connectivity
    pub async fn ping(&self) -> UserResult<()> {
        self.store.ping().await?;
        Ok(())
    }
}
