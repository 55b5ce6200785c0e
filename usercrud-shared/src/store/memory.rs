/// In-memory user store
///
/// Keeps rows in a `BTreeMap` keyed by ID plus an email index, both behind a
/// single `RwLock`. Writers hold the write guard across the uniqueness check
/// and the mutation, which plays the role of the unique index in the
/// PostgreSQL store. IDs start at 1 and are never reused; once `i32::MAX`
/// has been handed out, further creates fail like an exhausted `SERIAL`.

use super::{StoreError, StoreResult, UserStore};
use crate::models::user::{CreateUser, UpdateUser, User, UserId};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug)]
struct Inner {
    /// `None` once every ID has been assigned
    next_id: Option<UserId>,
    users: BTreeMap<UserId, User>,
    /// email -> owning user ID
    emails: HashMap<String, UserId>,
}

/// User store held entirely in process memory
#[derive(Debug)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: Some(1),
                users: BTreeMap::new(),
                emails: HashMap::new(),
            }),
        }
    }

    /// Number of live users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Returns true if the store holds no users
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        if inner.emails.contains_key(&data.email) {
            return Err(StoreError::DuplicateEmail(data.email));
        }

        let id = inner.next_id.ok_or(StoreError::IdsExhausted)?;
        inner.next_id = id.checked_add(1);

        let user = User::from_create(id, data);
        inner.emails.insert(user.email.clone(), id);
        inner.users.insert(id, user.clone());

        debug!(user_id = id, "Inserted user into memory store");
        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().cloned().collect())
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn update(&self, id: UserId, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;

        let Some(existing) = inner.users.get(&id) else {
            return Ok(None);
        };

        let mut merged = existing.clone();
        data.apply_to(&mut merged);

        if merged.email != existing.email {
            if inner.emails.contains_key(&merged.email) {
                return Err(StoreError::DuplicateEmail(merged.email));
            }
            let old_email = existing.email.clone();
            inner.emails.remove(&old_email);
            inner.emails.insert(merged.email.clone(), id);
        }

        inner.users.insert(id, merged.clone());

        debug!(user_id = id, "Updated user in memory store");
        Ok(Some(merged))
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;

        match inner.users.remove(&id) {
            Some(user) => {
                inner.emails.remove(&user.email);
                debug!(user_id = id, "Removed user from memory store");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
