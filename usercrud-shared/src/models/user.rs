/// User model and input types
///
/// This module defines the `User` record and the payloads used to create and
/// update it. Persistence lives in [`crate::store`]; this module only knows the
/// shape of the data and the field rules every write must satisfy.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id         SERIAL PRIMARY KEY,
///     email      TEXT NOT NULL,
///     first_name TEXT NOT NULL,
///     last_name  TEXT NOT NULL,
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
///
/// # Wire format
///
/// Field names are camelCase on the wire:
///
/// ```json
/// { "id": 1, "email": "a@x.com", "firstName": "A", "lastName": "B" }
/// ```
///
/// # Example
///
/// ```
/// use usercrud_shared::models::user::{CreateUser, UpdateUser};
/// use validator::{Validate, ValidationError};
///
/// let new_user = CreateUser {
///     email: "ada@example.com".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
/// };
/// assert!(new_user.validate().is_ok());
///
/// let rename = UpdateUser {
///     last_name: Some("King".to_string()),
///     ..Default::default()
/// };
/// assert!(rename.validate().is_ok());
/// ```

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Identifier type for users (`SERIAL` column)
pub type UserId = i32;

/// A live user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// System-assigned ID, never changes after creation
    pub id: UserId,

    /// Email address
    ///
    /// Unique across all live users (exact match)
    pub email: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,
}

/// Input for creating a new user
///
/// All fields are required and must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(
        length(min = 1, message = "Email cannot be empty"),
        email(message = "Email must be a valid email address"),
        custom(
            function = "validate_email_domain",
            message = "Email must be a valid email address"
        )
    )]
    pub email: String,

    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: String,
}

/// Input for updating an existing user
///
/// All fields are optional. Only `Some` fields are written, and they follow
/// the same rules as [`CreateUser`], so an empty string is rejected rather
/// than overwriting a stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(
        length(min = 1, message = "Email cannot be empty"),
        email(message = "Email must be a valid email address"),
        custom(
            function = "validate_email_domain",
            message = "Email must be a valid email address"
        )
    )]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
}

/// Requires a fully qualified domain after the `@`
///
/// The `email` rule alone accepts `a@localhost` and `a@x`. Here the domain
/// must have at least two labels, none empty, and a top-level label of two
/// or more letters (or an `xn--` punycode label). Values without an `@` are
/// left to the `email` rule.
fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return Ok(());
    };

    let labels: Vec<&str> = domain.split('.').collect();
    let tld = labels.last().copied().unwrap_or_default();

    let tld_ok = tld.starts_with("xn--")
        || (tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic));

    if labels.len() >= 2 && labels.iter().all(|label| !label.is_empty()) && tld_ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_domain");
        err.message = Some("Email must be a valid email address".into());
        Err(err)
    }
}

impl User {
    /// Builds a record from creation input and a freshly assigned ID
    pub fn from_create(id: UserId, data: CreateUser) -> Self {
        Self {
            id,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
        }
    }
}

impl UpdateUser {
    /// Returns true when no field would change
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }

    /// Shallow-merges the present fields onto `user`
    ///
    /// The `id` is never touched.
    pub fn apply_to(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
    }
}
