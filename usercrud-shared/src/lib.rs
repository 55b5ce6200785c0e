//! # Usercrud Shared Library
//!
//! Persistence for the user-management service: the `User` model, the
//! `UserStore` storage interface with PostgreSQL and in-memory backends, and
//! the `UserService` that enforces validation and maps storage outcomes to
//! domain errors.
//!
//! ## Module Organization
//!
//! - `models`: data structures and field rules
//! - `store`: storage interface and backends
//! - `service`: validated CRUD operations and the domain error type
//! - `db`: connection pool and migrations

pub mod db;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
