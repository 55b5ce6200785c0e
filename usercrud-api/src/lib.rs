//! # Usercrud API Server Library
//!
//! HTTP resource layer for the user-management service.
//!
//! ## Modules
//!
//! - `app`: Application state, backend wiring and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
