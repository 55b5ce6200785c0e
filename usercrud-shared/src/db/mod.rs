/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: schema migration runner
///
/// The SQL for user rows lives in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
