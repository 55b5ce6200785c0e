/// Data models
///
/// - `user`: the `User` record and its create/update inputs

pub mod user;
