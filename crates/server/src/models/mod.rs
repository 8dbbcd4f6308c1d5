//! Records persisted by the server that have no place in the core crate.

pub mod user;

pub use user::UserRecord;
