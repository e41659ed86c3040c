//! Local study store: one SQLite file with `subjects`, `tasks` and `sessions`.

pub(crate) mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{Priority, Session, Subject, Task};
