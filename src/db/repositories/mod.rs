pub mod category;
pub mod favorite;
pub mod media;
pub mod movie;
pub mod rating;
pub mod series;
pub mod user;
pub mod watch_history;
pub mod watchlist;

use sea_orm::{DbErr, SqlErr};

/// Result of an insert guarded by a unique constraint.
#[derive(Debug, Clone)]
pub enum InsertOutcome<T> {
    Created(T),
    /// The constraint rejected the insert; carries the row already stored
    Existing(T),
}

/// Result of an atomic insert-or-update.
#[derive(Debug, Clone)]
pub struct Upserted<T> {
    pub model: T,
    pub created: bool,
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
