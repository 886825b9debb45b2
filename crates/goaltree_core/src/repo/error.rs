//! Repository error type shared by goal tree persistence.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from goal tree persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Row exists but its version moved since it was read.
    VersionConflict {
        entity: &'static str,
        id: Uuid,
        expected_version: i64,
    },
    /// Persisted data cannot be converted to a valid domain record.
    InvalidData(String),
}

impl RepoError {
    /// Returns whether this failure comes from concurrent writers rather
    /// than a broken store: version mismatch or SQLite lock timeout.
    pub fn is_contention(&self) -> bool {
        match self {
            Self::VersionConflict { .. } => true,
            Self::Db(err) => err.is_busy(),
            Self::NotFound { .. } | Self::InvalidData(_) => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::VersionConflict {
                entity,
                id,
                expected_version,
            } => write!(
                f,
                "{entity} {id} was modified concurrently (expected version {expected_version})"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted goal tree data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::VersionConflict { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
