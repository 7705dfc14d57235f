//! Database error type

/// Repository error.
///
/// Constraint violations are classified from the SQLSTATE so callers can
/// map them to client errors instead of 500s.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[source] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Unique constraint violation (SQLSTATE 23505)
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Foreign key violation (SQLSTATE 23503)
    #[error("unknown reference: {message}")]
    UnknownReference { message: String },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict {
                    message: db.message().to_owned(),
                };
            }
            if db.is_foreign_key_violation() {
                return Self::UnknownReference {
                    message: db.message().to_owned(),
                };
            }
        }
        Self::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_sqlx() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn not_found_display() {
        let err = DbError::not_found("book", "Hezekiah");
        assert_eq!(err.to_string(), "not found: book 'Hezekiah'");
    }
}
