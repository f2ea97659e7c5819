use taskman_core::AppError;

/// Translate a sqlx failure into the application error space.
///
/// Constraint violations are client conflicts: a duplicate unique value, or a
/// reference to a row that is missing or still in use.
pub(crate) fn map_sqlx(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        let constraint = db.constraint().unwrap_or("unknown").to_string();
        if db.is_unique_violation() {
            return AppError::Conflict(format!("Duplicate value violates {constraint}"));
        }
        if db.is_foreign_key_violation() {
            return AppError::Conflict(format!(
                "Referenced row is missing or still in use ({constraint})"
            ));
        }
    }
    tracing::error!(error = %err, "Database operation failed");
    AppError::DatabaseError(err.to_string())
}
