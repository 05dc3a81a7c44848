use super::models::EntityKind;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique or foreign key constraint other than the natural key rejected
    /// the insert, e.g. two different `source_id`s sharing a display name.
    #[error("{entity} {natural_key} conflicts with an existing record: {detail}")]
    IntegrityConflict {
        entity: EntityKind,
        natural_key: String,
        detail: String,
    },

    #[error("{entity} {id} is still referenced and cannot be deleted")]
    Restricted { entity: EntityKind, id: i64 },

    #[error("Schema error: {0:#}")]
    Schema(anyhow::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn is_integrity_conflict(&self) -> bool {
        matches!(self, StoreError::IntegrityConflict { .. })
    }

    /// Maps constraint violations raised while inserting `entity` to
    /// [`StoreError::IntegrityConflict`], anything else to `Sqlite`.
    pub(super) fn from_insert(
        error: rusqlite::Error,
        entity: EntityKind,
        natural_key: impl ToString,
    ) -> Self {
        match constraint_message(&error) {
            Some(detail) => StoreError::IntegrityConflict {
                entity,
                natural_key: natural_key.to_string(),
                detail,
            },
            None => StoreError::Sqlite(error),
        }
    }

    /// Maps a foreign key violation raised while deleting `entity` to
    /// [`StoreError::Restricted`].
    pub(super) fn from_delete(error: rusqlite::Error, entity: EntityKind, id: i64) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                StoreError::Restricted { entity, id }
            }
            _ => StoreError::Sqlite(error),
        }
    }
}

fn constraint_message(error: &rusqlite::Error) -> Option<String> {
    match error {
        rusqlite::Error::SqliteFailure(e, message) if e.code == ErrorCode::ConstraintViolation => {
            Some(
                message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            )
        }
        _ => None,
    }
}
