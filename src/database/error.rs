use thiserror::Error;

/// Errors from the primary database, the fallback document, or the adapter choosing between them
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{label} com ID {id} já existe.")]
    Conflict { label: &'static str, id: i64 },

    #[error("{label} não encontrado.")]
    NotFound { label: &'static str, id: i64 },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Corrupt fallback document: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
