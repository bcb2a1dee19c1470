pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("diagram JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("diagram I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("class #{index} has no `id`")]
    MissingClassId { index: usize },

    #[error("duplicate class id: {id}")]
    DuplicateClassId { id: String },
}
