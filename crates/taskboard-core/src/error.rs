use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be opened at all. Fatal to
    /// initialization: the application must not render board data.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An operation was invoked before the store connection or the
    /// selection pointer was established.
    #[error("not ready: {0}")]
    NotReady(String),

    /// A referenced board, column, task, or subtask does not exist at
    /// mutation time (stale in-memory reference).
    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
