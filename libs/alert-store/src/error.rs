#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("log with id '{id}' not found")]
    NotFound { id: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io { context: context.into(), source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
