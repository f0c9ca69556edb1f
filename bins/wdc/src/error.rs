#[derive(Debug, thiserror::Error)]
pub enum WdcError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("{0}")]
    Store(#[from] alert_store::StoreError),

    #[error("decode alert: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("feed: {0}")]
    Feed(String),

    #[error("api: {0}")]
    Api(String),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
