//! Durable alert log: one human-readable file per calendar day, appended by a
//! single [`DailyLogWriter`] and searched by id with [`LogSearcher`].

pub mod config;
pub mod error;
pub mod layout;
pub mod record;
mod searcher;
mod writer;

pub use config::StoreConfig;
pub use error::StoreError;
pub use record::{AlertRecord, Status};
pub use searcher::{find, LogSearcher};
pub use writer::DailyLogWriter;
