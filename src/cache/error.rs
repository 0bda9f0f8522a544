use thiserror::Error;

use crate::domain::DomainError;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to snapshot {kind} `{id}` for caching")]
    Snapshot {
        kind: &'static str,
        id: String,
        #[source]
        source: DomainError,
    },
    #[error("cache sweep requires a running tokio runtime")]
    SchedulerUnavailable,
}

impl CacheError {
    pub fn snapshot(kind: &'static str, id: impl Into<String>, source: DomainError) -> Self {
        Self::Snapshot {
            kind,
            id: id.into(),
            source,
        }
    }
}
