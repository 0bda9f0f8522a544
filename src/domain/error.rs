use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{kind} `{id}` has been disposed")]
    Disposed { kind: &'static str, id: String },
    #[error("{kind} `{id}` is invalid: {message}")]
    Invalid {
        kind: &'static str,
        id: String,
        message: String,
    },
}

impl DomainError {
    pub fn disposed(kind: &'static str, id: impl Into<String>) -> Self {
        Self::Disposed {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(kind: &'static str, id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            id: id.into(),
            message: message.into(),
        }
    }
}
