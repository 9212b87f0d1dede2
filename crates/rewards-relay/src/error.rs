use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay {endpoint} rejected transaction. status {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("relay request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },
}

impl RelayError {
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } => Some(body),
            Self::Transport { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
