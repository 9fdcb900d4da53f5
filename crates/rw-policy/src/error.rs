use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid move context: {0}")]
    InvalidContext(&'static str),

    #[error("policy configuration error: {0}")]
    Config(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
