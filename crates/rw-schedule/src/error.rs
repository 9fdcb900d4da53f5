use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid scheduler config: {0}")]
    Config(String),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
