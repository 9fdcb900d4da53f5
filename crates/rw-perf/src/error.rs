use rw_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerfError {
    #[error("routing failed: {0}")]
    Routing(#[from] SpatialError),
}

pub type PerfResult<T> = Result<T, PerfError>;
