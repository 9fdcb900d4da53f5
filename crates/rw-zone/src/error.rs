use rw_core::{RoomId, ZoneId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ZoneError {
    #[error("zone {0} is not defined")]
    UnknownZone(ZoneId),

    #[error("zone {0} is defined twice")]
    DuplicateZone(ZoneId),

    #[error("room {0} is mapped to more than one zone")]
    DuplicateMapping(RoomId),
}

pub type ZoneResult<T> = Result<T, ZoneError>;
