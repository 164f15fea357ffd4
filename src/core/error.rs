use thiserror::Error;

use crate::core::types::{BuildingId, CityId, PersonId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Person not found: {0:?}")]
    UnknownPerson(PersonId),

    #[error("Building not found: {0:?}")]
    UnknownBuilding(BuildingId),

    #[error("City not found: {0:?}")]
    UnknownCity(CityId),

    #[error("Another advance is in progress on this world; retry")]
    Conflict,

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
