use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmberError {
    #[error("Unknown settlement: {0}")]
    UnknownSettlement(String),

    #[error("Unknown resource kind: {0}")]
    UnknownResource(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Scenario parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EmberError>;
