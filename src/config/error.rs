use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigFileError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Duplicate chain key: {0}")]
    DuplicateKey(String),
    #[error("Unable to read config file: {0}")]
    FileRead(String),
    #[error("Unable to parse config file: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        ConfigFileError::FileRead(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigFileError {
    fn from(err: serde_json::Error) -> Self {
        ConfigFileError::Parse(err.to_string())
    }
}
