use thiserror::Error;

#[derive(Error, Debug)]
pub enum HunterError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("page structure not recognized: {0}")]
    Parse(String),

    #[error("record field missing or malformed: {0}")]
    Field(String),

    #[error("state storage failed: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HunterError>;
