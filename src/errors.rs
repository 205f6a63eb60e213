use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchTrendError {
    #[error("io error: {0}")]
    IoError(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl BenchTrendError {
    pub fn io<T: Into<String>>(msg: T) -> Self {
        BenchTrendError::IoError(msg.into())
    }

    pub fn parse<T: Into<String>>(msg: T) -> Self {
        BenchTrendError::ParseError(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        BenchTrendError::InvalidInput(msg.into())
    }
}
