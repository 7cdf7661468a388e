use thiserror::Error;

#[derive(Error, Debug)]
pub enum SerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream ended before a structurally required field was fully read.
    #[error("truncated SER data: {context} requires {expected} bytes, {actual} available")]
    Truncated {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Bytes are present but violate a fixed invariant of the format.
    #[error("invalid SER file: {0}")]
    Format(String),

    /// Caller-supplied data violates a cross-entity invariant before encode.
    #[error("validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, SerError>;
