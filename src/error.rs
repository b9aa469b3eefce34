use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Malformed VCD header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("Value change at line {line} references undeclared identifier '{id}'")]
    UnknownSignalReference { line: usize, id: String },

    #[error("Invalid value at line {line}: {reason}")]
    ValueFormat { line: usize, reason: String },

    #[error("Timestamp moves backward at line {line}: #{new} after #{last}")]
    TimeOrdering { line: usize, last: u64, new: u64 },

    #[error("Invalid filter pattern")]
    Pattern(#[from] regex::Error),

    #[error("Named signal '{0:}' not found")]
    SignalNotFound(String),

    #[error("Conversion tool '{0:}' not found in PATH")]
    ConversionToolUnavailable(String),

    #[error("Conversion tool '{tool}' failed (exit code {code:?}): {stderr}")]
    ConversionFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Can not access file '{path}'")]
    FileAccess {
        path: String,
        source: std::io::Error,
    },

    #[error("The given text '{0:}' can not be interpreted as time")]
    InvalidTime(String),

    #[error("Invalid literal '{value}': expected {expected}")]
    InvalidLiteral { value: String, expected: String },

    #[error("Unknown format '{0:}'")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
