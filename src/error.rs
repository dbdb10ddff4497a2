//! Error types for huffmunch compression and decompression.
//!
//! Every failure the codec can report is a `HuffmunchError`. Callers that need a
//! flat numeric status, such as the exit code of the command line tool, can map any error
//! to a `Status` with `HuffmunchError::status()`.

use thiserror::Error;

/// Result type alias for huffmunch operations.
pub type Result<T> = core::result::Result<T, HuffmunchError>;

/// Huffmunch error types.
#[derive(Debug, Error)]
pub enum HuffmunchError {
    /// Split list is empty, does not begin with 0, decreases, or runs past the data.
    #[error("invalid splits: {0}")]
    InvalidSplits(String),

    /// Destination buffer too small. The required size is always reported.
    #[error("output overflow: need {required} bytes, got {provided}")]
    OutputOverflow { required: usize, provided: usize },

    /// The round trip check done after compression did not reproduce the input.
    #[error("verification failed: {0}")]
    VerifyFailed(String),

    /// A value does not fit one of the fixed fields of the packed format.
    #[error("format limit exceeded: {0}")]
    FormatLimit(String),

    /// Internal consistency check failed.
    #[error("internal error: {0}")]
    Internal(String),

    /// A split offset or length does not fit the configured header width.
    #[error("split value {value} too large for {width} byte header integers")]
    SplitOverflow { value: usize, width: usize },

    /// Packed data could not be decoded.
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// Codec options out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error parsing a bank list file.
    #[error("list file line {line}: {message}")]
    ListFile { line: usize, message: String },

    /// Bank packing could not place the data.
    #[error("bank error: {0}")]
    BankOverflow(String),

    /// I/O error from the command line tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Numeric status codes, used as the exit code of the command line tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    OutputOverflow = 1,
    VerifyFail = 2,
    InternalError = 3,
    InvalidSplits = 4,
    SplitOverflow = 5,
    MalformedStream = 6,
    InvalidConfig = 7,
    ToolError = 8,
}

impl Status {
    /// Numeric value of the status.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Brief description of the status.
    pub fn description(self) -> &'static str {
        match self {
            Status::Ok => "No error.",
            Status::OutputOverflow => "Output data too large for buffer.",
            Status::VerifyFail => "Internal verification error.",
            Status::InternalError => "Internal error.",
            Status::InvalidSplits => "Splits must only increase in value, beginning with 0.",
            Status::SplitOverflow => "Split offset or data size too large for header integer size.",
            Status::MalformedStream => "Compressed data is malformed.",
            Status::InvalidConfig => "Invalid codec configuration.",
            Status::ToolError => "List file, bank or file error.",
        }
    }
}

impl HuffmunchError {
    /// Map this error to its numeric status.
    pub fn status(&self) -> Status {
        match self {
            HuffmunchError::InvalidSplits(_) => Status::InvalidSplits,
            HuffmunchError::OutputOverflow { .. } => Status::OutputOverflow,
            HuffmunchError::VerifyFailed(_) => Status::VerifyFail,
            HuffmunchError::FormatLimit(_) | HuffmunchError::Internal(_) => Status::InternalError,
            HuffmunchError::SplitOverflow { .. } => Status::SplitOverflow,
            HuffmunchError::MalformedStream(_) => Status::MalformedStream,
            HuffmunchError::InvalidConfig(_) => Status::InvalidConfig,
            HuffmunchError::ListFile { .. }
            | HuffmunchError::BankOverflow(_)
            | HuffmunchError::Io(_) => Status::ToolError,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_codes_test() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::OutputOverflow.code(), 1);
        assert_eq!(Status::SplitOverflow.code(), 5);
        let e = HuffmunchError::OutputOverflow {
            required: 10,
            provided: 4,
        };
        assert_eq!(e.status(), Status::OutputOverflow);
        assert_eq!(e.to_string(), "output overflow: need 10 bytes, got 4");
    }

    #[test]
    fn format_limit_is_internal_test() {
        let e = HuffmunchError::FormatLimit("skip".to_string());
        assert_eq!(e.status(), Status::InternalError);
        assert_eq!(e.status().code(), 3);
    }
}
