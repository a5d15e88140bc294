use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtlFileError {
    /// Stream descriptor is not valid for the attempted direction, or an
    /// unclassified system error occurred during open/remove/rename.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("write error: {0}")]
    WriteError(String),

    #[error("read error: {0}")]
    ReadError(String),

    #[error("invalid file handle: used file handle isn't valid")]
    InvalidFileHandle,

    #[error("invalid max line size: maxlinesize is out of range")]
    InvalidMaxLineSize,

    #[error("invalid mode: open mode is different than [R,W,A]")]
    InvalidMode,

    /// Access/name/existence/directory-type failure, or a path outside the
    /// allowed directory set.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("value error: {0}")]
    ValueError(String),

    #[error("program limit exceeded: too many concurrent open files")]
    ProgramLimitExceeded,

    #[error("no data found")]
    NoDataFound,

    /// Allow-list provider or configuration unavailable. Never treated as
    /// a silent allow.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, UtlFileError>;
