use std::io;
use std::time::Duration;
use thiserror::Error;

/// type alias for all operations in this crate that could fail with a [`KvsError`]
pub type Result<T> = std::result::Result<T, KvsError>;

/// The Error variants used by the store, its dispatcher and the client/server transport.
///
/// Malformed commands are *not* errors: the command interpreter turns them into ordinary
/// result strings. The variants here describe calls that could not produce a result at all.
#[derive(Error, Debug)]
pub enum KvsError {
    /// variant for errors caused by socket or file IO
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// a request or response could not be (de)serialized
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// a command line option could not be parsed
    #[error("{0}")]
    Parsing(String),

    /// the dispatcher was given an unusable configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// every worker is busy and the request queue is full
    #[error("server busy: request queue is full")]
    Busy,

    /// the dispatcher is draining (or has stopped) and no longer runs new work
    #[error("server shutting down")]
    ShuttingDown,

    /// the caller gave up waiting for a unit of work
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// a unit of work was scheduled but could not run to completion
    #[error("error executing command: {0}")]
    ExecutionFault(String),

    /// no handler is registered under the requested service name
    #[error("no handler bound under name '{0}'")]
    NotBound(String),

    /// a failure reported by the server on the other end of a remote call
    #[error("remote error: {0}")]
    Remote(String),
}
