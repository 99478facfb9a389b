//! Process exit statuses and fatal startup failures.

use std::fmt;
use std::io;
use std::process::ExitCode;

/// Status the process exits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok,
    /// Wrong command line.
    Usage,
    /// Listening socket could not be created.
    Socket,
    /// Bind to the port failed.
    Bind,
    /// Listen call failed.
    Listen,
    /// The requested resource could not be delivered.
    File,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Usage => 1,
            ExitStatus::Socket => 2,
            ExitStatus::Bind => 3,
            ExitStatus::Listen => 4,
            ExitStatus::File => 5,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// A failure while setting up the listening socket. Always fatal.
#[derive(Debug)]
pub enum StartupError {
    Socket(io::Error),
    Bind(io::Error),
    Listen(io::Error),
}

impl StartupError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            StartupError::Socket(_) => ExitStatus::Socket,
            StartupError::Bind(_) => ExitStatus::Bind,
            StartupError::Listen(_) => ExitStatus::Listen,
        }
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Socket(e) => write!(f, "Could not create listening socket: {}", e),
            StartupError::Bind(e) => write!(f, "Binding failed: {}", e),
            StartupError::Listen(e) => write!(f, "Listen error: {}", e),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Socket(e) | StartupError::Bind(e) | StartupError::Listen(e) => Some(e),
        }
    }
}
