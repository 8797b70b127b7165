//! Error types for netlink operations.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, exchanging or decoding netlink
/// messages, and while parsing per-kind command line options.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An append would exceed the declared capacity of the message.
    #[error("message too long: {needed} bytes exceeds capacity of {capacity}")]
    Overflow {
        /// Declared capacity of the message.
        capacity: usize,
        /// Length the message would have had after the append.
        needed: usize,
    },

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Kernel error with operation context.
    #[error("{operation}: {message} (errno {errno})")]
    KernelWithContext {
        /// The operation that failed.
        operation: String,
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// A record declares more bytes than the input holds.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected length.
        expected: usize,
        /// Actual bytes available.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// A dump stream carried a message that belongs to another transaction.
    #[error("dump terminated: {0}")]
    DumpTerminated(String),

    /// Generic netlink family could not be resolved.
    #[error("generic netlink family not found: {name}")]
    FamilyNotFound {
        /// The family name.
        name: String,
    },

    /// A kind handler with this name is already registered.
    #[error("kind \"{0}\" is already registered")]
    DuplicateKind(String),

    /// Option value was rejected.
    #[error("invalid value \"{value}\" for \"{option}\": {reason}")]
    InvalidArgument {
        /// The option keyword.
        option: String,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Keyword not understood by the kind's option parser.
    #[error("{kind}: unknown option \"{option}\"?")]
    UnknownOption {
        /// Kind whose parser rejected the keyword.
        kind: String,
        /// The keyword.
        option: String,
    },

    /// Keyword given without its value.
    #[error("option \"{0}\" requires an argument")]
    MissingArgument(String),

    /// Option list is inconsistent as a whole.
    #[error("{0}")]
    Usage(String),

    /// The option list asked for the kind's help text.
    #[error("help requested for {0}")]
    HelpRequested(String),

    /// A child process could not be started.
    #[error("failed to execute {command}: {source}")]
    Exec {
        /// Program name.
        command: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A child process terminated without an exit status.
    #[error("{command} terminated abnormally")]
    ChildAbnormal {
        /// Program name.
        command: String,
    },

    /// Operation not supported.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was not found.
        name: String,
    },
}

impl Error {
    /// Create a kernel error from a (negative) netlink error code.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Create a kernel error with operation context.
    pub fn from_errno_with_context(errno: i32, operation: impl Into<String>) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::KernelWithContext {
            operation: operation.into(),
            errno: -errno,
            message,
        }
    }

    /// Add context to this error.
    ///
    /// Wraps kernel errors with operation context. Other errors are returned unchanged.
    pub fn with_context(self, operation: impl Into<String>) -> Self {
        match self {
            Self::Kernel { errno, message } => Self::KernelWithContext {
                operation: operation.into(),
                errno,
                message,
            },
            other => other,
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_arg(
        option: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            option: option.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, etc.).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => {
                matches!(*errno, libc::ENOENT | libc::ENODEV)
            }
            Self::FamilyNotFound { .. } | Self::InterfaceNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.errno(), Some(libc::EPERM | libc::EACCES))
    }

    /// Check if this is a "already exists" error (EEXIST).
    pub fn is_already_exists(&self) -> bool {
        self.errno() == Some(libc::EEXIST)
    }

    /// Check if the error came from command line option parsing.
    ///
    /// Nothing has been sent to the kernel when this is true.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::UnknownOption { .. }
                | Self::MissingArgument(_)
                | Self::Usage(_)
                | Self::HelpRequested(_)
        )
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage() {
            255
        } else if self.errno().is_some() {
            2
        } else {
            1
        }
    }
}
