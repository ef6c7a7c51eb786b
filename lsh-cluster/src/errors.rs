//! Error definitions.
use std::error::Error;
use std::{fmt, result};

/// A specialized Result type for this library.
pub type Result<T, E = LshClusterError> = result::Result<T, E>;

/// Errors in this library.
#[derive(Debug)]
pub enum LshClusterError {
    /// Contains [`InputError`].
    Input(InputError),
    /// Contains [`CancelledError`].
    Cancelled(CancelledError),
}

impl fmt::Display for LshClusterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Input(e) => e.fmt(f),
            Self::Cancelled(e) => e.fmt(f),
        }
    }
}

impl Error for LshClusterError {}

impl LshClusterError {
    pub(crate) fn input<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Input(InputError { msg: msg.into() })
    }

    pub(crate) const fn cancelled(num_added: usize) -> Self {
        Self::Cancelled(CancelledError { num_added })
    }
}

/// Error used when the input argument is invalid.
#[derive(Debug)]
pub struct InputError {
    msg: String,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InputError: {}", self.msg)
    }
}

/// Error used when a batch is stopped by a [`CancelToken`](crate::CancelToken).
///
/// Sets added before the cancellation stay in the clusters.
#[derive(Debug)]
pub struct CancelledError {
    num_added: usize,
}

impl CancelledError {
    /// Gets the number of sets of the batch added before the cancellation.
    pub const fn num_added(&self) -> usize {
        self.num_added
    }
}

impl fmt::Display for CancelledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CancelledError: stopped after adding {} sets",
            self.num_added
        )
    }
}
