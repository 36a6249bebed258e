use std::time::Duration;

use thiserror::Error;

use crate::crd::pipeline_run::RunResult;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("unexpected result: expecting {expected}, got {actual} (message: {message:?})")]
    UnexpectedResult {
        expected: RunResult,
        actual: RunResult,
        message: String,
    },

    #[error("Definitive failure: {0}")]
    Definitive(String),

    #[error("condition {condition} failed after {elapsed:?}: {source}")]
    ConditionFailed {
        condition: String,
        elapsed: Duration,
        #[source]
        source: Box<Error>,
    },

    #[error("timed out waiting for {condition} after {elapsed:?}")]
    Timeout { condition: String, elapsed: Duration },

    #[error("Setup of {resource} failed: {source}")]
    Setup {
        resource: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Teardown of {resource} failed: {source}")]
    Teardown {
        resource: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Duplicate test case name: {0}")]
    DuplicateCaseName(String),

    #[error("Invalid test plan: {0}")]
    InvalidPlan(String),

    #[error("Test case task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Short alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`], as reported for a failed wait or run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource reached a terminal state that does not match the expectation.
    DefinitiveFailure,
    /// The deadline elapsed before the condition was satisfied.
    Timeout,
    /// Creating a tenant or pipeline run was rejected.
    SetupFailure,
    /// Cleaning up a tenant failed.
    TeardownFailure,
    Other,
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
    pub fn definitive(msg: impl Into<String>) -> Self {
        Self::Definitive(msg.into())
    }
    pub fn setup(resource: impl Into<String>, source: Error) -> Self {
        Self::Setup {
            resource: resource.into(),
            source: Box::new(source),
        }
    }
    pub fn teardown(resource: impl Into<String>, source: Error) -> Self {
        Self::Teardown {
            resource: resource.into(),
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConditionFailed { .. } | Self::UnexpectedResult { .. } | Self::Definitive(_) => {
                ErrorKind::DefinitiveFailure
            }
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Setup { .. } => ErrorKind::SetupFailure,
            Self::Teardown { .. } => ErrorKind::TeardownFailure,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    pub fn is_definitive_failure(&self) -> bool {
        self.kind() == ErrorKind::DefinitiveFailure
    }
}
