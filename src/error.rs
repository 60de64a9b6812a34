//! Crate-wide error type.
//!
//! Recoverable failures (malformed graphs, configuration files, parameter
//! maps) surface as [`ScheduleError`]. Precondition violations inside the
//! scheduling core panic instead; they indicate a bug in the caller.

use thiserror::Error;

use crate::models::VertexId;
use crate::validation::ValidationError;

/// Errors produced outside the scheduling hot path.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The graph failed structural validation.
    #[error("invalid graph: {}", join_messages(.0))]
    InvalidGraph(Vec<ValidationError>),

    /// The graph has no vertices.
    #[error("graph has no vertices")]
    EmptyGraph,

    /// A vertex was referenced but never given a weight.
    #[error("vertex {0} has no weight")]
    UndefinedWeight(VertexId),

    /// An append was attempted on a complete schedule.
    #[error("schedule is full (capacity {capacity})")]
    ScheduleFull { capacity: usize },

    /// A parameter key no algorithm in the chain recognizes.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// A recognized parameter with an unusable value.
    #[error("invalid value {value} for parameter `{name}`: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },

    /// An algorithm key in a configuration file is not supported.
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),

    /// A temperature reduction rule selector is not supported.
    #[error("unknown temperature reduction rule `{0}`")]
    UnknownReductionRule(String),

    /// A graph file could not be parsed.
    #[error("parse error in {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// The worker pool for a parallel search could not be started.
    #[error("worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ScheduleError {
    pub(crate) fn invalid_parameter(name: &str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            value,
            reason,
        }
    }
}
