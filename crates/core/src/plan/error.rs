//! Error types for planning.

use thiserror::Error;

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A `${NAME}` reference has no value in the run context.
    #[error("stage '{stage}': undefined variable '{name}' in {field}")]
    UndefinedVariable {
        stage: String,
        field: String,
        name: String,
    },

    /// An interpolated value came out empty.
    #[error("stage '{stage}': {field} is empty after interpolation")]
    EmptyValue { stage: String, field: String },
}
