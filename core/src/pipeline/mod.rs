// kitchenmate/src/pipeline/mod.rs

//! Named-step async pipelines over a shared, lockable context.
//!
//! A [`Pipeline`] runs its steps in declaration order. Each step may carry
//! `on` handlers and `after` handlers; every handler receives a clone of the
//! same [`ContextData`] and answers with a [`PipelineControl`] signal.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod hooks;
pub mod step;

use thiserror::Error;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline};
pub use step::{SkipCondition, StepDef};

/// Configuration failures raised by the pipeline itself rather than by a handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}
