// kitchenmate/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its structural operations.

use super::step::{SkipCondition, StepDef};
use super::{ContextData, PipelineControl, PipelineError};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Boxed async step handler.
///
/// Handlers take their own clone of the context and must release any lock
/// guard before awaiting.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// An ordered list of named steps over the context type `TData`.
///
/// `Err` is the error type handlers return. It must absorb [`PipelineError`]
/// so configuration failures surface through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` step definitions.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_cond_opt)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_cond_opt.clone(),
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub(crate) fn ensure_step_exists(&self, step_name: &str) -> Result<(), PipelineError> {
    if self.steps.iter().any(|s| s.name == step_name) {
      Ok(())
    } else {
      Err(PipelineError::StepNotFound {
        step_name: step_name.to_string(),
      })
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> Result<(), PipelineError> {
    self.ensure_step_exists(step_name)?;
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.optional = optional;
    }
    Ok(())
  }
}
