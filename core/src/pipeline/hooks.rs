// kitchenmate/src/pipeline/hooks.rs

//! Registration of `on` and `after` handlers.

use super::definition::{Handler, Pipeline};
use super::{ContextData, PipelineControl, PipelineError};
use std::future::Future;

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Registers a main handler for `step_name`.
  ///
  /// The handler's own error type only needs to convert into the pipeline's `Err`.
  pub fn on_root<F, UserProvidedErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> Result<(), PipelineError>
  where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name)?;
    let handler = wrap_handler(handler_fn);
    self.on.entry(step_name.to_string()).or_default().push(handler);
    Ok(())
  }

  /// Registers a handler that runs once every `on` handler of the step continued.
  pub fn after_root<F, UserProvidedErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> Result<(), PipelineError>
  where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name)?;
    let handler = wrap_handler(handler_fn);
    self.after.entry(step_name.to_string()).or_default().push(handler);
    Ok(())
  }
}

fn wrap_handler<TData, Err, F, UserProvidedErr>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
  UserProvidedErr: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let user_fut = handler_fn(ctx_data);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}
