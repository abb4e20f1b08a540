// kitchenmate/src/pipeline/execution.rs

use super::definition::{Handler, Pipeline};
use super::{ContextData, PipelineControl, PipelineError, PipelineResult};
use tracing::{event, instrument, span, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// Returns the first handler error unchanged. A non-optional step without
  /// handlers yields [`PipelineError::HandlerMissing`] converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(ctx_data.clone()) {
          event!(parent: &step_span, Level::INFO, "Step skipped by its skip condition.");
          continue;
        }
      }

      let on_handlers = self.on.get(step_name).filter(|v| !v.is_empty());
      let after_handlers = self.after.get(step_name).filter(|v| !v.is_empty());

      if on_handlers.is_none() && after_handlers.is_none() {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(PipelineError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase, handlers) in [("on", on_handlers), ("after", after_handlers)] {
        let Some(handlers) = handlers else { continue };
        if run_phase(handlers, &ctx_data, phase, &step_span).await? == PipelineControl::Stop {
          return Ok(PipelineResult::Stopped);
        }
      }
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}

async fn run_phase<TData, Err>(
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
  phase: &'static str,
  step_span: &tracing::Span,
) -> Result<PipelineControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    match handler_fn(ctx_data.clone()).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(parent: step_span, Level::INFO, phase, handler_idx, "Pipeline stopped by a handler.");
        return Ok(PipelineControl::Stop);
      }
      Err(e) => {
        event!(parent: step_span, Level::ERROR, phase, handler_idx, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(PipelineControl::Continue)
}
