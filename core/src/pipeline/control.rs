// kitchenmate/src/pipeline/control.rs

/// Signal from a handler telling the pipeline whether to go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt immediately; no further handlers of this or later steps run.
  Stop,
}

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every step was either executed or legitimately skipped.
  Completed,
  /// A handler returned [`PipelineControl::Stop`].
  Stopped,
}
