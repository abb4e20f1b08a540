// tests/pipeline_tests.rs
mod common;

use common::*;
use kitchenmate::{ContextData, Pipeline, PipelineControl, PipelineError, PipelineResult};
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<StepLog, TestError>::new(&[("step1", false, None), ("step2", false, None), ("step3", false, None)]);

  pipeline.on_root("step1", recording_handler("step1")).unwrap();
  pipeline.on_root("step2", recording_handler("step2")).unwrap();
  pipeline.on_root("step3", recording_handler("step3")).unwrap();

  let ctx = ContextData::new(StepLog::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<StepLog, TestError>::new(&[("stepA", false, None), ("stopStep", false, None), ("stepC", false, None)]);

  pipeline.on_root("stepA", recording_handler("stepA")).unwrap();
  pipeline.on_root("stopStep", recording_handler("stopStep")).unwrap();
  pipeline.on_root("stepC", recording_handler("stepC")).unwrap();

  let ctx = ContextData::new(StepLog {
    stop_at: Some("stopStep".to_string()),
    ..StepLog::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["stepA", "stopStep"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<StepLog, TestError>::new(&[
    ("good_step", false, None),
    ("bad_step", false, None),
    ("another_step", false, None),
  ]);

  pipeline.on_root("good_step", recording_handler("good_step")).unwrap();
  pipeline.on_root("bad_step", failing_handler("bad_step", "I am a bad step!")).unwrap();
  pipeline.on_root("another_step", recording_handler("another_step")).unwrap();

  let ctx = ContextData::new(StepLog::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("I am a bad step!".to_string()));
  assert_eq!(ctx.read().steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_skips_step_if_condition_met() {
  setup_tracing();
  let mut pipeline = Pipeline::<StepLog, TestError>::new(&[
    ("step1", false, None),
    (
      "step_to_skip",
      false,
      Some(Arc::new(|ctx: ContextData<StepLog>| !ctx.read().steps_executed.is_empty())),
    ),
    ("step3", false, None),
  ]);

  pipeline.on_root("step1", recording_handler("step1")).unwrap();
  pipeline.on_root("step_to_skip", recording_handler("step_to_skip")).unwrap();
  pipeline.on_root("step3", recording_handler("step3")).unwrap();

  let ctx = ContextData::new(StepLog::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["step1", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_non_optional_step_missing_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<StepLog, TestError>::new(&[("step_with_no_handler", false, None)]);

  let result = pipeline.run(ContextData::new(StepLog::default())).await;

  assert_eq!(
    result.unwrap_err(),
    TestError::Pipeline(PipelineError::HandlerMissing {
      step_name: "step_with_no_handler".to_string()
    })
  );
}

#[tokio::test]
#[serial]
async fn test_optional_step_missing_handler_succeeds() {
  setup_tracing();
  let pipeline = Pipeline::<StepLog, TestError>::new(&[("optional_step_no_handler", true, None)]);

  let result = pipeline.run(ContextData::new(StepLog::default())).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn test_on_then_after_execution_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<StepLog, TestError>::new(&[("main_step", false, None)]);

  pipeline.after_root("main_step", recording_handler("after_main")).unwrap();
  pipeline.on_root("main_step", recording_handler("on_main")).unwrap();

  let ctx = ContextData::new(StepLog::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().steps_executed, vec!["on_main", "after_main"]);
}

#[tokio::test]
#[serial]
async fn test_after_handlers_skipped_when_on_handler_fails() {
  setup_tracing();
  let mut pipeline = Pipeline::<StepLog, TestError>::new(&[("main_step", false, None)]);

  pipeline.on_root("main_step", failing_handler("on_main", "boom")).unwrap();
  pipeline.after_root("main_step", recording_handler("after_main")).unwrap();

  let ctx = ContextData::new(StepLog::default());
  let result = pipeline.run(ctx.clone()).await;

  assert!(result.is_err());
  assert_eq!(ctx.read().steps_executed, vec!["on_main"]);
}

#[tokio::test]
#[serial]
async fn test_registering_handler_for_unknown_step_is_rejected() {
  setup_tracing();
  let mut pipeline = Pipeline::<StepLog, TestError>::new(&[("known", false, None)]);

  let err = pipeline.on_root("unknown", recording_handler("unknown")).unwrap_err();
  assert_eq!(
    err,
    PipelineError::StepNotFound {
      step_name: "unknown".to_string()
    }
  );
  assert!(pipeline.set_optional("unknown", true).is_err());
}

#[tokio::test]
#[serial]
async fn test_closure_handlers_with_their_own_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<StepLog, TestError>::new(&[("closure_step", false, None)]);

  pipeline
    .on_root("closure_step", |ctx: ContextData<StepLog>| async move {
      ctx.write().steps_executed.push("closure_step".to_string());
      Ok::<_, PipelineError>(PipelineControl::Continue)
    })
    .unwrap();

  let ctx = ContextData::new(StepLog::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["closure_step"]);
}

#[tokio::test]
#[serial]
async fn test_marking_step_optional_after_construction() {
  setup_tracing();
  let mut pipeline = Pipeline::<StepLog, TestError>::new(&[("later_optional", false, None)]);
  pipeline.set_optional("later_optional", true).unwrap();

  let result = pipeline.run(ContextData::new(StepLog::default())).await;
  assert_eq!(result.unwrap(), PipelineResult::Completed);
}
