// baton/src/plan/execution.rs

//! Contains `ExecutionPlan::execute()` and `ExecutionPlan::execute_async()`, which
//! build a fresh context and hand it to the first handler.

use crate::core::context::ExecutionContext;
use crate::core::handler::SharedHandler;
use crate::error::BatonError;
use crate::plan::definition::ExecutionPlan;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, Level};

impl<TInput, TOutput, Err> ExecutionPlan<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Default + Send + 'static,
  Err: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  /// Runs the chain synchronously on the caller's thread.
  ///
  /// Fails with `BatonError::NoHandlers` (converted into `Err`) on an empty
  /// plan. Otherwise returns the context's output once the first handler's
  /// `invoke` has returned, i.e. after every handler on the traversal path has
  /// unwound. Handler errors are returned unchanged.
  #[instrument(
    name = "ExecutionPlan::execute",
    skip_all,
    fields(
      input_type = %std::any::type_name::<TInput>(),
      output_type = %std::any::type_name::<TOutput>(),
      num_handlers = self.handlers.len(),
    )
  )]
  pub fn execute(&self, input: TInput) -> Result<TOutput, Err> {
    let first = self.first_handler()?;
    let mut ctx = ExecutionContext::new(input);

    event!(Level::DEBUG, first = first.name(), "Execution starting.");
    first.invoke(&mut ctx)?;
    event!(Level::DEBUG, "Execution finished.");

    Ok(ctx.into_output())
  }

  /// Runs the chain through the handlers' `invoke_async` entry points.
  ///
  /// `cancel` is passed to every handler on the path. The plan never inspects
  /// it and does not abort a handler that ignores it; wrap the returned future
  /// in `tokio::time::timeout` or similar for a hard deadline.
  #[instrument(
    name = "ExecutionPlan::execute_async",
    skip_all,
    fields(
      input_type = %std::any::type_name::<TInput>(),
      output_type = %std::any::type_name::<TOutput>(),
      num_handlers = self.handlers.len(),
    )
  )]
  pub async fn execute_async(&self, input: TInput, cancel: &CancellationToken) -> Result<TOutput, Err> {
    let first = self.first_handler()?;
    let mut ctx = ExecutionContext::new(input);

    event!(Level::DEBUG, first = first.name(), "Async execution starting.");
    first.invoke_async(&mut ctx, cancel).await?;
    event!(Level::DEBUG, "Async execution finished.");

    Ok(ctx.into_output())
  }

  fn first_handler(&self) -> Result<&SharedHandler<TInput, TOutput, Err>, Err> {
    self.handlers.first().ok_or_else(|| {
      event!(Level::DEBUG, "Execution requested on a plan with no handlers.");
      Err::from(BatonError::NoHandlers)
    })
  }
}
