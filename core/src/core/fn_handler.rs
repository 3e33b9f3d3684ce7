// baton/src/core/fn_handler.rs

//! A closure-backed handler for plans that do not need a dedicated handler type.

use crate::core::context::ExecutionContext;
use crate::core::control::PipelineControl;
use crate::core::handler::{HandlerLink, PipelineHandler};
use crate::error::BatonError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{event, Level};

/// Type alias for the closure a [`FnHandler`] runs.
///
/// The closure gets the context by `&mut` and returns whether the traversal
/// should continue. It is synchronous; handlers that must await I/O implement
/// [`PipelineHandler`] directly.
pub type HandlerFn<TInput, TOutput, Err> =
  Box<dyn Fn(&mut ExecutionContext<TInput, TOutput>) -> Result<PipelineControl, Err> + Send + Sync>;

/// Handler that runs a closure, then forwards on [`PipelineControl::Continue`].
///
/// On the async path it also stops forwarding once `cancel` has been triggered,
/// so a chain of `FnHandler`s halts at the first handler that runs after a
/// cancellation request.
pub struct FnHandler<TInput, TOutput, Err = BatonError>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  name: String,
  work: HandlerFn<TInput, TOutput, Err>,
  link: HandlerLink<TInput, TOutput, Err>,
}

impl<TInput, TOutput, Err> FnHandler<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  pub fn new<S: Into<String>>(
    name: S,
    work: impl Fn(&mut ExecutionContext<TInput, TOutput>) -> Result<PipelineControl, Err> + Send + Sync + 'static,
  ) -> Self {
    Self {
      name: name.into(),
      work: Box::new(work),
      link: HandlerLink::new(),
    }
  }
}

#[async_trait]
impl<TInput, TOutput, Err> PipelineHandler<TInput, TOutput, Err> for FnHandler<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  fn link(&self) -> &HandlerLink<TInput, TOutput, Err> {
    &self.link
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn invoke(&self, ctx: &mut ExecutionContext<TInput, TOutput>) -> Result<(), Err> {
    match (self.work)(ctx)? {
      PipelineControl::Continue => self.invoke_next(ctx),
      PipelineControl::Stop => {
        event!(Level::DEBUG, handler = %self.name, "Handler stopped the traversal.");
        Ok(())
      }
    }
  }

  async fn invoke_async(
    &self,
    ctx: &mut ExecutionContext<TInput, TOutput>,
    cancel: &CancellationToken,
  ) -> Result<(), Err> {
    if !(self.work)(ctx)?.is_continue() {
      event!(Level::DEBUG, handler = %self.name, "Handler stopped the traversal.");
      return Ok(());
    }
    if cancel.is_cancelled() {
      event!(Level::DEBUG, handler = %self.name, "Cancellation observed, not forwarding.");
      return Ok(());
    }
    self.invoke_next_async(ctx, cancel).await
  }
}

impl<TInput, TOutput, Err> std::fmt::Debug for FnHandler<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FnHandler")
      .field("name", &self.name)
      .field("link", &self.link)
      .finish()
  }
}
