// baton/src/core/handler.rs

//! Defines the `PipelineHandler` trait, its forward link cell `HandlerLink`, and
//! the default pass-through behavior every handler inherits.

use crate::core::context::ExecutionContext;
use crate::error::BatonError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{event, Level};

/// A handler as the plan stores it: shared, type-erased, identity-comparable.
pub type SharedHandler<TInput, TOutput, Err = BatonError> = Arc<dyn PipelineHandler<TInput, TOutput, Err>>;

/// Upcast helper so a `dyn PipelineHandler` can be matched against a concrete type.
///
/// Blanket-implemented for every sized `Any + Send + Sync` type; never implement it by hand.
pub trait AsAny: Any + Send + Sync {
  fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> AsAny for T {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// A unit of work in an execution plan.
///
/// Implementors embed a [`HandlerLink`] and return it from [`link`](Self::link);
/// everything else has a default. The defaults of `invoke` and `invoke_async`
/// simply forward the context to the next handler, so a concrete handler
/// overrides only the entry points it needs and calls
/// [`invoke_next`](Self::invoke_next) / [`invoke_next_async`](Self::invoke_next_async)
/// when it wants the traversal to continue. Not calling them ends the traversal.
///
/// Handlers doing work should override both entry points: a handler that only
/// overrides `invoke` is a pure pass-through on the async path.
#[async_trait]
pub trait PipelineHandler<TInput, TOutput, Err = BatonError>: AsAny
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  /// The cell holding this handler's forward link.
  fn link(&self) -> &HandlerLink<TInput, TOutput, Err>;

  /// Diagnostic name used in trace events. Defaults to the concrete type name.
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  /// The handler the traversal continues with, or `None` if this one is last.
  fn next_handler(&self) -> Option<SharedHandler<TInput, TOutput, Err>> {
    self.link().get()
  }

  /// Overwrites the forward link.
  ///
  /// Plans keep links in sync with their order on every mutation. Calling this
  /// directly is manual wiring: it does not move the handler inside any plan,
  /// and the next plan mutation touching this position overwrites it.
  ///
  /// The link is a strong `Arc`. Wiring a cycle (`b -> a` while `a` reaches `b`)
  /// keeps every handler on it alive after all plans and owners are dropped;
  /// break it with `set_next_handler(None)` first.
  fn set_next_handler(&self, next: Option<SharedHandler<TInput, TOutput, Err>>) {
    self.link().set(next);
  }

  /// Synchronous entry point. Default: forward to the next handler.
  fn invoke(&self, ctx: &mut ExecutionContext<TInput, TOutput>) -> Result<(), Err> {
    self.invoke_next(ctx)
  }

  /// Asynchronous entry point. Default: await the next handler's `invoke_async`.
  ///
  /// `cancel` is threaded through unchanged. Honoring it is up to each
  /// handler: one that sees `cancel.is_cancelled()` should stop forwarding
  /// and/or fail with [`BatonError::Cancelled`].
  async fn invoke_async(
    &self,
    ctx: &mut ExecutionContext<TInput, TOutput>,
    cancel: &CancellationToken,
  ) -> Result<(), Err> {
    self.invoke_next_async(ctx, cancel).await
  }

  /// Continues the synchronous traversal. A no-op when there is no successor.
  fn invoke_next(&self, ctx: &mut ExecutionContext<TInput, TOutput>) -> Result<(), Err> {
    match self.next_handler() {
      Some(next) => {
        event!(Level::TRACE, from = self.name(), to = next.name(), "Forwarding context to next handler.");
        next.invoke(ctx)
      }
      None => {
        event!(Level::TRACE, handler = self.name(), "End of chain reached.");
        Ok(())
      }
    }
  }

  /// Continues the asynchronous traversal. A no-op when there is no successor.
  async fn invoke_next_async(
    &self,
    ctx: &mut ExecutionContext<TInput, TOutput>,
    cancel: &CancellationToken,
  ) -> Result<(), Err> {
    let Some(next) = self.next_handler() else {
      event!(Level::TRACE, handler = self.name(), "End of chain reached.");
      return Ok(());
    };
    event!(Level::TRACE, from = self.name(), to = next.name(), "Forwarding context to next handler.");
    next.invoke_async(ctx, cancel).await
  }
}

// Lets `SharedHandler` (and results carrying one) be formatted. Prints the name only.
impl<TInput, TOutput, Err> std::fmt::Debug for dyn PipelineHandler<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("PipelineHandler").field(&self.name()).finish()
  }
}

/// Interior-mutable forward link embedded in every handler.
///
/// The link is a traversal hint, not ownership: the plan owns its handlers.
/// The lock is only held while the link is read or replaced, never across an `.await`.
pub struct HandlerLink<TInput, TOutput, Err = BatonError>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  next: RwLock<Option<SharedHandler<TInput, TOutput, Err>>>,
}

impl<TInput, TOutput, Err> HandlerLink<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  pub fn new() -> Self {
    Self { next: RwLock::new(None) }
  }

  pub fn get(&self) -> Option<SharedHandler<TInput, TOutput, Err>> {
    self.next.read().clone()
  }

  pub fn set(&self, next: Option<SharedHandler<TInput, TOutput, Err>>) {
    *self.next.write() = next;
  }

  pub fn is_linked(&self) -> bool {
    self.next.read().is_some()
  }
}

impl<TInput, TOutput, Err> Default for HandlerLink<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

// The linked handler is printed by name only; following the chain here could recurse indefinitely
// on a manually wired cycle.
impl<TInput, TOutput, Err> std::fmt::Debug for HandlerLink<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let guard = self.next.read();
    f.debug_struct("HandlerLink")
      .field("next", &guard.as_ref().map(|next| next.name()))
      .finish()
  }
}

/// True if both pointers refer to the same handler instance.
pub fn same_handler<TInput, TOutput, Err>(
  a: &SharedHandler<TInput, TOutput, Err>,
  b: &SharedHandler<TInput, TOutput, Err>,
) -> bool
where
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  // Address only: vtable pointers of the same type may differ between codegen units.
  std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// True if the handler's concrete type is `T`.
pub fn is_handler_type<T, TInput, TOutput, Err>(handler: &SharedHandler<TInput, TOutput, Err>) -> bool
where
  T: PipelineHandler<TInput, TOutput, Err>,
  TInput: Send + 'static,
  TOutput: Send + 'static,
  Err: Send + 'static,
{
  // Called on the trait object so the concrete type's `as_any` is used, not the Arc's.
  AsAny::as_any(&**handler).is::<T>()
}
