// baton/src/plan/definition.rs

//! Contains the `ExecutionPlan<TInput, TOutput, Err>` struct definition and the
//! methods for its construction, inspection and structural modification.

use crate::core::handler::{is_handler_type, same_handler, PipelineHandler, SharedHandler};
use crate::error::{BatonError, BatonResult};
use tracing::{event, Level};

/// An ordered chain of handlers plus the entry points that run it.
///
/// The `Vec` is the single source of truth for traversal order. Every
/// handler's forward link is a cache of that order, rewritten for the affected
/// neighbours on each mutation, so that for every adjacent pair
/// `handlers[i].next_handler() == handlers[i + 1]` and the last handler has no
/// successor.
///
/// Structural mutation takes `&mut self` and execution takes `&self`, so a plan
/// cannot be mutated while an execution borrows it. Share it behind an `Arc` to
/// run several executions concurrently.
///
/// `Err` is the error type handlers return. It must be `From<BatonError>` so
/// framework failures (`NoHandlers`) come out of `execute` in the same type.
///
/// Forwarding is a nested call per handler, so traversal depth is bounded by
/// the executing thread's stack. A few thousand handlers on a default-sized
/// thread stack is where that limit is reached; run very long plans on a
/// thread with a larger stack, or split them.
pub struct ExecutionPlan<TInput, TOutput, Err = BatonError>
where
  TInput: Send + 'static,
  TOutput: Default + Send + 'static,
  Err: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  pub(crate) handlers: Vec<SharedHandler<TInput, TOutput, Err>>,
}

impl<TInput, TOutput, Err> ExecutionPlan<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Default + Send + 'static,
  Err: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  /// Creates an empty plan.
  pub fn new() -> Self {
    Self { handlers: Vec::new() }
  }

  // --- Inspection ---

  /// Snapshot of the handlers in traversal order.
  ///
  /// The returned `Vec` is a copy; later mutations of the plan do not affect it.
  pub fn handlers(&self) -> Vec<SharedHandler<TInput, TOutput, Err>> {
    self.handlers.clone()
  }

  pub fn len(&self) -> usize {
    self.handlers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }

  /// True if this exact handler instance is part of the plan.
  pub fn contains(&self, handler: &SharedHandler<TInput, TOutput, Err>) -> bool {
    self.handlers.iter().any(|h| same_handler(h, handler))
  }

  /// Index of the first handler whose concrete type is `T`, in traversal order.
  pub fn position_of<T>(&self) -> Option<usize>
  where
    T: PipelineHandler<TInput, TOutput, Err>,
  {
    self.handlers.iter().position(is_handler_type::<T, TInput, TOutput, Err>)
  }

  // --- Structural mutation ---

  /// Inserts `handler` at `index`, shifting later handlers back.
  ///
  /// `index` must be in `0..=len()`. Fails with [`BatonError::InvalidArgument`]
  /// if it is not, or if this instance is already in the plan; the plan is
  /// left unchanged in both cases.
  ///
  /// The predecessor (if any) is linked to `handler`, and `handler` is linked to
  /// the handler previously at `index`, or to nothing when appending.
  ///
  /// The duplicate check only covers this plan. A handler has a single forward
  /// link, so adding an instance that already sits in another plan rewires it
  /// for both: the other plan's traversal then continues into this plan's chain
  /// from that handler on. Give each plan its own instances.
  pub fn insert_handler(&mut self, index: usize, handler: SharedHandler<TInput, TOutput, Err>) -> BatonResult<()> {
    let len = self.handlers.len();
    if index > len {
      event!(Level::DEBUG, index, len, "Rejected handler insert: index out of range.");
      return Err(BatonError::invalid_argument(
        "index",
        format!(
          "index {} is not valid to insert at; it must be between 0 and the current handler count ({})",
          index, len
        ),
      ));
    }
    if self.contains(&handler) {
      event!(Level::DEBUG, handler = handler.name(), "Rejected handler insert: instance already in plan.");
      return Err(BatonError::invalid_argument(
        "handler",
        "handler is already part of the execution plan; the same instance may only appear in a plan once",
      ));
    }

    if index > 0 {
      self.handlers[index - 1].set_next_handler(Some(handler.clone()));
    }
    // Also clears a stale link left over from an earlier removal.
    handler.set_next_handler(self.handlers.get(index).cloned());

    event!(Level::DEBUG, index, handler = handler.name(), new_len = len + 1, "Handler inserted.");
    self.handlers.insert(index, handler);
    Ok(())
  }

  pub fn append_handler(&mut self, handler: SharedHandler<TInput, TOutput, Err>) -> BatonResult<()> {
    self.insert_handler(self.handlers.len(), handler)
  }

  pub fn prepend_handler(&mut self, handler: SharedHandler<TInput, TOutput, Err>) -> BatonResult<()> {
    self.insert_handler(0, handler)
  }

  /// Inserts `handler` right after the first handler of type `T`.
  ///
  /// Fails with [`BatonError::HandlerNotFound`] when the plan holds no `T`.
  pub fn add_handler_after<T>(&mut self, handler: SharedHandler<TInput, TOutput, Err>) -> BatonResult<()>
  where
    T: PipelineHandler<TInput, TOutput, Err>,
  {
    let index = self.require_position_of::<T>()?;
    self.insert_handler(index + 1, handler)
  }

  /// Inserts `handler` right before the first handler of type `T`.
  ///
  /// Fails with [`BatonError::HandlerNotFound`] when the plan holds no `T`.
  pub fn add_handler_before<T>(&mut self, handler: SharedHandler<TInput, TOutput, Err>) -> BatonResult<()>
  where
    T: PipelineHandler<TInput, TOutput, Err>,
  {
    let index = self.require_position_of::<T>()?;
    self.insert_handler(index, handler)
  }

  /// Removes and returns the handler at `index`.
  ///
  /// The predecessor is relinked to the removed handler's successor, keeping
  /// the chain continuous. The removed handler keeps its own forward link, so
  /// invoking it directly afterwards still continues into this plan's chain.
  /// Clear it with `set_next_handler(None)` if the handler is reused elsewhere.
  pub fn remove_handler(&mut self, index: usize) -> BatonResult<SharedHandler<TInput, TOutput, Err>> {
    let len = self.handlers.len();
    if index >= len {
      event!(Level::DEBUG, index, len, "Rejected handler removal: index out of range.");
      return Err(BatonError::invalid_argument(
        "index",
        format!("index {} does not exist in handlers (count {})", index, len),
      ));
    }

    if index > 0 {
      let successor = self.handlers[index].next_handler();
      self.handlers[index - 1].set_next_handler(successor);
    }

    let removed = self.handlers.remove(index);
    event!(Level::DEBUG, index, handler = removed.name(), new_len = len - 1, "Handler removed.");
    Ok(removed)
  }

  /// Removes and returns the first handler of type `T`.
  ///
  /// Fails with [`BatonError::HandlerNotFound`] when the plan holds no `T`.
  pub fn remove_handler_of<T>(&mut self) -> BatonResult<SharedHandler<TInput, TOutput, Err>>
  where
    T: PipelineHandler<TInput, TOutput, Err>,
  {
    let index = self.require_position_of::<T>()?;
    self.remove_handler(index)
  }

  /// Removes every handler. Links on the removed handlers are not reset.
  pub fn clear_handlers(&mut self) {
    event!(Level::DEBUG, removed = self.handlers.len(), "Handlers cleared.");
    self.handlers.clear();
  }

  fn require_position_of<T>(&self) -> BatonResult<usize>
  where
    T: PipelineHandler<TInput, TOutput, Err>,
  {
    self.position_of::<T>().ok_or_else(|| {
      event!(Level::DEBUG, handler_type = %std::any::type_name::<T>(), "No handler of requested type in plan.");
      BatonError::handler_not_found::<T>()
    })
  }
}

impl<TInput, TOutput, Err> Default for ExecutionPlan<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Default + Send + 'static,
  Err: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<TInput, TOutput, Err> std::fmt::Debug for ExecutionPlan<TInput, TOutput, Err>
where
  TInput: Send + 'static,
  TOutput: Default + Send + 'static,
  Err: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
    f.debug_struct("ExecutionPlan").field("handlers", &names).finish()
  }
}
