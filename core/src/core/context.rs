// baton/src/core/context.rs

//! Defines the `ExecutionContext<TInput, TOutput>` carried along a traversal.

/// Per-execution carrier of one input and one output.
///
/// The plan creates a fresh context for every `execute` / `execute_async` call
/// and hands it to each handler in turn by `&mut`. Nothing is validated; any
/// value the caller's types allow is accepted, including "empty" ones.
///
/// `input` is set once at creation. It stays writable, but handlers are
/// expected to treat it as read-only and to publish results through `output`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext<TInput, TOutput> {
  pub input: TInput,
  pub output: TOutput,
}

impl<TInput, TOutput: Default> ExecutionContext<TInput, TOutput> {
  /// Creates a context whose output starts as `TOutput::default()`.
  pub fn new(input: TInput) -> Self {
    Self {
      input,
      output: TOutput::default(),
    }
  }
}

impl<TInput, TOutput> ExecutionContext<TInput, TOutput> {
  pub fn with_output(input: TInput, output: TOutput) -> Self {
    Self { input, output }
  }

  /// Consumes the context, keeping only the output.
  pub fn into_output(self) -> TOutput {
    self.output
  }

  pub fn into_parts(self) -> (TInput, TOutput) {
    (self.input, self.output)
  }
}
