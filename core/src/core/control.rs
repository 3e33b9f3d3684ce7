// baton/src/core/control.rs

//! Defines the signal closure-backed handlers use to steer the traversal.

/// Signal from a closure handler indicating whether the traversal should continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  /// Forward the context to the next handler, if there is one.
  Continue,
  /// Do not forward. No later handler in the plan sees this execution.
  Stop,
}

impl PipelineControl {
  pub fn is_continue(self) -> bool {
    matches!(self, PipelineControl::Continue)
  }
}
