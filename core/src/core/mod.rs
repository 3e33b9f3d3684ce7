pub mod context;
pub mod control;
pub mod fn_handler;
pub mod handler;

// Re-export key types for easier access from other baton modules (and lib.rs)
pub use context::ExecutionContext;
pub use control::PipelineControl;
pub use fn_handler::{FnHandler, HandlerFn};
pub use handler::{is_handler_type, same_handler, AsAny, HandlerLink, PipelineHandler, SharedHandler};
