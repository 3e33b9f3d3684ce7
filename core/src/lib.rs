// src/lib.rs

//! Baton: an ordered, cancellable chain-of-responsibility pipeline for Rust.
//!
//! An [`ExecutionPlan`] owns an ordered list of handlers. Executing the plan
//! creates a fresh [`ExecutionContext`] from the input and hands it to the first
//! handler; each handler does its work and passes the context on to its
//! successor, or stops. The plan returns the context's output.
//!
//!  - Synchronous (`execute`) and asynchronous (`execute_async`) traversal.
//!  - Cooperative cancellation through a `CancellationToken` handed to every async handler.
//!  - Default pass-through behavior, so handlers override only what they need.
//!  - Structural mutation at any position, including by handler type (`add_handler_after::<T>`).
//!  - Closure handlers via [`FnHandler`].

pub mod core;
pub mod error;
pub mod plan;

// --- Re-exports for the Public API ---

pub use crate::core::context::ExecutionContext;
pub use crate::core::control::PipelineControl;
pub use crate::core::fn_handler::{FnHandler, HandlerFn};
pub use crate::core::handler::{same_handler, AsAny, HandlerLink, PipelineHandler, SharedHandler};

pub use crate::plan::definition::ExecutionPlan;

pub use crate::error::{BatonError, BatonResult};

// Implementors need these to write `invoke_async` overrides.
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

/*
    Typical use:
    1. Write handler types that embed a `HandlerLink<I, O>` and implement `PipelineHandler<I, O>`,
       overriding `invoke` / `invoke_async` and calling `invoke_next` / `invoke_next_async` to continue.
    2. Create an `ExecutionPlan::<I, O>::new()` and `append_handler(Arc::new(handler))` in order.
    3. Call `plan.execute(input)` or `plan.execute_async(input, &token).await`.
*/
