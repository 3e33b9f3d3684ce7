// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use baton::{
  async_trait, same_handler, BatonError, CancellationToken, ExecutionContext, ExecutionPlan, HandlerLink,
  PipelineHandler, SharedHandler,
};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// --- Plans used across tests ---

/// Plan whose output is the list of handler tags visited, in order.
pub type TagPlan = ExecutionPlan<(), Vec<u8>>;
pub type TagCtx = ExecutionContext<(), Vec<u8>>;
pub type TagHandler = SharedHandler<(), Vec<u8>>;

/// Plan doing integer arithmetic on the output.
pub type MathPlan = ExecutionPlan<i64, i64>;
pub type MathCtx = ExecutionContext<i64, i64>;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error("Baton framework error: {0}")]
  Baton(#[from] BatonError),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

// --- Tagged handlers: distinct types for type-based lookup ---

/// Pushes `ID` onto the output and forwards, on both paths.
#[derive(Default)]
pub struct Tagged<const ID: u8> {
  link: HandlerLink<(), Vec<u8>>,
  calls: AtomicUsize,
}

impl<const ID: u8> Tagged<ID> {
  pub fn shared() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn record(&self, ctx: &mut TagCtx) {
    self.calls.fetch_add(1, Ordering::SeqCst);
    ctx.output.push(ID);
  }
}

#[async_trait]
impl<const ID: u8> PipelineHandler<(), Vec<u8>> for Tagged<ID> {
  fn link(&self) -> &HandlerLink<(), Vec<u8>> {
    &self.link
  }

  fn invoke(&self, ctx: &mut TagCtx) -> Result<(), BatonError> {
    self.record(ctx);
    self.invoke_next(ctx)
  }

  async fn invoke_async(&self, ctx: &mut TagCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    self.record(ctx);
    self.invoke_next_async(ctx, cancel).await
  }
}

pub type H1 = Tagged<1>;
pub type H2 = Tagged<2>;
pub type H3 = Tagged<3>;
pub type H4 = Tagged<4>;
pub type H5 = Tagged<5>;

// --- Arithmetic handlers ---

/// `output = input * 2`, then forwards.
#[derive(Default)]
pub struct Double {
  link: HandlerLink<i64, i64>,
  calls: AtomicUsize,
}

impl Double {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn apply(&self, ctx: &mut MathCtx) {
    self.calls.fetch_add(1, Ordering::SeqCst);
    ctx.output = ctx.input * 2;
  }
}

#[async_trait]
impl PipelineHandler<i64, i64> for Double {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }

  fn invoke(&self, ctx: &mut MathCtx) -> Result<(), BatonError> {
    self.apply(ctx);
    self.invoke_next(ctx)
  }

  async fn invoke_async(&self, ctx: &mut MathCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    self.apply(ctx);
    self.invoke_next_async(ctx, cancel).await
  }
}

/// `output += 10`, then forwards.
#[derive(Default)]
pub struct AddTen {
  link: HandlerLink<i64, i64>,
  calls: AtomicUsize,
}

impl AddTen {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  fn apply(&self, ctx: &mut MathCtx) {
    self.calls.fetch_add(1, Ordering::SeqCst);
    ctx.output += 10;
  }
}

#[async_trait]
impl PipelineHandler<i64, i64> for AddTen {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }

  fn invoke(&self, ctx: &mut MathCtx) -> Result<(), BatonError> {
    self.apply(ctx);
    self.invoke_next(ctx)
  }

  async fn invoke_async(&self, ctx: &mut MathCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    self.apply(ctx);
    self.invoke_next_async(ctx, cancel).await
  }
}

/// Records the call and never forwards.
#[derive(Default)]
pub struct Terminal {
  link: HandlerLink<i64, i64>,
  calls: AtomicUsize,
}

impl Terminal {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PipelineHandler<i64, i64> for Terminal {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }

  fn invoke(&self, _ctx: &mut MathCtx) -> Result<(), BatonError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }

  async fn invoke_async(&self, _ctx: &mut MathCtx, _cancel: &CancellationToken) -> Result<(), BatonError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

/// Relies entirely on the default forwarding behavior.
#[derive(Default)]
pub struct PassThrough {
  link: HandlerLink<i64, i64>,
}

impl PipelineHandler<i64, i64> for PassThrough {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }
}

/// Sleeps on the async path before forwarding; forwards immediately on the sync path.
pub struct Delay {
  link: HandlerLink<i64, i64>,
  millis: u64,
}

impl Delay {
  pub fn new(millis: u64) -> Self {
    Self {
      link: HandlerLink::new(),
      millis,
    }
  }
}

#[async_trait]
impl PipelineHandler<i64, i64> for Delay {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }

  async fn invoke_async(&self, ctx: &mut MathCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    tokio::time::sleep(std::time::Duration::from_millis(self.millis)).await;
    self.invoke_next_async(ctx, cancel).await
  }
}

/// `output += 1`, then forwards unless cancellation has been requested.
#[derive(Default)]
pub struct StopIfCancelled {
  link: HandlerLink<i64, i64>,
  calls: AtomicUsize,
  stopped: AtomicUsize,
}

impl StopIfCancelled {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn stopped(&self) -> usize {
    self.stopped.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PipelineHandler<i64, i64> for StopIfCancelled {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }

  fn invoke(&self, ctx: &mut MathCtx) -> Result<(), BatonError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    ctx.output += 1;
    self.invoke_next(ctx)
  }

  async fn invoke_async(&self, ctx: &mut MathCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    ctx.output += 1;
    if cancel.is_cancelled() {
      self.stopped.fetch_add(1, Ordering::SeqCst);
      return Ok(());
    }
    self.invoke_next_async(ctx, cancel).await
  }
}

/// Fails with `BatonError::Cancelled` when cancellation has been requested.
#[derive(Default)]
pub struct FailIfCancelled {
  link: HandlerLink<i64, i64>,
}

#[async_trait]
impl PipelineHandler<i64, i64> for FailIfCancelled {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }

  async fn invoke_async(&self, ctx: &mut MathCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    if cancel.is_cancelled() {
      return Err(BatonError::Cancelled);
    }
    self.invoke_next_async(ctx, cancel).await
  }
}

/// Sets `output = input * 2`, then parks until cancellation is requested before forwarding.
/// Stands in for a long-running handler that ignores the token while it works.
#[derive(Default)]
pub struct WaitForCancel {
  link: HandlerLink<i64, i64>,
  pub entered: tokio::sync::Notify,
}

#[async_trait]
impl PipelineHandler<i64, i64> for WaitForCancel {
  fn link(&self) -> &HandlerLink<i64, i64> {
    &self.link
  }

  async fn invoke_async(&self, ctx: &mut MathCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    ctx.output = ctx.input * 2;
    self.entered.notify_one();
    cancel.cancelled().await;
    self.invoke_next_async(ctx, cancel).await
  }
}

// --- Handlers for plans with a custom error type ---

pub type FallibleCtx = ExecutionContext<i64, i64>;

/// Adds `input` to the output and forwards.
#[derive(Default)]
pub struct Accumulate {
  link: HandlerLink<i64, i64, TestError>,
  calls: AtomicUsize,
}

impl Accumulate {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl PipelineHandler<i64, i64, TestError> for Accumulate {
  fn link(&self) -> &HandlerLink<i64, i64, TestError> {
    &self.link
  }

  fn invoke(&self, ctx: &mut FallibleCtx) -> Result<(), TestError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    ctx.output += ctx.input;
    self.invoke_next(ctx)
  }

  async fn invoke_async(&self, ctx: &mut FallibleCtx, cancel: &CancellationToken) -> Result<(), TestError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    ctx.output += ctx.input;
    self.invoke_next_async(ctx, cancel).await
  }
}

/// Always fails with `TestError::Handler`.
pub struct Failing {
  link: HandlerLink<i64, i64, TestError>,
  message: &'static str,
}

impl Failing {
  pub fn new(message: &'static str) -> Self {
    Self {
      link: HandlerLink::new(),
      message,
    }
  }
}

#[async_trait]
impl PipelineHandler<i64, i64, TestError> for Failing {
  fn link(&self) -> &HandlerLink<i64, i64, TestError> {
    &self.link
  }

  fn invoke(&self, _ctx: &mut FallibleCtx) -> Result<(), TestError> {
    Err(TestError::Handler(self.message.to_string()))
  }

  async fn invoke_async(&self, _ctx: &mut FallibleCtx, _cancel: &CancellationToken) -> Result<(), TestError> {
    Err(TestError::Handler(self.message.to_string()))
  }
}

// --- Assertions ---

/// Checks that every handler links to its successor in the plan and the last one links to nothing.
pub fn assert_linkage<I, O, E>(plan: &ExecutionPlan<I, O, E>)
where
  I: Send + 'static,
  O: Default + Send + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  let handlers = plan.handlers();
  for (i, pair) in handlers.windows(2).enumerate() {
    let next = pair[0]
      .next_handler()
      .unwrap_or_else(|| panic!("handler at {} has no successor", i));
    assert!(same_handler(&next, &pair[1]), "handler at {} is not linked to handler at {}", i, i + 1);
  }
  if let Some(last) = handlers.last() {
    assert!(last.next_handler().is_none(), "last handler must not have a successor");
  }
}

/// Checks that the plan holds exactly these instances, in this order.
pub fn assert_order<I, O, E>(plan: &ExecutionPlan<I, O, E>, expected: &[SharedHandler<I, O, E>])
where
  I: Send + 'static,
  O: Default + Send + 'static,
  E: std::error::Error + From<BatonError> + Send + Sync + 'static,
{
  let actual = plan.handlers();
  assert_eq!(actual.len(), expected.len(), "plan length differs from expected order");
  for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
    assert!(same_handler(a, e), "unexpected handler at index {}", i);
  }
}

/// Runs a tag plan synchronously and returns the visited tags.
pub fn run_tags(plan: &TagPlan) -> Vec<u8> {
  plan.execute(()).expect("tag plan execution failed")
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
    )
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter shared by closure handlers ---
pub static FN_HANDLER_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  FN_HANDLER_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
