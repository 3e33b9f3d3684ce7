// baton/examples/basic_plan.rs

use baton::{
  async_trait, BatonError, CancellationToken, ExecutionContext, ExecutionPlan, FnHandler, HandlerLink,
  PipelineControl, PipelineHandler,
};
use std::sync::Arc;
use tracing::info;

// 1. Define the input and output the plan works on
#[derive(Debug)]
struct SignupRequest {
  email: String,
  display_name: String,
}

#[derive(Debug, Default)]
struct SignupOutcome {
  normalized_email: String,
  accepted: bool,
  notes: Vec<String>,
}

type SignupCtx = ExecutionContext<SignupRequest, SignupOutcome>;

// 2. A handler type of its own: embeds a HandlerLink and overrides both entry points
#[derive(Default)]
struct NormalizeEmail {
  link: HandlerLink<SignupRequest, SignupOutcome>,
}

impl NormalizeEmail {
  fn apply(&self, ctx: &mut SignupCtx) {
    ctx.output.normalized_email = ctx.input.email.trim().to_lowercase();
    ctx.output.notes.push("email normalized".to_string());
  }
}

#[async_trait]
impl PipelineHandler<SignupRequest, SignupOutcome> for NormalizeEmail {
  fn link(&self) -> &HandlerLink<SignupRequest, SignupOutcome> {
    &self.link
  }

  fn invoke(&self, ctx: &mut SignupCtx) -> Result<(), BatonError> {
    self.apply(ctx);
    self.invoke_next(ctx)
  }

  async fn invoke_async(&self, ctx: &mut SignupCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    self.apply(ctx);
    self.invoke_next_async(ctx, cancel).await
  }
}

type SignupStep = FnHandler<SignupRequest, SignupOutcome>;

#[tokio::main]
async fn main() -> Result<(), BatonError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Basic Execution Plan Example ---");

  // 3. Assemble the plan in traversal order
  let mut plan = ExecutionPlan::<SignupRequest, SignupOutcome>::new();
  plan.append_handler(Arc::new(NormalizeEmail::default()))?;
  plan.append_handler(Arc::new(SignupStep::new("reject_invalid_email", |ctx: &mut SignupCtx| {
    if !ctx.output.normalized_email.contains('@') {
      ctx.output.notes.push("rejected: not an email address".to_string());
      return Ok(PipelineControl::Stop);
    }
    Ok(PipelineControl::Continue)
  })))?;
  plan.append_handler(Arc::new(SignupStep::new("accept", |ctx: &mut SignupCtx| {
    ctx.output.accepted = true;
    ctx.output.notes.push(format!("welcome, {}", ctx.input.display_name));
    Ok(PipelineControl::Continue)
  })))?;

  // 4. Insert relative to a handler type
  plan.add_handler_after::<NormalizeEmail>(Arc::new(SignupStep::new("audit", |ctx: &mut SignupCtx| {
    info!(email = %ctx.output.normalized_email, "Signup attempt.");
    Ok(PipelineControl::Continue)
  })))?;
  info!(?plan, "Plan assembled.");

  // 5. Execute synchronously and asynchronously
  let accepted = plan.execute(SignupRequest {
    email: "  Ada@Example.COM ".to_string(),
    display_name: "Ada".to_string(),
  })?;
  info!(?accepted, "Synchronous execution finished.");
  assert!(accepted.accepted);

  let rejected = plan
    .execute_async(
      SignupRequest {
        email: "not-an-email".to_string(),
        display_name: "Bob".to_string(),
      },
      &CancellationToken::new(),
    )
    .await?;
  info!(?rejected, "Asynchronous execution finished.");
  assert!(!rejected.accepted);

  Ok(())
}
