// baton/examples/cancellation.rs

use baton::{async_trait, BatonError, CancellationToken, ExecutionContext, ExecutionPlan, HandlerLink, PipelineHandler};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

type FetchCtx = ExecutionContext<Vec<&'static str>, Vec<String>>;

// Fetches each source in turn, checking the token between sources.
#[derive(Default)]
struct FetchSources {
  link: HandlerLink<Vec<&'static str>, Vec<String>>,
}

#[async_trait]
impl PipelineHandler<Vec<&'static str>, Vec<String>> for FetchSources {
  fn link(&self) -> &HandlerLink<Vec<&'static str>, Vec<String>> {
    &self.link
  }

  async fn invoke_async(&self, ctx: &mut FetchCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    for source in ctx.input.clone() {
      tokio::select! {
        _ = cancel.cancelled() => {
          warn!(%source, "Cancelled while fetching.");
          return Err(BatonError::Cancelled);
        }
        _ = tokio::time::sleep(Duration::from_millis(50)) => {
          info!(%source, "Fetched.");
          ctx.output.push(format!("payload from {}", source));
        }
      }
    }
    self.invoke_next_async(ctx, cancel).await
  }
}

#[derive(Default)]
struct Summarize {
  link: HandlerLink<Vec<&'static str>, Vec<String>>,
}

#[async_trait]
impl PipelineHandler<Vec<&'static str>, Vec<String>> for Summarize {
  fn link(&self) -> &HandlerLink<Vec<&'static str>, Vec<String>> {
    &self.link
  }

  async fn invoke_async(&self, ctx: &mut FetchCtx, cancel: &CancellationToken) -> Result<(), BatonError> {
    let summary = format!("{} payloads", ctx.output.len());
    ctx.output.push(summary);
    self.invoke_next_async(ctx, cancel).await
  }
}

#[tokio::main]
async fn main() -> Result<(), BatonError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Cancellation Example ---");

  let mut plan = ExecutionPlan::<Vec<&'static str>, Vec<String>>::new();
  plan.append_handler(Arc::new(FetchSources::default()))?;
  plan.append_handler(Arc::new(Summarize::default()))?;
  let plan = Arc::new(plan);

  // Runs to completion.
  let output = plan.execute_async(vec!["alpha", "beta"], &CancellationToken::new()).await?;
  info!(?output, "Completed run.");

  // Cancelled after the first source.
  let cancel = CancellationToken::new();
  let run = {
    let plan = plan.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move { plan.execute_async(vec!["alpha", "beta", "gamma", "delta"], &cancel).await })
  };
  tokio::time::sleep(Duration::from_millis(75)).await;
  cancel.cancel();

  match run.await {
    Ok(Err(err)) if err.is_cancelled() => info!("Execution stopped after cancellation, as expected."),
    Ok(other) => warn!(?other, "Execution was expected to be cancelled."),
    Err(join_err) => warn!(%join_err, "Execution task panicked."),
  }

  Ok(())
}
