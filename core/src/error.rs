// baton/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatonError {
  /// An argument passed to a plan operation was rejected (bad index, duplicate handler instance).
  #[error("Invalid argument '{argument}': {message}")]
  InvalidArgument { argument: &'static str, message: String },

  /// A type-based lookup found no handler of the requested type.
  #[error("No handler of type {handler_type} was found in the execution plan")]
  HandlerNotFound { handler_type: String },

  #[error("The execution plan has no handlers")]
  NoHandlers,

  /// Returned by handlers that stop because cancellation was requested.
  #[error("Execution was cancelled")]
  Cancelled,

  #[error("Error in user-provided handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },
}

impl BatonError {
  pub(crate) fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
    BatonError::InvalidArgument {
      argument,
      message: message.into(),
    }
  }

  pub(crate) fn handler_not_found<T: ?Sized>() -> Self {
    BatonError::HandlerNotFound {
      handler_type: std::any::type_name::<T>().to_string(),
    }
  }

  /// True for the `Cancelled` variant, including a `Cancelled` wrapped in `HandlerError`.
  pub fn is_cancelled(&self) -> bool {
    match self {
      BatonError::Cancelled => true,
      BatonError::HandlerError { source } => {
        matches!(source.downcast_ref::<BatonError>(), Some(BatonError::Cancelled))
      }
      _ => false,
    }
  }
}

// Lets handler code use `?` on anything anyhow can carry.
impl From<AnyhowError> for BatonError {
  fn from(err: AnyhowError) -> Self {
    BatonError::HandlerError { source: err }
  }
}

pub type BatonResult<T, E = BatonError> = std::result::Result<T, E>;
