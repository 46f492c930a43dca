//! Error types for `portal-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{publication::PublicationState, role::ViewerRole};

/// A boxed error raised by a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("event title must not be empty")]
  EmptyTitle,

  #[error("{role} viewers may not manage events")]
  Forbidden { role: ViewerRole },

  #[error("cannot move an event from {from} to {to}")]
  InvalidTransition {
    from: PublicationState,
    to:   PublicationState,
  },

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  /// The event kept changing while a transition was being applied.
  #[error("event {0} was changed concurrently, try again")]
  Conflict(Uuid),

  /// Reading from the event store failed. The store's message is passed
  /// through unchanged.
  #[error("{0}")]
  StoreFetch(#[source] BoxError),

  /// Writing to the event store failed. Nothing was applied.
  #[error("{0}")]
  StoreWrite(#[source] BoxError),
}

impl Error {
  pub fn fetch(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::StoreFetch(Box::new(e))
  }

  pub fn write(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::StoreWrite(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
