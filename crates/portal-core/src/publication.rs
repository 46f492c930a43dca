//! The Draft/Published lifecycle of an event.
//!
//! Two states, no terminal one. Only admins move an event between them, and
//! every move is one conditional `set_published` call against the store.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result,
  admin::authorize,
  event::Event,
  role::ViewerRole,
  store::EventStore,
};

/// Whether an event is visible to non-admins.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PublicationState {
  /// Initial state. Admin-only.
  Draft,
  Published,
}

impl PublicationState {
  pub fn from_published(published: bool) -> Self {
    if published { Self::Published } else { Self::Draft }
  }

  pub fn is_published(self) -> bool { matches!(self, Self::Published) }

  /// The state `transition` leads to from `self`.
  pub fn apply(self, transition: Transition) -> Result<Self> {
    match (self, transition) {
      (Self::Draft, Transition::Publish) => Ok(Self::Published),
      (Self::Published, Transition::Unpublish) => Ok(Self::Draft),
      (Self::Draft, Transition::Toggle) => Ok(Self::Published),
      (Self::Published, Transition::Toggle) => Ok(Self::Draft),
      (from, Transition::Publish) => Err(Error::InvalidTransition { from, to: Self::Published }),
      (from, Transition::Unpublish) => Err(Error::InvalidTransition { from, to: Self::Draft }),
    }
  }
}

/// A requested move between publication states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
  /// Draft → Published.
  Publish,
  /// Published → Draft.
  Unpublish,
  /// Whichever of the two applies.
  Toggle,
}

/// How many times [`transition`] re-reads an event that changed between its
/// read and its write.
const MAX_ATTEMPTS: usize = 3;

/// Move event `id` through `transition` on behalf of `role`.
///
/// The write only lands if the event is still in the state that was read.
/// When another writer got there first the state is read again, so a
/// concurrent `Publish` fails with [`Error::InvalidTransition`] and a
/// concurrent `Toggle` flips the newer state. On a write error nothing is
/// applied.
pub async fn transition<S: EventStore>(
  store: &S,
  role: ViewerRole,
  id: Uuid,
  transition: Transition,
) -> Result<Event> {
  authorize(role)?;

  for _ in 0..MAX_ATTEMPTS {
    let current = store
      .get_event(id)
      .await
      .map_err(Error::fetch)?
      .ok_or(Error::EventNotFound(id))?;

    let from = current.publication_state();
    let to = from.apply(transition)?;

    let stored = store
      .set_published(id, from.is_published(), to.is_published())
      .await
      .map_err(Error::write)?;

    if let Some(event) = stored {
      info!(event_id = %id, %from, %to, "publication state changed");
      return Ok(event);
    }
    debug!(event_id = %id, %from, "publication state moved before write, re-reading");
  }

  Err(Error::Conflict(id))
}
