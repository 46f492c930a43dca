//! Admin-only writes: creating and editing events.
//!
//! Publication changes live in [`crate::publication`].

use tracing::info;
use uuid::Uuid;

use crate::{
  Error, Result,
  event::{Event, EventPatch, NewEvent},
  role::ViewerRole,
  store::EventStore,
};

/// Fail with [`Error::Forbidden`] unless `role` is an admin.
pub fn authorize(role: ViewerRole) -> Result<()> {
  if role.is_admin() { Ok(()) } else { Err(Error::Forbidden { role }) }
}

/// Validate `input` and store it as a new Draft.
pub async fn create_event<S: EventStore>(
  store: &S,
  role: ViewerRole,
  input: NewEvent,
) -> Result<Event> {
  authorize(role)?;
  let input = input.normalized()?;

  let event = store.insert_event(input).await.map_err(Error::write)?;
  info!(event_id = %event.id, title = %event.title, "created draft event");
  Ok(event)
}

/// Validate `patch`, apply it to event `id`, and return the stored row.
pub async fn edit_event<S: EventStore>(
  store: &S,
  role: ViewerRole,
  id: Uuid,
  patch: EventPatch,
) -> Result<Event> {
  authorize(role)?;
  let patch = patch.normalized()?;

  let event = store
    .update_event(id, patch)
    .await
    .map_err(Error::write)?
    .ok_or(Error::EventNotFound(id))?;
  info!(event_id = %id, "edited event");
  Ok(event)
}
