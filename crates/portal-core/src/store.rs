//! The `EventStore` trait and its query type.
//!
//! The trait is implemented by storage backends (e.g. `portal-store-sqlite`).
//! Row-level access control, if any, is the backend's business; the
//! [`EventFilter`] only lets callers ask for published rows as an extra
//! layer on top of [`crate::visibility`].

use std::future::Future;

use uuid::Uuid;

use crate::event::{Event, EventPatch, NewEvent};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`EventStore::list_events`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
  /// Only return rows with `is_published = true`.
  pub published_only: bool,
}

impl EventFilter {
  pub fn published() -> Self { Self { published_only: true } }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the hosted event table.
///
/// Every call is a single request/response; none of them return partial
/// results. All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List events matching `filter`, in no particular order.
  fn list_events(
    &self,
    filter: EventFilter,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Retrieve an event by id. Returns `None` if not found.
  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Persist a new Draft event and return the stored row. The store assigns
  /// `id`, `created_at` and `updated_at`.
  fn insert_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Apply `patch` to the event `id` as one atomic update, refresh
  /// `updated_at`, and return the stored row. Returns `None` if the event
  /// does not exist; on error nothing is written.
  fn update_event(
    &self,
    id: Uuid,
    patch: EventPatch,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Set the publication flag of event `id` to `to`, provided it is still
  /// `from`. Check and write are one atomic update. Returns the stored row,
  /// or `None` if no event `id` currently has the flag set to `from`.
  fn set_published(
    &self,
    id: Uuid,
    from: bool,
    to: bool,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;
}
