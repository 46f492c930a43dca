//! JSON REST API for the membership portal's event calendar.
//!
//! Exposes an axum [`Router`] backed by any store that is both an
//! [`EventStore`] and an [`AdminDirectory`]. Authentication happens in front
//! of this service; see [`viewer`] for how the identity is passed in.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = portal_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod view;
pub mod viewer;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use portal_core::{clock::Clock, event::Event, role::AdminDirectory, store::EventStore};
use tower_http::trace::TraceLayer;

pub use config::{PortalSettings, ServerConfig};
pub use error::ApiError;

use crate::{view::EventView, viewer::Viewer};

/// Everything a store must provide to back the API.
pub trait PortalStore: EventStore + AdminDirectory + 'static {}

impl<T> PortalStore for T where T: EventStore + AdminDirectory + 'static {}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub clock:    Arc<dyn Clock>,
  pub settings: Arc<PortalSettings>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      clock:    Arc::clone(&self.clock),
      settings: Arc::clone(&self.settings),
    }
  }
}

impl<S> AppState<S> {
  /// Project a single event for a response.
  pub fn view(&self, event: Event) -> EventView {
    EventView::new(
      event,
      self.clock.now(),
      self.settings.grace_window,
      &self.settings.timezone,
    )
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router, with every endpoint under `/api`.
pub fn router<S: PortalStore>(state: AppState<S>) -> Router {
  Router::new()
    .nest("/api", api_routes::<S>())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn api_routes<S: PortalStore>() -> Router<AppState<S>> {
  Router::new()
    .route("/viewer", get(viewer_handler))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route("/events/{id}", get(events::get_one::<S>).patch(events::patch_one::<S>))
    .route("/events/{id}/publish", post(events::publish::<S>))
    .route("/events/{id}/unpublish", post(events::unpublish::<S>))
    .route("/events/{id}/toggle", post(events::toggle::<S>))
}

/// `GET /viewer`
async fn viewer_handler(viewer: Viewer) -> Json<Viewer> { Json(viewer) }
