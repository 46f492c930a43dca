//! Who may see which event.
//!
//! A Draft is visible to admins only. This check runs first in every read
//! path, before search or grouping can observe the event.

use crate::{event::Event, role::ViewerRole, store::EventFilter};

/// `true` if `role` may see `event`.
pub fn is_visible(event: &Event, role: ViewerRole) -> bool {
  event.is_published || role.is_admin()
}

/// Drop every event `role` may not see, keeping the order of the rest.
pub fn retain_visible(mut events: Vec<Event>, role: ViewerRole) -> Vec<Event> {
  events.retain(|e| is_visible(e, role));
  events
}

/// The store-side filter to use for `role`: non-admins only ever ask for
/// published rows.
pub fn store_filter_for(role: ViewerRole) -> EventFilter {
  EventFilter { published_only: !role.is_admin() }
}
