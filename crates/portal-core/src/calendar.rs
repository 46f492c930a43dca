//! The calendar read path: visibility → time scope → search → day buckets.
//!
//! One pipeline serves every calendar screen. The admin draft column, the
//! search box and the future-only toggle are [`CalendarQuery`] options.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::Clock,
  event::Event,
  grouping::{BucketOrder, DayBucket, group_by_day},
  role::ViewerRole,
  search::{SearchField, TextSearch},
  store::EventStore,
  temporal::{classify, default_grace_window},
  visibility::{is_visible, retain_visible, store_filter_for},
};

// ─── Query ───────────────────────────────────────────────────────────────────

/// Which events, relative to now, a view shows.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeScope {
  /// Everything, earliest day first.
  #[default]
  All,
  /// Only upcoming (and unscheduled) events.
  Upcoming,
  /// Only archived events, most recent day first.
  Archive,
}

/// Options for one calendar render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarQuery {
  pub role:          ViewerRole,
  pub scope:         TimeScope,
  /// Search box contents; `None` or blank disables search.
  pub search:        Option<String>,
  pub search_fields: Vec<SearchField>,
  pub grace_window:  TimeDelta,
}

impl CalendarQuery {
  pub fn new(role: ViewerRole) -> Self {
    Self {
      role,
      scope: TimeScope::default(),
      search: None,
      search_fields: SearchField::ALL.to_vec(),
      grace_window: default_grace_window(),
    }
  }

  pub fn with_scope(mut self, scope: TimeScope) -> Self {
    self.scope = scope;
    self
  }

  pub fn with_search(mut self, query: impl Into<String>) -> Self {
    self.search = Some(query.into());
    self
  }

  pub fn with_search_fields(mut self, fields: Vec<SearchField>) -> Self {
    self.search_fields = fields;
    self
  }

  pub fn with_grace_window(mut self, grace: TimeDelta) -> Self {
    self.grace_window = grace;
    self
  }
}

// ─── View ────────────────────────────────────────────────────────────────────

/// A rendered calendar: the buckets plus what produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarView {
  pub role:         ViewerRole,
  pub scope:        TimeScope,
  /// The "now" the view was classified against.
  pub generated_at: DateTime<Utc>,
  pub buckets:      Vec<DayBucket>,
}

impl CalendarView {
  pub fn events(&self) -> impl Iterator<Item = &Event> {
    self.buckets.iter().flat_map(|b| b.events.iter())
  }

  pub fn event_count(&self) -> usize { self.buckets.iter().map(|b| b.events.len()).sum() }

  /// Drafts in the view. Always zero for non-admins.
  pub fn draft_count(&self) -> usize { self.events().filter(|e| !e.is_published).count() }
}

/// Run the pipeline over an already-fetched event list.
pub fn build_calendar<Tz: TimeZone>(
  events: Vec<Event>,
  query: &CalendarQuery,
  now: DateTime<Utc>,
  tz: &Tz,
) -> CalendarView {
  let visible = retain_visible(events, query.role);

  let scoped = match query.scope {
    TimeScope::All => visible,
    TimeScope::Upcoming => classify(visible, now, query.grace_window).upcoming,
    TimeScope::Archive => classify(visible, now, query.grace_window).archived,
  };

  let matched = match query.search.as_deref() {
    Some(q) => TextSearch::new(q, &query.search_fields).filter(scoped),
    None => scoped,
  };

  let order = match query.scope {
    TimeScope::Archive => BucketOrder::MostRecentFirst,
    TimeScope::All | TimeScope::Upcoming => BucketOrder::Chronological,
  };

  CalendarView {
    role:         query.role,
    scope:        query.scope,
    generated_at: now,
    buckets:      group_by_day(matched, tz, order),
  }
}

/// Fetch from `store` and render.
///
/// Non-admin queries also ask the store for published rows only.
pub async fn load_calendar<S, Tz>(
  store: &S,
  clock: &dyn Clock,
  query: &CalendarQuery,
  tz: &Tz,
) -> Result<CalendarView>
where
  S: EventStore,
  Tz: TimeZone,
{
  let events = store
    .list_events(store_filter_for(query.role))
    .await
    .map_err(Error::fetch)?;
  debug!(fetched = events.len(), role = %query.role, scope = %query.scope, "building calendar");
  Ok(build_calendar(events, query, clock.now(), tz))
}

/// Look up a single event for `role`.
///
/// A draft is reported as `None` to non-admins, exactly like a missing
/// event.
pub async fn load_event<S: EventStore>(
  store: &S,
  id: Uuid,
  role: ViewerRole,
) -> Result<Option<Event>> {
  let event = store.get_event(id).await.map_err(Error::fetch)?;
  Ok(event.filter(|e| is_visible(e, role)))
}
