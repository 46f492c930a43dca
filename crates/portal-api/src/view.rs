//! Response shapes: events as the calendar screens render them.

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use portal_core::{
  calendar::{CalendarView, TimeScope},
  event::Event,
  grouping::{DayBucket, DayKey},
  normalize::audience_label,
  publication::PublicationState,
  role::ViewerRole,
  temporal::{Period, period_of},
};
use serde::Serialize;

/// One event plus its display-only derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
  #[serde(flatten)]
  pub event:          Event,
  pub publication:    PublicationState,
  pub period:         Period,
  /// Canonical segment label, or the cleaned raw audience.
  pub audience_label: String,
  /// `start_at` on the viewers' wall clock. Absent when unscheduled.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub local_start:    Option<DateTime<FixedOffset>>,
}

impl EventView {
  pub fn new<Tz: TimeZone>(event: Event, now: DateTime<Utc>, grace: TimeDelta, tz: &Tz) -> Self {
    Self {
      publication:    event.publication_state(),
      period:         period_of(&event, now, grace),
      audience_label: audience_label(event.audience.as_ref()),
      local_start:    event.start_at.map(|s| s.with_timezone(tz).fixed_offset()),
      event,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketView {
  pub key:    DayKey,
  pub events: Vec<EventView>,
}

/// `GET /events` response body.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
  pub role:         ViewerRole,
  pub scope:        TimeScope,
  pub generated_at: DateTime<Utc>,
  pub total:        usize,
  /// Always zero for non-admins.
  pub drafts:       usize,
  pub buckets:      Vec<BucketView>,
}

impl CalendarResponse {
  pub fn new<Tz: TimeZone>(view: CalendarView, grace: TimeDelta, tz: &Tz) -> Self {
    let total = view.event_count();
    let drafts = view.draft_count();
    let now = view.generated_at;
    let buckets = view
      .buckets
      .into_iter()
      .map(|DayBucket { key, events }| BucketView {
        key,
        events: events.into_iter().map(|e| EventView::new(e, now, grace, tz)).collect(),
      })
      .collect();

    Self {
      role: view.role,
      scope: view.scope,
      generated_at: now,
      total,
      drafts,
      buckets,
    }
  }
}
