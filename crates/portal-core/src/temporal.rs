//! Upcoming vs. archived classification.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Minutes an event stays "upcoming" after it starts.
pub const DEFAULT_GRACE_MINUTES: i64 = 5;

pub fn default_grace_window() -> TimeDelta { TimeDelta::minutes(DEFAULT_GRACE_MINUTES) }

/// Which side of "now" an event falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
  Upcoming,
  Archived,
}

/// Classify one event.
///
/// Unscheduled events are always upcoming. A scheduled event is upcoming
/// while `start_at >= now - grace`, so it does not vanish the moment it
/// starts.
pub fn period_of(event: &Event, now: DateTime<Utc>, grace: TimeDelta) -> Period {
  let cutoff = now.checked_sub_signed(grace).unwrap_or(DateTime::<Utc>::MIN_UTC);
  match event.start_at {
    Some(start) if start < cutoff => Period::Archived,
    _ => Period::Upcoming,
  }
}

/// The two halves of a classified event sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
  pub upcoming: Vec<Event>,
  pub archived: Vec<Event>,
}

/// Partition `events` into upcoming and archived, preserving input order
/// within each half. Every event lands in exactly one half.
pub fn classify(
  events: impl IntoIterator<Item = Event>,
  now: DateTime<Utc>,
  grace: TimeDelta,
) -> Classified {
  let mut out = Classified::default();
  for event in events {
    match period_of(&event, now, grace) {
      Period::Upcoming => out.upcoming.push(event),
      Period::Archived => out.archived.push(event),
    }
  }
  out
}
