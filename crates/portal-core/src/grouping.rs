//! Grouping events into calendar days.
//!
//! Day keys come from `start_at` as seen on the viewer's wall clock, so the
//! same events can bucket differently in different time zones. Buckets are
//! rebuilt on every query and never stored.

use std::{cmp::Ordering, collections::BTreeMap};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;

// ─── Day key ─────────────────────────────────────────────────────────────────

/// The grouping key of a bucket.
///
/// The derived ordering puts every real day before [`DayKey::Unscheduled`],
/// however far in the future the day is.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum DayKey {
  /// A local calendar day.
  Day(NaiveDate),
  /// Sentinel for events without a `start_at`.
  Unscheduled,
}

impl DayKey {
  /// The key for `event` on the wall clock of `tz`.
  pub fn of<Tz: TimeZone>(event: &Event, tz: &Tz) -> Self {
    match event.start_at {
      Some(start) => Self::Day(start.with_timezone(tz).date_naive()),
      None => Self::Unscheduled,
    }
  }

  pub fn is_unscheduled(&self) -> bool { matches!(self, Self::Unscheduled) }

  pub fn date(&self) -> Option<NaiveDate> {
    match self {
      Self::Day(date) => Some(*date),
      Self::Unscheduled => None,
    }
  }
}

// ─── Buckets ─────────────────────────────────────────────────────────────────

/// One calendar day's worth of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
  pub key:    DayKey,
  /// Ordered by `start_at`, ties in input order.
  pub events: Vec<Event>,
}

/// How buckets are ordered relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketOrder {
  /// Earliest day first. Used for upcoming views.
  #[default]
  Chronological,
  /// Latest day first. Used for archive views. The unscheduled bucket still
  /// comes last.
  MostRecentFirst,
}

/// Order two optional start times ascending, absent last.
fn cmp_start(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => a.cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// Group `events` by local calendar day.
///
/// Every input event appears in exactly one bucket and no bucket is empty.
/// Within a bucket events are sorted by `start_at` (stable, so equal times
/// keep their input order). Real days are ordered per `order`; the
/// unscheduled bucket, if any, is always last.
pub fn group_by_day<Tz: TimeZone>(
  events: impl IntoIterator<Item = Event>,
  tz: &Tz,
  order: BucketOrder,
) -> Vec<DayBucket> {
  let mut groups: BTreeMap<DayKey, Vec<Event>> = BTreeMap::new();
  for event in events {
    groups.entry(DayKey::of(&event, tz)).or_default().push(event);
  }

  let mut buckets: Vec<DayBucket> = groups
    .into_iter()
    .map(|(key, mut events)| {
      events.sort_by(|a, b| cmp_start(a.start_at, b.start_at));
      DayBucket { key, events }
    })
    .collect();

  if order == BucketOrder::MostRecentFirst {
    let dated = buckets.iter().take_while(|b| !b.key.is_unscheduled()).count();
    buckets[..dated].reverse();
  }

  buckets
}
