//! Event builders shared by the unit tests.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event::{Audience, Event};

pub fn event(title: &str, start_at: Option<DateTime<Utc>>, published: bool) -> Event {
  let created = Utc::now();
  Event {
    id: Uuid::new_v4(),
    title: title.to_owned(),
    start_at,
    audience: None,
    short_description: None,
    full_description: None,
    stream_url: None,
    worksheet_url: None,
    archive_url: None,
    is_published: published,
    created_at: created,
    updated_at: created,
  }
}

pub fn with_audience(mut event: Event, audience: &str) -> Event {
  event.audience = Some(Audience::Text(audience.to_owned()));
  event
}

pub fn ids(events: &[Event]) -> Vec<Uuid> { events.iter().map(|e| e.id).collect() }
