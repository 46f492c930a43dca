//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. The audience is stored as JSON: a string for the
//! free-text form, an array for the tag form.

use chrono::{DateTime, Utc};
use portal_core::{
  event::{Audience, Event},
  normalize::parse_date_str,
};
use tracing::warn;
use uuid::Uuid;

use crate::{Error, Result};

/// Column list shared by every `SELECT` that feeds [`RawEvent`].
pub const EVENT_COLUMNS: &str = "event_id, title, start_at, audience, short_description, \
   full_description, stream_url, worksheet_url, archive_url, is_published, created_at, updated_at";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// `start_at` may have been written by other tools in looser formats. Anything
/// that does not parse is read back as "not scheduled".
fn decode_start(raw: Option<String>, event_id: &str) -> Option<DateTime<Utc>> {
  let raw = raw?;
  let parsed = parse_date_str(&raw, &Utc);
  if parsed.is_none() {
    warn!(event_id, start_at = %raw, "unparsable start_at; treating event as unscheduled");
  }
  parsed
}

// ─── Audience ────────────────────────────────────────────────────────────────

pub fn encode_audience(audience: &Audience) -> Result<String> {
  Ok(serde_json::to_string(audience)?)
}

/// Plain text that is not valid JSON is taken as a free-text audience.
pub fn decode_audience(s: &str) -> Option<Audience> {
  let audience = serde_json::from_str::<Audience>(s)
    .unwrap_or_else(|_| Audience::Text(s.to_owned()));
  audience.cleaned()
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub event_id:          String,
  pub title:             String,
  pub start_at:          Option<String>,
  pub audience:          Option<String>,
  pub short_description: Option<String>,
  pub full_description:  Option<String>,
  pub stream_url:        Option<String>,
  pub worksheet_url:     Option<String>,
  pub archive_url:       Option<String>,
  pub is_published:      bool,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawEvent {
  /// Read a row selected with [`EVENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:          row.get(0)?,
      title:             row.get(1)?,
      start_at:          row.get(2)?,
      audience:          row.get(3)?,
      short_description: row.get(4)?,
      full_description:  row.get(5)?,
      stream_url:        row.get(6)?,
      worksheet_url:     row.get(7)?,
      archive_url:       row.get(8)?,
      is_published:      row.get(9)?,
      created_at:        row.get(10)?,
      updated_at:        row.get(11)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:                decode_uuid(&self.event_id)?,
      start_at:          decode_start(self.start_at, &self.event_id),
      title:             self.title,
      audience:          self.audience.as_deref().and_then(decode_audience),
      short_description: self.short_description,
      full_description:  self.full_description,
      stream_url:        self.stream_url,
      worksheet_url:     self.worksheet_url,
      archive_url:       self.archive_url,
      is_published:      self.is_published,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}
