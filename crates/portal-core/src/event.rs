//! Event types: the scheduled broadcasts, worksheets and streams shown in
//! the portal calendar.
//!
//! An [`Event`] is created as a Draft through the admin flow and changed only
//! through field edits ([`EventPatch`]) or the publish/unpublish toggle. Day
//! keys, classifications and search matches are always derived from it, never
//! stored on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, publication::PublicationState};

// ─── Audience ────────────────────────────────────────────────────────────────

/// The viewer segment an event is meant for.
///
/// Rows written by older versions of the portal hold free text
/// (`"1. stupeň ZŠ"`); newer ones hold a list of tags. Both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
  Text(String),
  Tags(Vec<String>),
}

impl Audience {
  /// Trim the text (or every tag, dropping blank ones). Returns `None` when
  /// nothing is left.
  pub fn cleaned(self) -> Option<Self> {
    match self {
      Self::Text(text) => {
        let text = text.trim();
        (!text.is_empty()).then(|| Self::Text(text.to_owned()))
      }
      Self::Tags(tags) => {
        let tags: Vec<String> = tags
          .iter()
          .map(|t| t.trim())
          .filter(|t| !t.is_empty())
          .map(str::to_owned)
          .collect();
        (!tags.is_empty()).then_some(Self::Tags(tags))
      }
    }
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// A stored event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  /// Assigned by the store at creation; never changes.
  pub id:                Uuid,
  pub title:             String,
  /// `None` means the event is not scheduled yet.
  pub start_at:          Option<DateTime<Utc>>,
  pub audience:          Option<Audience>,
  pub short_description: Option<String>,
  pub full_description:  Option<String>,
  pub stream_url:        Option<String>,
  pub worksheet_url:     Option<String>,
  pub archive_url:       Option<String>,
  pub is_published:      bool,
  /// Server-assigned.
  pub created_at:        DateTime<Utc>,
  /// Server-assigned; refreshed on every update.
  pub updated_at:        DateTime<Utc>,
}

impl Event {
  pub fn publication_state(&self) -> PublicationState {
    PublicationState::from_published(self.is_published)
  }
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::EventStore::insert_event`].
///
/// `id`, `created_at` and `updated_at` are assigned by the store, and every
/// new event starts as a Draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEvent {
  pub title:             String,
  pub start_at:          Option<DateTime<Utc>>,
  pub audience:          Option<Audience>,
  pub short_description: Option<String>,
  pub full_description:  Option<String>,
  pub stream_url:        Option<String>,
  pub worksheet_url:     Option<String>,
  pub archive_url:       Option<String>,
}

impl NewEvent {
  /// Convenience constructor with all optional fields unset.
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Self::default() }
  }

  /// Trim every text field, turn blank optional fields into `None`, and
  /// reject a blank title.
  pub fn normalized(self) -> Result<Self> {
    Ok(Self {
      title:             required_title(&self.title)?,
      start_at:          self.start_at,
      audience:          self.audience.and_then(Audience::cleaned),
      short_description: clean_text(self.short_description),
      full_description:  clean_text(self.full_description),
      stream_url:        clean_text(self.stream_url),
      worksheet_url:     clean_text(self.worksheet_url),
      archive_url:       clean_text(self.archive_url),
    })
  }
}

// ─── EventPatch ──────────────────────────────────────────────────────────────

/// A partial update passed to [`crate::store::EventStore::update_event`].
///
/// The outer `Option` on a nullable field says whether to touch it; the inner
/// one is the new value, so `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
  pub title:             Option<String>,
  pub start_at:          Option<Option<DateTime<Utc>>>,
  pub audience:          Option<Option<Audience>>,
  pub short_description: Option<Option<String>>,
  pub full_description:  Option<Option<String>>,
  pub stream_url:        Option<Option<String>>,
  pub worksheet_url:     Option<Option<String>>,
  pub archive_url:       Option<Option<String>>,
  pub is_published:      Option<bool>,
}

impl EventPatch {
  /// A patch that only sets the publication flag.
  pub fn publication(published: bool) -> Self {
    Self { is_published: Some(published), ..Self::default() }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Apply the same cleaning rules as [`NewEvent::normalized`] to every field
  /// the patch touches.
  pub fn normalized(self) -> Result<Self> {
    Ok(Self {
      title:             self.title.as_deref().map(required_title).transpose()?,
      start_at:          self.start_at,
      audience:          self.audience.map(|a| a.and_then(Audience::cleaned)),
      short_description: self.short_description.map(clean_text),
      full_description:  self.full_description.map(clean_text),
      stream_url:        self.stream_url.map(clean_text),
      worksheet_url:     self.worksheet_url.map(clean_text),
      archive_url:       self.archive_url.map(clean_text),
      is_published:      self.is_published,
    })
  }

  /// Apply the patch to an in-memory copy. Server-assigned timestamps are
  /// left alone.
  pub fn apply_to(&self, event: &mut Event) {
    if let Some(title) = &self.title {
      event.title = title.clone();
    }
    if let Some(start_at) = self.start_at {
      event.start_at = start_at;
    }
    if let Some(audience) = &self.audience {
      event.audience = audience.clone();
    }
    assign(&mut event.short_description, &self.short_description);
    assign(&mut event.full_description, &self.full_description);
    assign(&mut event.stream_url, &self.stream_url);
    assign(&mut event.worksheet_url, &self.worksheet_url);
    assign(&mut event.archive_url, &self.archive_url);
    if let Some(published) = self.is_published {
      event.is_published = published;
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn required_title(title: &str) -> Result<String> {
  let title = title.trim();
  if title.is_empty() {
    return Err(Error::EmptyTitle);
  }
  Ok(title.to_owned())
}

fn clean_text(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn assign(slot: &mut Option<String>, update: &Option<Option<String>>) {
  if let Some(value) = update {
    slot.clone_from(value);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_event_trims_and_drops_blank_fields() {
    let input = NewEvent {
      title: "  Wellbeing  ".into(),
      audience: Some(Audience::Text("   ".into())),
      short_description: Some("".into()),
      stream_url: Some(" https://example.com/live ".into()),
      ..NewEvent::default()
    };

    let cleaned = input.normalized().unwrap();
    assert_eq!(cleaned.title, "Wellbeing");
    assert_eq!(cleaned.audience, None);
    assert_eq!(cleaned.short_description, None);
    assert_eq!(cleaned.stream_url.as_deref(), Some("https://example.com/live"));
  }

  #[test]
  fn blank_title_is_rejected() {
    assert!(matches!(
      NewEvent::new(" \t ").normalized(),
      Err(Error::EmptyTitle)
    ));
    let patch = EventPatch { title: Some("  ".into()), ..EventPatch::default() };
    assert!(matches!(patch.normalized(), Err(Error::EmptyTitle)));
  }

  #[test]
  fn tag_list_drops_blank_entries() {
    let tags = Audience::Tags(vec![" Seniors ".into(), "".into(), "Community".into()]);
    assert_eq!(
      tags.cleaned(),
      Some(Audience::Tags(vec!["Seniors".into(), "Community".into()]))
    );
    assert_eq!(Audience::Tags(vec![" ".into()]).cleaned(), None);
  }

  #[test]
  fn audience_deserializes_from_text_or_list() {
    let text: Audience = serde_json::from_str(r#""2. stupeň ZŠ""#).unwrap();
    assert_eq!(text, Audience::Text("2. stupeň ZŠ".into()));
    let tags: Audience = serde_json::from_str(r#"["Seniors","Community"]"#).unwrap();
    assert_eq!(tags, Audience::Tags(vec!["Seniors".into(), "Community".into()]));
  }

  #[test]
  fn patch_clears_and_sets_fields() {
    let now = Utc::now();
    let mut event = Event {
      id:                Uuid::new_v4(),
      title:             "Old".into(),
      start_at:          Some(now),
      audience:          None,
      short_description: Some("short".into()),
      full_description:  None,
      stream_url:        None,
      worksheet_url:     None,
      archive_url:       None,
      is_published:      false,
      created_at:        now,
      updated_at:        now,
    };

    let patch = EventPatch {
      title: Some("New".into()),
      start_at: Some(None),
      short_description: Some(None),
      is_published: Some(true),
      ..EventPatch::default()
    };
    patch.apply_to(&mut event);

    assert_eq!(event.title, "New");
    assert_eq!(event.start_at, None);
    assert_eq!(event.short_description, None);
    assert!(event.is_published);
    assert_eq!(event.updated_at, now);
  }

  #[test]
  fn empty_patch() {
    assert!(EventPatch::default().is_empty());
    assert!(!EventPatch::publication(true).is_empty());
  }
}
