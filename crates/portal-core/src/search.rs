//! Free-text search over events.
//!
//! Matching is a case-insensitive substring test over the concatenation of
//! the configured fields. Run it on already-visible events only; it does not
//! know about drafts.

use serde::{Deserialize, Serialize};

use crate::{event::Event, normalize::audience_label};

/// An event field the search box looks at.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchField {
  Title,
  /// The normalized audience label, not the raw value.
  Audience,
  ShortDescription,
  FullDescription,
}

impl SearchField {
  pub const ALL: [Self; 4] = [
    Self::Title,
    Self::Audience,
    Self::ShortDescription,
    Self::FullDescription,
  ];

  fn text(self, event: &Event) -> String {
    match self {
      Self::Title => event.title.clone(),
      Self::Audience => audience_label(event.audience.as_ref()),
      Self::ShortDescription => event.short_description.clone().unwrap_or_default(),
      Self::FullDescription => event.full_description.clone().unwrap_or_default(),
    }
  }
}

/// A prepared query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
  needle: String,
  fields: Vec<SearchField>,
}

impl TextSearch {
  /// Prepare `query` against `fields`, searched in the given order.
  pub fn new(query: &str, fields: &[SearchField]) -> Self {
    Self {
      needle: query.trim().to_lowercase(),
      fields: fields.to_vec(),
    }
  }

  /// Prepare `query` against every [`SearchField`].
  pub fn everywhere(query: &str) -> Self { Self::new(query, &SearchField::ALL) }

  /// A blank query matches everything.
  pub fn is_blank(&self) -> bool { self.needle.is_empty() }

  pub fn matches(&self, event: &Event) -> bool {
    if self.is_blank() {
      return true;
    }
    let haystack = self
      .fields
      .iter()
      .map(|f| f.text(event))
      .collect::<Vec<_>>()
      .join(" ")
      .to_lowercase();
    haystack.contains(&self.needle)
  }

  /// Keep the matching events, in order.
  pub fn filter(&self, mut events: Vec<Event>) -> Vec<Event> {
    if !self.is_blank() {
      events.retain(|e| self.matches(e));
    }
    events
  }
}
