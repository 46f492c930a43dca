//! Shared helpers for the integration tests: an in-memory [`EventStore`]
//! and event builders.

#![allow(dead_code)]

use std::{
  collections::HashSet,
  sync::{Mutex, atomic::{AtomicBool, Ordering}},
};

use chrono::{DateTime, Utc};
use portal_core::{
  event::{Event, EventPatch, NewEvent},
  store::{EventFilter, EventStore},
};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
  #[error("store unavailable")]
  Unavailable,
}

/// A `Vec`-backed store. Writes can be made to fail to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
  events:      Mutex<Vec<Event>>,
  fail_writes: AtomicBool,
  fail_reads:  AtomicBool,
  /// Make every conditional publication write miss, as if another writer
  /// always got there first.
  contended:   AtomicBool,
}

impl MemoryStore {
  pub fn with_events(events: Vec<Event>) -> Self {
    Self { events: Mutex::new(events), ..Self::default() }
  }

  pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst) }

  pub fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst) }

  pub fn contended(&self, contended: bool) { self.contended.store(contended, Ordering::SeqCst) }

  pub fn snapshot(&self) -> Vec<Event> { self.events.lock().unwrap().clone() }
}

impl EventStore for MemoryStore {
  type Error = MemoryError;

  async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>, MemoryError> {
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    let events = self.events.lock().unwrap();
    Ok(
      events
        .iter()
        .filter(|e| !filter.published_only || e.is_published)
        .cloned()
        .collect(),
    )
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>, MemoryError> {
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    Ok(self.events.lock().unwrap().iter().find(|e| e.id == id).cloned())
  }

  async fn insert_event(&self, input: NewEvent) -> Result<Event, MemoryError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    let now = Utc::now();
    let event = Event {
      id:                Uuid::new_v4(),
      title:             input.title,
      start_at:          input.start_at,
      audience:          input.audience,
      short_description: input.short_description,
      full_description:  input.full_description,
      stream_url:        input.stream_url,
      worksheet_url:     input.worksheet_url,
      archive_url:       input.archive_url,
      is_published:      false,
      created_at:        now,
      updated_at:        now,
    };
    self.events.lock().unwrap().push(event.clone());
    Ok(event)
  }

  async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>, MemoryError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    let mut events = self.events.lock().unwrap();
    Ok(events.iter_mut().find(|e| e.id == id).map(|event| {
      patch.apply_to(event);
      event.updated_at = Utc::now();
      event.clone()
    }))
  }

  async fn set_published(&self, id: Uuid, from: bool, to: bool) -> Result<Option<Event>, MemoryError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    if self.contended.load(Ordering::SeqCst) {
      return Ok(None);
    }
    let mut events = self.events.lock().unwrap();
    Ok(
      events
        .iter_mut()
        .find(|e| e.id == id && e.is_published == from)
        .map(|event| {
          event.is_published = to;
          event.updated_at = Utc::now();
          event.clone()
        }),
    )
  }
}

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

pub fn id_set<'a>(events: impl IntoIterator<Item = &'a Event>) -> HashSet<Uuid> {
  events.into_iter().map(|e| e.id).collect()
}
