//! A refreshable event list where the newest request always wins.
//!
//! View code refreshes when filters change; responses can arrive out of
//! order. [`EventFeed`] tags every refresh with a generation number and only
//! keeps a response if no newer refresh has started since.

use std::sync::{
  Arc, Mutex, PoisonError,
  atomic::{AtomicU64, Ordering},
};

use tracing::debug;

use crate::{
  Error, Result,
  event::Event,
  store::{EventFilter, EventStore},
};

/// What happened to a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
  /// This response is now the feed's contents.
  Applied(Vec<Event>),
  /// A newer refresh started before this one finished; the response was
  /// dropped.
  Superseded,
}

#[derive(Debug, Default)]
struct Snapshot {
  generation: u64,
  events:     Option<Vec<Event>>,
}

/// The latest successfully fetched event list.
pub struct EventFeed<S> {
  store:      Arc<S>,
  generation: AtomicU64,
  latest:     Mutex<Snapshot>,
}

impl<S: EventStore> EventFeed<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      generation: AtomicU64::new(0),
      latest: Mutex::new(Snapshot::default()),
    }
  }

  /// Fetch with `filter` and keep the result unless a newer refresh has
  /// started in the meantime.
  ///
  /// A failed fetch leaves the previous contents in place. Failures of
  /// superseded fetches are dropped along with their responses.
  pub async fn refresh(&self, filter: EventFilter) -> Result<Refresh> {
    let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let response = self.store.list_events(filter).await;

    let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
    if self.generation.load(Ordering::SeqCst) != ticket || latest.generation > ticket {
      debug!(ticket, "discarding superseded event fetch");
      return Ok(Refresh::Superseded);
    }

    let events = response.map_err(Error::fetch)?;
    latest.generation = ticket;
    latest.events = Some(events.clone());
    Ok(Refresh::Applied(events))
  }

  /// The last applied event list, or `None` before the first success.
  pub fn latest(&self) -> Option<Vec<Event>> {
    self
      .latest
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .events
      .clone()
  }
}
