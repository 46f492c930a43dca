//! [`SqliteStore`], the SQLite implementation of [`EventStore`] and
//! [`AdminDirectory`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::debug;
use uuid::Uuid;

use portal_core::{
  event::{Event, EventPatch, NewEvent},
  role::AdminDirectory,
  store::{EventFilter, EventStore},
};

use crate::{
  Error, Result,
  encode::{EVENT_COLUMNS, RawEvent, encode_audience, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portal event store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Platform admins ───────────────────────────────────────────────────────

  /// Give `user` platform-admin rights. Granting twice is a no-op.
  pub async fn grant_admin(&self, user: &str) -> Result<()> {
    let user = user.trim().to_owned();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO platform_admins (user_id, granted_at) VALUES (?1, ?2)
           ON CONFLICT (user_id) DO NOTHING",
          rusqlite::params![user, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Withdraw platform-admin rights. Returns whether `user` held them.
  pub async fn revoke_admin(&self, user: &str) -> Result<bool> {
    let user = user.trim().to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM platform_admins WHERE user_id = ?1",
          rusqlite::params![user],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  pub async fn list_admins(&self) -> Result<Vec<String>> {
    let admins = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT user_id FROM platform_admins ORDER BY user_id")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(admins)
  }

  /// Run raw SQL, for seeding rows the typed API would refuse to write.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// The `SET` assignments for an update, one per field `patch` touches.
fn patch_assignments(patch: &EventPatch) -> Result<Vec<(&'static str, Value)>> {
  fn text(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::Text)
  }

  let mut sets: Vec<(&'static str, Value)> = vec![];
  if let Some(title) = &patch.title {
    sets.push(("title", Value::Text(title.clone())));
  }
  if let Some(start_at) = patch.start_at {
    sets.push(("start_at", start_at.map_or(Value::Null, |dt| Value::Text(encode_dt(dt)))));
  }
  if let Some(audience) = &patch.audience {
    let encoded = audience.as_ref().map(encode_audience).transpose()?;
    sets.push(("audience", encoded.map_or(Value::Null, Value::Text)));
  }
  if let Some(v) = &patch.short_description {
    sets.push(("short_description", text(v)));
  }
  if let Some(v) = &patch.full_description {
    sets.push(("full_description", text(v)));
  }
  if let Some(v) = &patch.stream_url {
    sets.push(("stream_url", text(v)));
  }
  if let Some(v) = &patch.worksheet_url {
    sets.push(("worksheet_url", text(v)));
  }
  if let Some(v) = &patch.archive_url {
    sets.push(("archive_url", text(v)));
  }
  if let Some(published) = patch.is_published {
    sets.push(("is_published", Value::Integer(published.into())));
  }
  sets.push(("updated_at", Value::Text(encode_dt(Utc::now()))));
  Ok(sets)
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>> {
    let where_clause = if filter.published_only { "WHERE is_published = 1" } else { "" };
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events {where_clause} ORDER BY created_at");

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
            rusqlite::params![id_str],
            RawEvent::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn insert_event(&self, input: NewEvent) -> Result<Event> {
    let input = input.normalized()?;
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

    let id_str       = encode_uuid(event.id);
    let title        = event.title.clone();
    let start_str    = event.start_at.map(encode_dt);
    let audience_str = event.audience.as_ref().map(encode_audience).transpose()?;
    let short        = event.short_description.clone();
    let full         = event.full_description.clone();
    let stream       = event.stream_url.clone();
    let worksheet    = event.worksheet_url.clone();
    let archive      = event.archive_url.clone();
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             event_id, title, start_at, audience, short_description,
             full_description, stream_url, worksheet_url, archive_url,
             is_published, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?10)",
          rusqlite::params![
            id_str,
            title,
            start_str,
            audience_str,
            short,
            full,
            stream,
            worksheet,
            archive,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    debug!(event_id = %event.id, "inserted event row");
    Ok(event)
  }

  async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>> {
    let sets = patch_assignments(&patch.normalized()?)?;
    let assignments = sets
      .iter()
      .enumerate()
      .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "UPDATE events SET {assignments} WHERE event_id = ?{} RETURNING {EVENT_COLUMNS}",
      sets.len() + 1
    );

    let mut params: Vec<Value> = sets.into_iter().map(|(_, v)| v).collect();
    params.push(Value::Text(encode_uuid(id)));

    // One statement, so a failed update writes nothing.
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params_from_iter(params), RawEvent::from_row)
          .optional()?)
      })
      .await?;

    if raw.is_some() {
      debug!(event_id = %id, "updated event row");
    }
    raw.map(RawEvent::into_event).transpose()
  }

  async fn set_published(&self, id: Uuid, from: bool, to: bool) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE events SET is_published = ?1, updated_at = ?2
               WHERE event_id = ?3 AND is_published = ?4
               RETURNING {EVENT_COLUMNS}"
            ),
            rusqlite::params![to, at_str, id_str, from],
            RawEvent::from_row,
          )
          .optional()?)
      })
      .await?;

    if raw.is_some() {
      debug!(event_id = %id, from, to, "updated publication flag");
    }
    raw.map(RawEvent::into_event).transpose()
  }
}

// ─── AdminDirectory impl ─────────────────────────────────────────────────────

impl AdminDirectory for SqliteStore {
  type Error = Error;

  async fn is_platform_admin<'a>(&'a self, user: &'a str) -> Result<bool> {
    let user = user.trim().to_owned();

    let found = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM platform_admins WHERE user_id = ?1",
            rusqlite::params![user],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;
    Ok(found)
  }
}
