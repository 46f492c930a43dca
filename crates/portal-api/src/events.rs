//! Handlers for `/events` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/events` | `?scope=all\|upcoming\|archive`, `q`, `fields=title,audience,...`; grouped by day |
//! | `GET`   | `/events/{id}` | 404 for missing events and for drafts seen by non-admins |
//! | `POST`  | `/events` | Admin. Body: [`CreateBody`]; returns 201 + the new Draft |
//! | `PATCH` | `/events/{id}` | Admin. Body: [`PatchBody`]; `null` clears a field |
//! | `POST`  | `/events/{id}/publish` | Admin. Draft → Published |
//! | `POST`  | `/events/{id}/unpublish` | Admin. Published → Draft |
//! | `POST`  | `/events/{id}/toggle` | Admin. Either direction |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use portal_core::{
  admin::{authorize, create_event, edit_event},
  calendar::{CalendarQuery, TimeScope, load_calendar, load_event},
  event::{Audience, EventPatch, NewEvent},
  normalize::normalize_date,
  publication::{Transition, transition},
  search::SearchField,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::{
  AppState, PortalStore,
  error::ApiError,
  view::{CalendarResponse, EventView},
  viewer::Viewer,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

/// Normalize a submitted start time in the viewers' zone.
///
/// `null` and blank strings mean "not scheduled". Anything else that does not
/// parse is rejected so a typo never silently unschedules an event.
fn parse_start(value: Option<Value>, tz: &Tz) -> Result<Option<DateTime<Utc>>, ApiError> {
  match value {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
    Some(v) => normalize_date(&v, tz)
      .map(Some)
      .ok_or_else(|| ApiError::BadRequest(format!("unrecognised start_at: {v}"))),
  }
}

fn parse_fields(raw: &str) -> Result<Vec<SearchField>, ApiError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|f| !f.is_empty())
    .map(|f| {
      f.parse::<SearchField>()
        .map_err(|_| ApiError::BadRequest(format!("unknown search field: {f}")))
    })
    .collect()
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub scope:  TimeScope,
  /// Search box contents.
  pub q:      Option<String>,
  /// Comma-separated [`SearchField`] names. Defaults to all of them.
  pub fields: Option<String>,
}

/// `GET /events[?scope=...][&q=...][&fields=...]`
pub async fn list<S: PortalStore>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Query(params): Query<ListParams>,
) -> Result<Json<CalendarResponse>, ApiError> {
  let mut query = CalendarQuery::new(viewer.role)
    .with_scope(params.scope)
    .with_grace_window(state.settings.grace_window);
  if let Some(q) = params.q {
    query = query.with_search(q);
  }
  if let Some(fields) = params.fields.as_deref() {
    let fields = parse_fields(fields)?;
    if !fields.is_empty() {
      query = query.with_search_fields(fields);
    }
  }

  let tz = state.settings.timezone;
  let view = load_calendar(state.store.as_ref(), state.clock.as_ref(), &query, &tz).await?;
  Ok(Json(CalendarResponse::new(view, state.settings.grace_window, &tz)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /events/{id}`
pub async fn get_one<S: PortalStore>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<EventView>, ApiError> {
  let event = load_event(state.store.as_ref(), id, viewer.role)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("event {id}")))?;
  Ok(Json(state.view(event)))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// Body of `POST /events`. Shaped like the admin form: every field but the
/// title is optional, and `start_at` may be a `datetime-local` value.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:             String,
  pub start_at:          Option<Value>,
  pub audience:          Option<Audience>,
  pub short_description: Option<String>,
  pub full_description:  Option<String>,
  pub stream_url:        Option<String>,
  pub worksheet_url:     Option<String>,
  pub archive_url:       Option<String>,
}

/// `POST /events`
pub async fn create<S: PortalStore>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  authorize(viewer.role)?;
  let input = NewEvent {
    title:             body.title,
    start_at:          parse_start(body.start_at, &state.settings.timezone)?,
    audience:          body.audience,
    short_description: body.short_description,
    full_description:  body.full_description,
    stream_url:        body.stream_url,
    worksheet_url:     body.worksheet_url,
    archive_url:       body.archive_url,
  };

  let event = create_event(state.store.as_ref(), viewer.role, input).await?;
  Ok((StatusCode::CREATED, Json(state.view(event))))
}

// ─── Edit ────────────────────────────────────────────────────────────────────

/// Body of `PATCH /events/{id}`. Omitted fields are left alone; `null`
/// clears a nullable field. Publication is changed through the transition
/// endpoints only.
#[derive(Debug, Default, Deserialize)]
pub struct PatchBody {
  pub title:             Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub start_at:          Option<Option<Value>>,
  #[serde(default, deserialize_with = "double_option")]
  pub audience:          Option<Option<Audience>>,
  #[serde(default, deserialize_with = "double_option")]
  pub short_description: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub full_description:  Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub stream_url:        Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub worksheet_url:     Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub archive_url:       Option<Option<String>>,
}

/// `PATCH /events/{id}`
pub async fn patch_one<S: PortalStore>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<Uuid>,
  Json(body): Json<PatchBody>,
) -> Result<Json<EventView>, ApiError> {
  authorize(viewer.role)?;
  let start_at = body
    .start_at
    .map(|v| parse_start(v, &state.settings.timezone))
    .transpose()?;

  let patch = EventPatch {
    title: body.title,
    start_at,
    audience: body.audience,
    short_description: body.short_description,
    full_description: body.full_description,
    stream_url: body.stream_url,
    worksheet_url: body.worksheet_url,
    archive_url: body.archive_url,
    is_published: None,
  };

  let event = edit_event(state.store.as_ref(), viewer.role, id, patch).await?;
  Ok(Json(state.view(event)))
}

// ─── Publication ─────────────────────────────────────────────────────────────

async fn run_transition<S: PortalStore>(
  state: &AppState<S>,
  viewer: &Viewer,
  id: Uuid,
  to: Transition,
) -> Result<Json<EventView>, ApiError> {
  let event = transition(state.store.as_ref(), viewer.role, id, to).await?;
  Ok(Json(state.view(event)))
}

/// `POST /events/{id}/publish`
pub async fn publish<S: PortalStore>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<EventView>, ApiError> {
  run_transition(&state, &viewer, id, Transition::Publish).await
}

/// `POST /events/{id}/unpublish`
pub async fn unpublish<S: PortalStore>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<EventView>, ApiError> {
  run_transition(&state, &viewer, id, Transition::Unpublish).await
}

/// `POST /events/{id}/toggle`
pub async fn toggle<S: PortalStore>(
  State(state): State<AppState<S>>,
  viewer: Viewer,
  Path(id): Path<Uuid>,
) -> Result<Json<EventView>, ApiError> {
  run_transition(&state, &viewer, id, Transition::Toggle).await
}
