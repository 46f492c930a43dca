//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone as _, Utc};
use portal_core::{
  calendar::{CalendarQuery, load_calendar, load_event},
  clock::FixedClock,
  event::{Audience, EventPatch, NewEvent},
  grouping::DayKey,
  publication::{PublicationState, Transition, transition},
  role::{AdminDirectory, DirectoryRoleResolver, ViewerRole},
  store::{EventFilter, EventStore},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn wellbeing() -> NewEvent {
  NewEvent {
    title: "Wellbeing pro 1. stupeň".into(),
    start_at: Some(Utc.with_ymd_and_hms(2026, 3, 13, 9, 0, 0).unwrap()),
    audience: Some(Audience::Text("1. stupeň ZŠ".into())),
    stream_url: Some("https://example.com/live".into()),
    ..NewEvent::default()
  }
}

// ─── Inserts and reads ───────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_event() {
  let s = store().await;

  let created = s.insert_event(wellbeing()).await.unwrap();
  assert!(!created.is_published);
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get_event(created.id).await.unwrap().expect("stored row");
  assert_eq!(fetched.title, "Wellbeing pro 1. stupeň");
  assert_eq!(fetched.start_at, created.start_at);
  assert_eq!(fetched.audience, Some(Audience::Text("1. stupeň ZŠ".into())));
  assert_eq!(fetched.stream_url.as_deref(), Some("https://example.com/live"));
  assert_eq!(fetched.worksheet_url, None);
}

#[tokio::test]
async fn get_missing_event_returns_none() {
  let s = store().await;
  assert!(s.get_event(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_rejects_blank_title() {
  let s = store().await;
  let err = s.insert_event(NewEvent::new("  ")).await.unwrap_err();
  assert!(matches!(err, Error::Core(portal_core::Error::EmptyTitle)));
  assert!(s.list_events(EventFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn tag_audience_round_trips() {
  let s = store().await;
  let input = NewEvent {
    audience: Some(Audience::Tags(vec!["Seniors".into(), "Community".into()])),
    ..NewEvent::new("Senior klub")
  };
  let created = s.insert_event(input).await.unwrap();
  let fetched = s.get_event(created.id).await.unwrap().unwrap();
  assert_eq!(
    fetched.audience,
    Some(Audience::Tags(vec!["Seniors".into(), "Community".into()]))
  );
}

#[tokio::test]
async fn list_filters_published_rows() {
  let s = store().await;
  let draft = s.insert_event(NewEvent::new("Draft")).await.unwrap();
  let public = s.insert_event(NewEvent::new("Public")).await.unwrap();
  s.update_event(public.id, EventPatch::publication(true)).await.unwrap();

  let all = s.list_events(EventFilter::default()).await.unwrap();
  assert_eq!(all.len(), 2);

  let published = s.list_events(EventFilter::published()).await.unwrap();
  assert_eq!(published.len(), 1);
  assert_eq!(published[0].id, public.id);
  assert!(published.iter().all(|e| e.id != draft.id));
}

#[tokio::test]
async fn legacy_rows_are_normalized_on_read() {
  let s = store().await;
  s.execute_raw(
    "INSERT INTO events (event_id, title, start_at, audience, is_published, created_at, updated_at)
     VALUES
       ('7a1f0c62-3c1b-4d8e-9b4e-2f0f3f5d1a01', 'Loose date', '2026-03-12 08:00:00+00',
        'Senioři', 1, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00'),
       ('7a1f0c62-3c1b-4d8e-9b4e-2f0f3f5d1a02', 'Garbage date', 'next week',
        NULL, 1, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00');",
  )
  .await
  .unwrap();

  let events = s.list_events(EventFilter::published()).await.unwrap();
  let loose = events.iter().find(|e| e.title == "Loose date").unwrap();
  assert_eq!(loose.start_at, Some(Utc.with_ymd_and_hms(2026, 3, 12, 8, 0, 0).unwrap()));
  assert_eq!(loose.audience, Some(Audience::Text("Senioři".into())));

  let garbage = events.iter().find(|e| e.title == "Garbage date").unwrap();
  assert_eq!(garbage.start_at, None);
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_sets_and_clears_fields() {
  let s = store().await;
  let created = s.insert_event(wellbeing()).await.unwrap();

  let patch = EventPatch {
    title: Some("Wellbeing (moved)".into()),
    start_at: Some(None),
    audience: Some(None),
    worksheet_url: Some(Some("https://example.com/sheet.pdf".into())),
    ..EventPatch::default()
  };
  let returned = s.update_event(created.id, patch).await.unwrap().expect("stored row");

  let fetched = s.get_event(created.id).await.unwrap().unwrap();
  assert_eq!(returned, fetched);
  assert_eq!(fetched.title, "Wellbeing (moved)");
  assert_eq!(fetched.start_at, None);
  assert_eq!(fetched.audience, None);
  assert_eq!(fetched.worksheet_url.as_deref(), Some("https://example.com/sheet.pdf"));
  assert_eq!(fetched.stream_url, created.stream_url);
  assert_eq!(fetched.created_at, created.created_at);
  assert!(fetched.updated_at >= created.updated_at);
}

#[tokio::test]
async fn update_missing_event_returns_none() {
  let s = store().await;
  let updated = s.update_event(Uuid::new_v4(), EventPatch::publication(true)).await.unwrap();
  assert!(updated.is_none());
}

#[tokio::test]
async fn set_published_only_from_expected_state() {
  let s = store().await;
  let created = s.insert_event(wellbeing()).await.unwrap();

  assert!(s.set_published(created.id, true, false).await.unwrap().is_none());
  assert!(!s.get_event(created.id).await.unwrap().unwrap().is_published);

  let published = s.set_published(created.id, false, true).await.unwrap().expect("draft row");
  assert!(published.is_published);
  assert_eq!(published.title, created.title);

  assert!(s.set_published(created.id, false, true).await.unwrap().is_none());
  assert!(s.set_published(Uuid::new_v4(), false, true).await.unwrap().is_none());
}

#[tokio::test]
async fn update_rejects_blank_title() {
  let s = store().await;
  let created = s.insert_event(wellbeing()).await.unwrap();
  let patch = EventPatch { title: Some(" ".into()), ..EventPatch::default() };
  assert!(s.update_event(created.id, patch).await.is_err());

  let fetched = s.get_event(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.title, created.title);
}

// ─── Through the core workflows ──────────────────────────────────────────────

#[tokio::test]
async fn publication_round_trip() {
  let s = store().await;
  let created = s.insert_event(wellbeing()).await.unwrap();

  let published = transition(&s, ViewerRole::Admin, created.id, Transition::Publish)
    .await
    .unwrap();
  assert!(published.is_published);

  let toggled = transition(&s, ViewerRole::Admin, created.id, Transition::Toggle)
    .await
    .unwrap();
  assert!(!toggled.is_published);

  assert!(load_event(&s, created.id, ViewerRole::Member).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_publish_succeeds_once() {
  let s = store().await;
  let created = s.insert_event(wellbeing()).await.unwrap();

  let (first, second) = tokio::join!(
    transition(&s, ViewerRole::Admin, created.id, Transition::Publish),
    transition(&s, ViewerRole::Admin, created.id, Transition::Publish),
  );

  let results = [first, second];
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
  assert!(results.iter().any(|r| matches!(
    r,
    Err(portal_core::Error::InvalidTransition {
      from: PublicationState::Published,
      to:   PublicationState::Published,
    })
  )));
  assert!(s.get_event(created.id).await.unwrap().unwrap().is_published);
}

#[tokio::test]
async fn concurrent_toggles_restore_draft() {
  let s = store().await;
  let created = s.insert_event(wellbeing()).await.unwrap();

  let (first, second) = tokio::join!(
    transition(&s, ViewerRole::Admin, created.id, Transition::Toggle),
    transition(&s, ViewerRole::Admin, created.id, Transition::Toggle),
  );

  let states = [first.unwrap().is_published, second.unwrap().is_published];
  assert!(states.contains(&true) && states.contains(&false));
  assert!(!s.get_event(created.id).await.unwrap().unwrap().is_published);
}

#[tokio::test]
async fn member_calendar_from_sqlite() {
  let s = store().await;
  let now = Utc.with_ymd_and_hms(2026, 3, 12, 12, 0, 0).unwrap();

  let a = s.insert_event(wellbeing()).await.unwrap();
  s.update_event(a.id, EventPatch::publication(true)).await.unwrap();
  let c = s.insert_event(NewEvent::new("To be announced")).await.unwrap();
  s.update_event(c.id, EventPatch::publication(true)).await.unwrap();
  s.insert_event(NewEvent::new("Draft")).await.unwrap();

  let view = load_calendar(&s, &FixedClock(now), &CalendarQuery::new(ViewerRole::Member), &Utc)
    .await
    .unwrap();

  let keys: Vec<_> = view.buckets.iter().map(|b| b.key).collect();
  assert_eq!(
    keys,
    vec![
      DayKey::Day(chrono::NaiveDate::from_ymd_opt(2026, 3, 13).unwrap()),
      DayKey::Unscheduled,
    ]
  );
  assert_eq!(view.event_count(), 2);
}

// ─── Platform admins ─────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_directory() {
  let s = store().await;
  s.grant_admin("alice@example.com").await.unwrap();
  s.grant_admin("alice@example.com").await.unwrap();

  assert!(s.is_platform_admin("alice@example.com").await.unwrap());
  assert!(!s.is_platform_admin("bob@example.com").await.unwrap());
  assert_eq!(s.list_admins().await.unwrap(), vec!["alice@example.com".to_owned()]);

  assert!(s.revoke_admin("alice@example.com").await.unwrap());
  assert!(!s.revoke_admin("alice@example.com").await.unwrap());
  assert!(!s.is_platform_admin("alice@example.com").await.unwrap());
}

#[tokio::test]
async fn roles_resolve_against_store() {
  let s = store().await;
  s.grant_admin("alice@example.com").await.unwrap();

  let cases = [
    (None, ViewerRole::Public),
    (Some("bob@example.com"), ViewerRole::Member),
    (Some("alice@example.com"), ViewerRole::Admin),
  ];
  for (user, expected) in cases {
    assert_eq!(DirectoryRoleResolver::new(&s, user).resolve().await, expected);
  }
}
