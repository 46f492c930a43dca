//! Date and audience normalization.
//!
//! Both normalizers are total: malformed input degrades to an absent date or
//! to the raw audience text, and nothing here returns an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::event::Audience;

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Zone-less layouts, tried in order. The first two are what an HTML
/// `datetime-local` input submits.
const NAIVE_LAYOUTS: &[&str] = &[
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%d %H:%M:%S%.f",
];

/// Offset-carrying layouts besides RFC 3339, e.g. Postgres' `+00` suffix.
const OFFSET_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Parse a date-like string into a point in time.
///
/// Strings with an offset are taken as-is. Zone-less strings (including a
/// bare `YYYY-MM-DD`, read as local midnight) are interpreted as wall-clock
/// time in `tz`. Returns `None` for blank or unparsable input and for local
/// times that do not exist in `tz`.
pub fn parse_date_str<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<DateTime<Utc>> {
  let input = input.trim();
  if input.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
    return Some(dt.with_timezone(&Utc));
  }
  for layout in OFFSET_LAYOUTS {
    if let Ok(dt) = DateTime::parse_from_str(input, layout) {
      return Some(dt.with_timezone(&Utc));
    }
  }

  let naive = NAIVE_LAYOUTS
    .iter()
    .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
    .or_else(|| {
      NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    })?;

  tz.from_local_datetime(&naive)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
}

/// Normalize a loosely-typed date value.
///
/// - strings go through [`parse_date_str`];
/// - numbers are milliseconds since the Unix epoch. Zero is treated as
///   absent, since it is what a missing value coerced to a number looks like;
/// - `null`, booleans, arrays and objects are absent.
pub fn normalize_date<Tz: TimeZone>(value: &Value, tz: &Tz) -> Option<DateTime<Utc>> {
  match value {
    Value::String(s) => parse_date_str(s, tz),
    Value::Number(n) => {
      let millis = match n.as_i64() {
        Some(ms) => ms,
        None => {
          let f = n.as_f64().filter(|f| f.is_finite())?;
          if f.abs() >= i64::MAX as f64 {
            return None;
          }
          f.trunc() as i64
        }
      };
      if millis == 0 {
        return None;
      }
      DateTime::from_timestamp_millis(millis)
    }
    _ => None,
  }
}

// ─── Audience ────────────────────────────────────────────────────────────────

/// The canonical segment labels shown for free-text audiences.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr,
)]
pub enum AudienceCategory {
  #[strum(serialize = "Primary tier")]
  PrimaryTier,
  #[strum(serialize = "Secondary tier")]
  SecondaryTier,
  #[strum(serialize = "Seniors")]
  Seniors,
  #[strum(serialize = "Community")]
  Community,
}

const SENIOR_TOKENS: &[&str] = &["senior", "senioř"];
const COMMUNITY_TOKENS: &[&str] = &["komunit", "communit"];

impl AudienceCategory {
  /// Classify free text. Rules are checked in declaration order, so
  /// `"1. a 2. stupeň"` is [`Self::PrimaryTier`].
  pub fn classify(raw: &str) -> Option<Self> {
    let lower = raw.to_lowercase();
    if lower.contains('1') {
      Some(Self::PrimaryTier)
    } else if lower.contains('2') {
      Some(Self::SecondaryTier)
    } else if SENIOR_TOKENS.iter().any(|t| lower.contains(t)) {
      Some(Self::Seniors)
    } else if COMMUNITY_TOKENS.iter().any(|t| lower.contains(t)) {
      Some(Self::Community)
    } else {
      None
    }
  }
}

/// The display/search label for an event's audience.
///
/// Free text maps to its [`AudienceCategory`] label, or to itself (trimmed)
/// if no rule matches. A tag list is joined with `", "` as-is. Absent or
/// blank input gives an empty string.
pub fn audience_label(audience: Option<&Audience>) -> String {
  match audience {
    None => String::new(),
    Some(Audience::Text(text)) => match AudienceCategory::classify(text) {
      Some(category) => category.to_string(),
      None => text.trim().to_owned(),
    },
    Some(Audience::Tags(tags)) => tags
      .iter()
      .map(|t| t.trim())
      .filter(|t| !t.is_empty())
      .collect::<Vec<_>>()
      .join(", "),
  }
}
