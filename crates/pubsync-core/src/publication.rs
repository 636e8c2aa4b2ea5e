//! Publication: one scraped paper owned by a subject.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Identifier of a stored publication.
///
/// Generated identifiers are `{subjectId}-{epochMillis}-{ordinal}`. They
/// depend on when the scrape happened, not on the paper, so re-scraping the
/// same profile always yields fresh identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationId(String);

impl PublicationId {
  pub fn generate(subject_id: &str, at: DateTime<Utc>, ordinal: usize) -> Self {
    Self(format!("{subject_id}-{}-{ordinal}", at.timestamp_millis()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<String> for PublicationId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for PublicationId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl fmt::Display for PublicationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Publication ─────────────────────────────────────────────────────────────

fn visible_by_default() -> bool { true }

/// A publication record as persisted in the publications collection.
///
/// Field order matches the on-disk JSON layout. Fields this crate does not
/// know about are carried through `extra` so a rewrite never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
  pub id:                 PublicationId,
  pub title:              String,
  /// Display names in source-listing order. May be empty.
  pub authors:            Vec<String>,
  pub year:               Option<i32>,
  /// Venue or journal name.
  pub journal:            Option<String>,
  pub citation_count:     Option<u32>,
  pub url:                Option<String>,
  /// Owning subject.
  pub team_member_id:     String,
  /// The exact profile URL that was scraped.
  pub source_scholar_url: String,
  /// Curator-controlled; ingestion always writes `true`.
  #[serde(default = "visible_by_default")]
  pub is_visible:         bool,
  #[serde(with = "crate::timestamp")]
  pub created_at:         DateTime<Utc>,
  #[serde(with = "crate::timestamp")]
  pub updated_at:         DateTime<Utc>,
  #[serde(flatten)]
  pub extra:              Map<String, Value>,
}

impl Publication {
  /// Overwrite every curated field from `update`, keeping this record's
  /// identifier and creation time and stamping `updated_at` with `now`.
  pub fn apply_update(&mut self, update: Publication, now: DateTime<Utc>) {
    let id = self.id.clone();
    let created_at = self.created_at;
    *self = Publication { id, created_at, updated_at: now, ..update };
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn sample() -> Publication {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    Publication {
      id:                 PublicationId::generate("m1", at, 4),
      title:              "On Things".into(),
      authors:            vec!["A Author".into(), "B Author".into()],
      year:               Some(2021),
      journal:            Some("Nature".into()),
      citation_count:     Some(7),
      url:                None,
      team_member_id:     "m1".into(),
      source_scholar_url: "https://scholar.google.com/citations?user=x".into(),
      is_visible:         true,
      created_at:         at,
      updated_at:         at,
      extra:              Map::new(),
    }
  }

  #[test]
  fn generated_id_shape() {
    let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let id = PublicationId::generate("member-7", at, 2);
    assert_eq!(id.as_str(), "member-7-1700000000123-2");
  }

  #[test]
  fn json_layout_is_camel_case_in_order() {
    let json = serde_json::to_string(&sample()).unwrap();
    let expected_order = [
      "\"id\"",
      "\"title\"",
      "\"authors\"",
      "\"year\"",
      "\"journal\"",
      "\"citationCount\"",
      "\"url\"",
      "\"teamMemberId\"",
      "\"sourceScholarUrl\"",
      "\"isVisible\"",
      "\"createdAt\"",
      "\"updatedAt\"",
    ];
    let positions: Vec<usize> = expected_order
      .iter()
      .map(|k| json.find(k).unwrap_or_else(|| panic!("{k} missing: {json}")))
      .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    assert!(json.contains("\"createdAt\":\"2024-03-01T12:00:00.000Z\""));
  }

  #[test]
  fn missing_visibility_defaults_to_visible() {
    let raw = r#"{
      "id": "m1-1-0", "title": "T", "authors": [], "year": null,
      "journal": null, "citationCount": null, "url": null,
      "teamMemberId": "m1", "sourceScholarUrl": "u",
      "createdAt": "2024-01-01T00:00:00.000Z",
      "updatedAt": "2024-01-01T00:00:00.000Z"
    }"#;
    let publication: Publication = serde_json::from_str(raw).unwrap();
    assert!(publication.is_visible);
  }

  #[test]
  fn unknown_fields_survive_a_rewrite() {
    let base = serde_json::to_string(&sample()).unwrap();
    let raw = format!("{},\"featured\":true}}", base.trim_end_matches('}'));

    let publication: Publication = serde_json::from_str(&raw).unwrap();
    assert_eq!(publication.extra.get("featured"), Some(&Value::Bool(true)));
    assert_eq!(serde_json::to_string(&publication).unwrap(), raw);
  }

  #[test]
  fn apply_update_keeps_identity() {
    let mut stored = sample();
    let mut edit = sample();
    edit.id = "other".into();
    edit.is_visible = false;
    edit.title = "Renamed".into();
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    stored.apply_update(edit, now);

    assert_eq!(stored.id, sample().id);
    assert_eq!(stored.created_at, sample().created_at);
    assert_eq!(stored.updated_at, now);
    assert!(!stored.is_visible);
    assert_eq!(stored.title, "Renamed");
  }
}
