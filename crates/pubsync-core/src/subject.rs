//! Subject: a lab member whose external academic profile is tracked.
//!
//! Subjects are created and edited by the admin surface; the ingestion
//! pipeline only ever reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked person, as stored in the team-members collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id:            String,
  pub name:          String,
  #[serde(default)]
  pub role:          String,
  #[serde(default)]
  pub biography:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile_image: Option<String>,
  /// External profile page listing this subject's publications.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scholar_url:   Option<String>,
  #[serde(
    default,
    with = "crate::timestamp::option",
    skip_serializing_if = "Option::is_none"
  )]
  pub created_at:    Option<DateTime<Utc>>,
  #[serde(
    default,
    with = "crate::timestamp::option",
    skip_serializing_if = "Option::is_none"
  )]
  pub updated_at:    Option<DateTime<Utc>>,
}

impl Subject {
  /// The trimmed profile URL, or `None` when absent or blank.
  pub fn source_url(&self) -> Option<&str> {
    self
      .scholar_url
      .as_deref()
      .map(str::trim)
      .filter(|u| !u.is_empty())
  }
}
