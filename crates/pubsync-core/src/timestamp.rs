//! Millisecond-precision RFC 3339 timestamps.
//!
//! The website's data files carry timestamps in the `2024-01-02T03:04:05.678Z`
//! shape. chrono's default serde output drops trailing zero fractions, which
//! would rewrite untouched records on every save, so all stored timestamps go
//! through these helpers instead.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// The current time at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

/// Render `at` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format(at: &DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  serializer.serialize_str(&format(at))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  DateTime::parse_from_rfc3339(&raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(serde::de::Error::custom)
}

/// Same as the parent module, for `Option<DateTime<Utc>>` fields.
pub mod option {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(
    at: &Option<DateTime<Utc>>,
    serializer: S,
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match at {
      Some(at) => serializer.serialize_str(&super::format(at)),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D>(
    deserializer: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw
      .map(|s| {
        DateTime::parse_from_rfc3339(&s)
          .map(|dt| dt.with_timezone(&Utc))
          .map_err(serde::de::Error::custom)
      })
      .transpose()
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn whole_seconds_keep_millis() {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(format(&at), "2024-01-02T03:04:05.000Z");
  }

  #[test]
  fn now_survives_a_round_trip() {
    let at = now();
    let parsed = DateTime::parse_from_rfc3339(&format(&at)).unwrap();
    assert_eq!(parsed.with_timezone(&Utc), at);
  }

  #[test]
  fn parses_offset_timestamps() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
      #[serde(with = "crate::timestamp")]
      at: DateTime<Utc>,
    }
    let w: Wrapper =
      serde_json::from_str(r#"{"at":"2024-01-02T05:04:05.250+02:00"}"#).unwrap();
    assert_eq!(format(&w.at), "2024-01-02T03:04:05.250Z");
  }
}
