//! The stored publications collection, edited in place.
//!
//! Records read from storage keep their stored JSON text until an edit
//! replaces them, so writing the collection back leaves every record that was
//! not touched exactly as it was found.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::publication::{Publication, PublicationId};

/// The identifying fields of a stored record. Everything else stays opaque.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
  id:             PublicationId,
  team_member_id: String,
}

enum Record {
  Stored {
    id:    PublicationId,
    owner: String,
    raw:   Box<RawValue>,
  },
  Fresh(Publication),
}

impl Record {
  fn read(raw: Box<RawValue>) -> serde_json::Result<Self> {
    let Header { id, team_member_id } = serde_json::from_str(raw.get())?;
    Ok(Self::Stored { id, owner: team_member_id, raw })
  }

  fn id(&self) -> &PublicationId {
    match self {
      Self::Stored { id, .. } => id,
      Self::Fresh(p) => &p.id,
    }
  }

  fn owner(&self) -> &str {
    match self {
      Self::Stored { owner, .. } => owner,
      Self::Fresh(p) => &p.team_member_id,
    }
  }

  fn to_publication(&self) -> serde_json::Result<Publication> {
    match self {
      Self::Stored { raw, .. } => serde_json::from_str(raw.get()),
      Self::Fresh(p) => Ok(p.clone()),
    }
  }
}

impl Serialize for Record {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Stored { raw, .. } => raw.serialize(serializer),
      Self::Fresh(p) => p.serialize(serializer),
    }
  }
}

/// An ordered publications collection.
#[derive(Default)]
pub struct PublicationSet {
  records: Vec<Record>,
}

impl PublicationSet {
  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Drop every record owned by `subject_id` and append `fresh` in order.
  /// Records of other subjects keep their position and their stored form.
  pub fn replace_subject(
    &mut self,
    subject_id: &str,
    fresh: impl IntoIterator<Item = Publication>,
  ) {
    self.records.retain(|r| r.owner() != subject_id);
    self.records.extend(fresh.into_iter().map(Record::Fresh));
  }

  /// Apply a curation edit to the record with `id` (see
  /// [`Publication::apply_update`]). Returns `None` if there is no such
  /// record.
  pub fn update(
    &mut self,
    id: &PublicationId,
    update: Publication,
    now: DateTime<Utc>,
  ) -> serde_json::Result<Option<Publication>> {
    let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
      return Ok(None);
    };
    let mut publication = record.to_publication()?;
    publication.apply_update(update, now);
    *record = Record::Fresh(publication.clone());
    Ok(Some(publication))
  }

  /// Remove the record with `id`. Returns `false` if there is no such record.
  pub fn remove(&mut self, id: &PublicationId) -> bool {
    let before = self.records.len();
    self.records.retain(|r| r.id() != id);
    self.records.len() != before
  }

  /// Decode every record.
  pub fn to_publications(&self) -> serde_json::Result<Vec<Publication>> {
    self.records.iter().map(Record::to_publication).collect()
  }
}

impl From<Vec<Publication>> for PublicationSet {
  fn from(publications: Vec<Publication>) -> Self {
    Self { records: publications.into_iter().map(Record::Fresh).collect() }
  }
}

impl Serialize for PublicationSet {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(&self.records)
  }
}

impl<'de> Deserialize<'de> for PublicationSet {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = Vec::<Box<RawValue>>::deserialize(deserializer)?;
    let records = raw
      .into_iter()
      .map(Record::read)
      .collect::<serde_json::Result<_>>()
      .map_err(serde::de::Error::custom)?;
    Ok(Self { records })
  }
}
