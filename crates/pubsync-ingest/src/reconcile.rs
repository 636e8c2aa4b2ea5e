//! Full-replace reconciliation of a run's results into the stored collection.

use pubsync_core::{collection::PublicationSet, scrape::ScrapeResult};

/// Merge `results` into `publications`.
///
/// Each successful subject loses every stored publication it owned and gains
/// its freshly scraped ones, appended in listing order. Failed subjects and
/// subjects absent from `results` keep their stored publications untouched
/// and in place.
pub fn reconcile(publications: &mut PublicationSet, results: &[ScrapeResult]) {
  for result in results {
    replace_subject(publications, result);
  }
}

/// Apply one result in place. Returns whether anything changed.
pub fn replace_subject(publications: &mut PublicationSet, result: &ScrapeResult) -> bool {
  if !result.success {
    return false;
  }
  publications.replace_subject(&result.team_member_id, result.publications.iter().cloned());
  true
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use pubsync_core::publication::{Publication, PublicationId};
  use serde_json::Map;

  use super::*;

  fn publication(member: &str, ordinal: usize, title: &str) -> Publication {
    let at = Utc.timestamp_millis_opt(1_000 * ordinal as i64).unwrap();
    Publication {
      id:                 PublicationId::generate(member, at, ordinal),
      title:              title.into(),
      authors:            Vec::new(),
      year:               None,
      journal:            None,
      citation_count:     None,
      url:                None,
      team_member_id:     member.into(),
      source_scholar_url: String::new(),
      is_visible:         true,
      created_at:         at,
      updated_at:         at,
      extra:              Map::new(),
    }
  }

  fn result(member: &str, success: bool, publications: Vec<Publication>) -> ScrapeResult {
    let mut r = ScrapeResult::pending(member, "u");
    r.success = success;
    r.publications = publications;
    r
  }

  fn merge(existing: Vec<Publication>, results: &[ScrapeResult]) -> Vec<Publication> {
    let mut set = PublicationSet::from(existing);
    reconcile(&mut set, results);
    set.to_publications().unwrap()
  }

  fn titles(publications: &[Publication]) -> Vec<&str> {
    publications.iter().map(|p| p.title.as_str()).collect()
  }

  #[test]
  fn success_replaces_only_that_subject() {
    let existing = vec![
      publication("a", 0, "a-old-1"),
      publication("b", 1, "b-old"),
      publication("a", 2, "a-old-2"),
    ];
    let fresh = vec![publication("a", 10, "a-new-1"), publication("a", 11, "a-new-2")];

    let merged = merge(existing, &[result("a", true, fresh)]);
    assert_eq!(titles(&merged), vec!["b-old", "a-new-1", "a-new-2"]);
  }

  #[test]
  fn failure_leaves_subject_untouched() {
    let existing = vec![publication("a", 0, "a-old"), publication("b", 1, "b-old")];
    let merged = merge(existing.clone(), &[result("a", false, Vec::new())]);
    assert_eq!(merged, existing);
  }

  #[test]
  fn mixed_results() {
    let existing = vec![
      publication("a", 0, "a-old"),
      publication("b", 1, "b-old"),
      publication("c", 2, "c-old"),
    ];
    let merged = merge(existing, &[
      result("a", false, Vec::new()),
      result("b", true, vec![publication("b", 5, "b-new")]),
    ]);
    assert_eq!(titles(&merged), vec!["a-old", "c-old", "b-new"]);
  }

  #[test]
  fn new_subject_is_appended() {
    let merged = merge(Vec::new(), &[result("z", true, vec![publication(
      "z", 0, "z-1",
    )])]);
    assert_eq!(titles(&merged), vec!["z-1"]);
  }

  #[test]
  fn curated_visibility_is_lost_on_replace() {
    let mut hidden = publication("a", 0, "Same Paper");
    hidden.is_visible = false;
    let fresh = publication("a", 9, "Same Paper");

    let merged = merge(vec![hidden], &[result("a", true, vec![fresh])]);
    assert_eq!(merged.len(), 1);
    assert!(merged[0].is_visible);
  }
}
