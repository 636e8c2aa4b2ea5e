//! Field cleanup heuristics for scraped listing text.
//!
//! Profile listings mix authors, venue, volume/page numbers and the year into
//! one or two loosely formatted strings. These helpers pull them apart.

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;

/// A piece that is nothing but a four-digit year.
static BARE_YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("valid regex"));

/// A year that leaked onto the end of the venue, optionally comma-separated.
/// The word boundary keeps identifiers such as `arXiv:2101.00001` intact.
static TRAILING_YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r",?\s*\b[0-9]{4}$").expect("valid regex"));

/// Venue text followed by a `, <number>...` tail (volume, pages, etc.).
static NUMBER_TAIL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(.*?)\s*,\s*[0-9]+.*$").expect("valid regex"));

/// Delimiter between authors and venue when both share one descriptor.
const DESCRIPTOR_DELIMITER: &str = " - ";

/// Split the descriptor lines of one listing row into raw author and venue
/// text.
///
/// Two or more descriptors: the first is authors, the second venue. A single
/// descriptor is split on `" - "` when possible, otherwise it is all authors.
pub(crate) fn split_descriptors(descriptors: &[String]) -> (String, Option<String>) {
  match descriptors {
    [] => (String::new(), None),
    [only] => {
      let mut parts = only.split(DESCRIPTOR_DELIMITER);
      match (parts.next(), parts.next()) {
        (Some(authors), Some(venue)) => (authors.to_owned(), Some(venue.to_owned())),
        _ => (only.clone(), None),
      }
    }
    [authors, venue, ..] => (authors.clone(), Some(venue.clone())),
  }
}

/// Split a comma-separated author list, dropping blanks, bare years and
/// anything that looks like a link.
pub(crate) fn parse_authors(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|a| !a.is_empty() && !BARE_YEAR.is_match(a) && !a.contains("http"))
    .map(str::to_owned)
    .collect()
}

/// Parse the leading decimal digits of `raw`, ignoring surrounding
/// whitespace and any trailing marker (e.g. `"12*"` → 12).
pub(crate) fn parse_leading_int<T: FromStr>(raw: &str) -> Option<T> {
  let trimmed = raw.trim();
  let end = trimmed
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(trimmed.len());
  if end == 0 {
    return None;
  }
  trimmed[..end].parse().ok()
}

/// Normalise a raw venue string; `None` when nothing meaningful remains.
pub(crate) fn clean_venue(raw: &str) -> Option<String> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  let without_year = TRAILING_YEAR.replace(raw, "");
  let without_year = without_year.trim();
  let venue = NUMBER_TAIL.replace(without_year, "$1");
  let venue = venue.trim();
  (!venue.is_empty()).then(|| venue.to_owned())
}
