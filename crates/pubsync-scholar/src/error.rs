//! Error types for the profile extractor.

use thiserror::Error;

/// A single listing entry that could not be turned into a publication.
///
/// Entry errors never abort the rest of the page; the extractor records them
/// and moves on to the next row.
#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to parse publication {index}: invalid link {href:?}: {source}")]
  InvalidLink {
    index:  usize,
    href:   String,
    #[source]
    source: url::ParseError,
  },
}

impl Error {
  /// Position of the offending row in the source listing.
  pub fn index(&self) -> usize {
    match self {
      Self::InvalidLink { index, .. } => *index,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
