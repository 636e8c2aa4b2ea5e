//! Rendered profile page → publication records.
//!
//! Pipeline:
//!   rendered HTML
//!     └─ ProfilePage::parse()     → DOM snapshot
//!          └─ ProfilePage::entries() → one Result per listing row
//!               └─ clean::*            → authors, venue, numbers

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use pubsync_core::publication::{Publication, PublicationId};
use scraper::{ElementRef, Html, Selector};
use serde_json::Map;
use url::Url;

use crate::{
  clean,
  error::{Error, Result},
};

/// Base used for relative links when the profile URL itself is unparseable.
pub const DEFAULT_ORIGIN: &str = "https://scholar.google.com/";

/// Page-title fragments that mean the source refused to serve the profile.
const BLOCK_MARKERS: &[&str] = &["Sorry", "blocked"];

fn selector(css: &str) -> Selector {
  Selector::parse(css).expect("valid selector")
}

static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr.gsc_a_tr"));
static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| selector(".gsc_a_at"));
static DESCRIPTORS: LazyLock<Selector> =
  LazyLock::new(|| selector(".gsc_a_t .gs_gray"));
static YEAR: LazyLock<Selector> = LazyLock::new(|| selector(".gsc_a_y .gsc_a_h"));
static CITATIONS: LazyLock<Selector> =
  LazyLock::new(|| selector(".gsc_a_c .gsc_a_ac"));
static PAGE_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));

// ─── Context ─────────────────────────────────────────────────────────────────

/// Everything an extracted record needs that the markup does not carry.
#[derive(Debug, Clone)]
pub struct ExtractContext<'a> {
  pub subject_id:  &'a str,
  /// The profile URL that was fetched. Relative links resolve against its
  /// origin.
  pub profile_url: &'a str,
  /// Shared by every record of one scrape: identifiers and timestamps.
  pub scraped_at:  DateTime<Utc>,
}

/// Records and per-row failures from one page, both in listing order.
#[derive(Debug, Default)]
pub struct Extraction {
  pub publications: Vec<Publication>,
  pub errors:       Vec<Error>,
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// A parsed snapshot of one rendered profile page.
///
/// Not `Send`: parse, inspect and extract within a single synchronous scope.
pub struct ProfilePage {
  document: Html,
}

impl ProfilePage {
  pub fn parse(html: &str) -> Self {
    Self { document: Html::parse_document(html) }
  }

  /// The trimmed `<title>` text, if the page has one.
  pub fn title(&self) -> Option<String> {
    self
      .document
      .select(&PAGE_TITLE)
      .next()
      .map(|t| t.text().collect::<String>().trim().to_owned())
  }

  /// The page title when it carries a blocking marker.
  pub fn blocked_title(&self) -> Option<String> {
    self
      .title()
      .filter(|t| BLOCK_MARKERS.iter().any(|marker| t.contains(marker)))
  }

  /// Lazily extract every listing row.
  ///
  /// Rows without a title are skipped silently. The ordinal in each
  /// generated identifier is the row's position in the listing, counting
  /// skipped rows.
  pub fn entries<'a>(
    &'a self,
    ctx: &'a ExtractContext<'a>,
  ) -> impl Iterator<Item = Result<Publication>> + 'a {
    let base = Url::parse(ctx.profile_url)
      .and_then(|profile| profile.join("/"))
      .or_else(|_| Url::parse(DEFAULT_ORIGIN))
      .ok();
    self
      .document
      .select(&ROW)
      .enumerate()
      .filter_map(move |(index, row)| entry(row, index, ctx, base.as_ref()))
  }

  /// Drain [`entries`](Self::entries), splitting records from row errors.
  pub fn extract(&self, ctx: &ExtractContext<'_>) -> Extraction {
    let mut out = Extraction::default();
    for item in self.entries(ctx) {
      match item {
        Ok(publication) => out.publications.push(publication),
        Err(e) => out.errors.push(e),
      }
    }
    out
  }
}

/// Parse `html` and extract every listing row in one go.
pub fn extract(html: &str, ctx: &ExtractContext<'_>) -> Extraction {
  ProfilePage::parse(html).extract(ctx)
}

// ─── Rows ────────────────────────────────────────────────────────────────────

fn text_of(el: ElementRef<'_>) -> String {
  el.text().collect::<String>().trim().to_owned()
}

fn first_text(row: ElementRef<'_>, sel: &Selector) -> Option<String> {
  row.select(sel).next().map(text_of)
}

fn entry(
  row: ElementRef<'_>,
  index: usize,
  ctx: &ExtractContext<'_>,
  base: Option<&Url>,
) -> Option<Result<Publication>> {
  let link = row.select(&TITLE_LINK).next()?;
  let title = text_of(link);
  if title.is_empty() {
    return None;
  }

  let url = match link.value().attr("href").map(str::trim) {
    Some(href) if !href.is_empty() => match resolve(base, href) {
      Ok(url) => Some(url),
      Err(source) => {
        return Some(Err(Error::InvalidLink {
          index,
          href: href.to_owned(),
          source,
        }));
      }
    },
    _ => None,
  };

  let descriptors: Vec<String> = row.select(&DESCRIPTORS).map(text_of).collect();
  let (raw_authors, raw_venue) = clean::split_descriptors(&descriptors);

  Some(Ok(Publication {
    id: PublicationId::generate(ctx.subject_id, ctx.scraped_at, index),
    title,
    authors: clean::parse_authors(&raw_authors),
    year: first_text(row, &YEAR).and_then(|y| clean::parse_leading_int(&y)),
    journal: raw_venue.as_deref().and_then(clean::clean_venue),
    citation_count: first_text(row, &CITATIONS)
      .and_then(|c| clean::parse_leading_int(&c)),
    url,
    team_member_id: ctx.subject_id.to_owned(),
    source_scholar_url: ctx.profile_url.to_owned(),
    is_visible: true,
    created_at: ctx.scraped_at,
    updated_at: ctx.scraped_at,
    extra: Map::new(),
  }))
}

fn resolve(base: Option<&Url>, href: &str) -> Result<String, url::ParseError> {
  let url = match base {
    Some(base) => base.join(href)?,
    None => Url::parse(href)?,
  };
  Ok(url.into())
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  const PROFILE: &str = "https://scholar.google.com/citations?user=ada&hl=en";

  fn ctx() -> ExtractContext<'static> {
    ExtractContext {
      subject_id:  "m1",
      profile_url: PROFILE,
      scraped_at:  Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
    }
  }

  fn row(title: &str, href: &str, descriptors: &[&str], cites: &str, year: &str) -> String {
    let grays: String = descriptors
      .iter()
      .map(|d| format!(r#"<div class="gs_gray">{d}</div>"#))
      .collect();
    format!(
      r#"<tr class="gsc_a_tr">
        <td class="gsc_a_t"><a class="gsc_a_at" href="{href}">{title}</a>{grays}</td>
        <td class="gsc_a_c"><a class="gsc_a_ac gs_ibl">{cites}</a></td>
        <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">{year}</span></td>
      </tr>"#
    )
  }

  fn page(title: &str, rows: &[String]) -> String {
    format!(
      r#"<html><head><title>{title}</title></head><body>
      <table id="gsc_a_t"><tbody id="gsc_a_b">{}</tbody></table>
      </body></html>"#,
      rows.concat()
    )
  }

  #[test]
  fn three_row_profile_yields_two_publications() {
    let html = page("Ada - Google Scholar", &[
      row("Title A", "/citations?view_op=view_citation&amp;citation_for_view=a1", &[
        "X, Y",
        "Journal of A 4 (2), 10-20, 2020",
      ], "5", "2020"),
      row("", "/citations?view_op=view_citation&amp;citation_for_view=a2", &["Q"], "", ""),
      row("Title C", "/citations?view_op=view_citation&amp;citation_for_view=a3", &[
        "Z",
        "Nature, 2019",
      ], "", "2019"),
    ]);

    let out = extract(&html, &ctx());
    assert!(out.errors.is_empty());
    assert_eq!(out.publications.len(), 2);

    let a = &out.publications[0];
    assert_eq!(a.id.as_str(), "m1-1700000000000-0");
    assert_eq!(a.title, "Title A");
    assert_eq!(a.authors, vec!["X", "Y"]);
    assert_eq!(a.year, Some(2020));
    assert_eq!(a.citation_count, Some(5));
    assert_eq!(a.journal.as_deref(), Some("Journal of A 4 (2)"));
    assert_eq!(
      a.url.as_deref(),
      Some(
        "https://scholar.google.com/citations?view_op=view_citation&citation_for_view=a1"
      )
    );
    assert_eq!(a.team_member_id, "m1");
    assert_eq!(a.source_scholar_url, PROFILE);
    assert!(a.is_visible);
    assert_eq!(a.created_at, ctx().scraped_at);

    let c = &out.publications[1];
    assert_eq!(c.id.as_str(), "m1-1700000000000-2");
    assert_eq!(c.journal.as_deref(), Some("Nature"));
    assert_eq!(c.year, Some(2019));
    assert_eq!(c.citation_count, None);
  }

  #[test]
  fn year_comes_from_year_cell_not_venue() {
    let html = page("p", &[row("T", "/x", &["A", "Nature, 2019"], "", "")]);
    let out = extract(&html, &ctx());
    assert_eq!(out.publications[0].year, None);
    assert_eq!(out.publications[0].journal.as_deref(), Some("Nature"));
  }

  #[test]
  fn malformed_numbers_become_none() {
    let html = page("p", &[row("T", "/x", &[], "n/a", "unknown")]);
    let p = &extract(&html, &ctx()).publications[0];
    assert!(p.authors.is_empty());
    assert_eq!(p.year, None);
    assert_eq!(p.citation_count, None);
    assert_eq!(p.journal, None);
  }

  #[test]
  fn starred_citation_count_parses() {
    let html = page("p", &[row("T", "/x", &["A"], "12*", "2001")]);
    assert_eq!(extract(&html, &ctx()).publications[0].citation_count, Some(12));
  }

  #[test]
  fn duplicate_titles_are_kept() {
    let r = row("Same", "/x", &["A"], "1", "2000");
    let out = extract(&page("p", &[r.clone(), r]), &ctx());
    assert_eq!(out.publications.len(), 2);
    assert_ne!(out.publications[0].id, out.publications[1].id);
  }

  #[test]
  fn invalid_link_is_recorded_and_rest_continue() {
    let html = page("p", &[
      row("Bad", "http://[oops", &["A"], "", ""),
      row("Good", "/ok", &["B"], "", ""),
    ]);
    let out = extract(&html, &ctx());
    assert_eq!(out.publications.len(), 1);
    assert_eq!(out.publications[0].title, "Good");
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].index(), 0);
    assert!(
      out.errors[0].to_string().starts_with("failed to parse publication 0"),
      "{}",
      out.errors[0]
    );
  }

  #[test]
  fn links_resolve_against_profile_origin() {
    let html = page("p", &[
      row("Rel", "/citations?x=1", &[], "", ""),
      row("Abs", "https://doi.org/10.1/abc", &[], "", ""),
      row("None", "", &[], "", ""),
    ]);
    let ctx = ExtractContext { profile_url: "https://scholar.example.org/citations?user=z", ..ctx() };
    let out = extract(&html, &ctx);
    let urls: Vec<_> = out.publications.iter().map(|p| p.url.as_deref()).collect();
    assert_eq!(urls, vec![
      Some("https://scholar.example.org/citations?x=1"),
      Some("https://doi.org/10.1/abc"),
      None,
    ]);
  }

  #[test]
  fn path_relative_links_ignore_the_profile_path() {
    let html = page("p", &[row("Rel", "view?x=2", &[], "", "")]);
    let ctx = ExtractContext {
      profile_url: "https://scholar.example.org/deep/profile/citations?user=z",
      ..ctx()
    };
    let out = extract(&html, &ctx);
    assert_eq!(
      out.publications[0].url.as_deref(),
      Some("https://scholar.example.org/view?x=2")
    );
  }

  #[test]
  fn unparseable_profile_url_falls_back_to_default_origin() {
    let html = page("p", &[row("Rel", "/citations?x=1", &[], "", "")]);
    let ctx = ExtractContext { profile_url: "not a url", ..ctx() };
    let out = extract(&html, &ctx);
    assert_eq!(
      out.publications[0].url.as_deref(),
      Some("https://scholar.google.com/citations?x=1")
    );
  }

  #[test]
  fn blocked_title_detected() {
    let blocked = ProfilePage::parse(&page("Sorry, blocked", &[]));
    assert_eq!(blocked.blocked_title().as_deref(), Some("Sorry, blocked"));

    let fine = ProfilePage::parse(&page("Ada - Google Scholar", &[]));
    assert_eq!(fine.title().as_deref(), Some("Ada - Google Scholar"));
    assert!(fine.blocked_title().is_none());
  }

  #[test]
  fn empty_page_yields_nothing() {
    let out = extract("<html><body></body></html>", &ctx());
    assert!(out.publications.is_empty());
    assert!(out.errors.is_empty());
  }
}
