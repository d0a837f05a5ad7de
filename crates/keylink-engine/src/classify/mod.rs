//! # Span Classifier
//!
//! Pure, text-only predicates over `(text, offset[, len])` that decide
//! whether a candidate keyword occurrence sits somewhere it must not be
//! touched. No rule knowledge and no shared state.
//!
//! ## Modules
//!
//! - **`kinds`**: delimiter constants for each markup construct
//! - **`lines`**: line spans and byte-search helpers
//! - **`front_matter`**: leading `---` YAML block
//! - **`block_ref`**: `^block-id` anchors
//! - **`links`**: wikilinks, aliases, inline code, markdown links, suggestion markers
//! - **`url`** / **`tld`**: protocol URLs, `www.` hosts and bare domains
//! - **`table`**: table rows (matches there are allowed but rendered differently)
//!
//! ## Scan Limits
//!
//! Every predicate looks at a bounded window and, apart from front matter
//! and the table look-around, never crosses a newline. Offsets at or past the
//! end of the text are never "inside" anything.

pub mod block_ref;
pub mod front_matter;
pub mod kinds;
pub mod lines;
pub mod links;
pub mod table;
pub mod tld;
pub mod url;

pub use block_ref::is_inside_block_reference;
pub use front_matter::{front_matter_body, front_matter_bounds};
pub use links::{
    CodeTicks, is_inside_alias, is_inside_link_or_code, is_inside_link_or_code_with,
    is_inside_suggestion,
};
pub use table::is_inside_table;
pub use url::is_part_of_url;

use crate::span::Span;

/// Why a candidate occurrence was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    FrontMatter,
    Hashtag,
    BlockReference,
    LinkOrCode,
    Alias,
    Suggestion,
    Url,
}

/// Whole-document facts the exclusion checks need, computed once per scan
/// instead of once per candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextIndex {
    pub front_matter: Option<Span>,
    pub code_ticks: CodeTicks,
}

impl TextIndex {
    pub fn new(text: &str) -> Self {
        Self {
            front_matter: front_matter_bounds(text),
            code_ticks: CodeTicks::new(text),
        }
    }
}

/// Runs every exclusion check in order and reports the first that applies.
///
/// `index` must have been built from `text`.
pub fn exclusion_at(
    text: &str,
    start: usize,
    len: usize,
    index: &TextIndex,
) -> Option<Exclusion> {
    let candidate = Span::new(start, start + len);
    if index.front_matter.is_some_and(|fm| fm.overlaps(candidate)) {
        return Some(Exclusion::FrontMatter);
    }
    if start > 0 && text.as_bytes()[start - 1] == b'#' {
        return Some(Exclusion::Hashtag);
    }
    if is_inside_block_reference(text, start) {
        return Some(Exclusion::BlockReference);
    }
    if is_inside_link_or_code_with(text, start, &index.code_ticks) {
        return Some(Exclusion::LinkOrCode);
    }
    if is_inside_alias(text, start) {
        return Some(Exclusion::Alias);
    }
    if is_inside_suggestion(text, start) {
        return Some(Exclusion::Suggestion);
    }
    if is_part_of_url(text, start, len) {
        return Some(Exclusion::Url);
    }
    None
}
