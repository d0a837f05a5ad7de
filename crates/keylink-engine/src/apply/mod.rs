//! # Replacement Applier
//!
//! Turns a set of accepted, non-overlapping substitutions into new text with
//! a single reverse-order pass, and records the offset deltas needed to map
//! positions in the old text (cursor, selection) to the new text.

use std::ops::Range;

use serde::Serialize;

/// Anything that replaces `len` bytes at `start` with new text.
pub trait Substitution {
    fn start(&self) -> usize;
    fn len(&self) -> usize;
    fn replacement(&self) -> &str;

    fn end(&self) -> usize {
        self.start() + self.len()
    }

    /// Signed change in length caused by this substitution.
    fn length_delta(&self) -> isize {
        self.replacement().len() as isize - self.len() as isize
    }
}

/// A plain substitution with no rule attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub len: usize,
    pub replacement: String,
}

impl Substitution for Edit {
    fn start(&self) -> usize {
        self.start
    }

    fn len(&self) -> usize {
        self.len
    }

    fn replacement(&self) -> &str {
        &self.replacement
    }
}

/// Length change introduced at `start` (an offset in the old text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OffsetDelta {
    pub start: usize,
    pub delta: isize,
}

/// Result of applying substitutions.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub text: String,
    /// Ascending by `start`.
    pub deltas: Vec<OffsetDelta>,
    /// Replaced ranges in old-text coordinates, ascending.
    pub replaced: Vec<Range<usize>>,
}

/// What changed and where the selection ends up after a rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Inserted text ranges in new-text coordinates.
    pub changed: Vec<Range<usize>>,
    pub new_selection: Range<usize>,
}

impl Applied {
    /// Maps an old offset into the new text.
    pub fn remap(&self, offset: usize) -> usize {
        remap_offset(offset, &self.deltas)
    }

    /// Builds a [`Patch`] for an editor holding `selection` in the old text.
    pub fn patch(&self, selection: Range<usize>) -> Patch {
        let changed = self
            .replaced
            .iter()
            .zip(&self.deltas)
            .map(|(range, d)| {
                let start = self.remap(range.start);
                let new_len = (range.len() as isize + d.delta).max(0) as usize;
                start..start + new_len
            })
            .collect();
        Patch {
            changed,
            new_selection: remap_range(selection, &self.deltas),
        }
    }
}

/// Applies `spans` to `text`.
///
/// Spans are sorted ascending, then substituted from the highest offset
/// down so lower offsets stay valid throughout. Spans must not overlap.
pub fn apply_spans<S: Substitution>(text: &str, spans: &[S]) -> Applied {
    let mut ordered: Vec<&S> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start());
    debug_assert!(
        ordered.windows(2).all(|w| w[0].end() <= w[1].start()),
        "substitutions overlap"
    );

    let mut out = text.to_string();
    for span in ordered.iter().rev() {
        out.replace_range(span.start()..span.end(), span.replacement());
    }

    Applied {
        text: out,
        deltas: ordered
            .iter()
            .map(|s| OffsetDelta {
                start: s.start(),
                delta: s.length_delta(),
            })
            .collect(),
        replaced: ordered.iter().map(|s| s.start()..s.end()).collect(),
    }
}

/// `offset + Σ delta` for every delta that starts strictly before `offset`.
///
/// Non-decreasing in `offset` as long as no delta is negative, which holds
/// for every replacement the scanner produces.
pub fn remap_offset(offset: usize, deltas: &[OffsetDelta]) -> usize {
    let shift: isize = deltas
        .iter()
        .take_while(|d| d.start < offset)
        .map(|d| d.delta)
        .sum();
    (offset as isize + shift).max(0) as usize
}

pub fn remap_range(range: Range<usize>, deltas: &[OffsetDelta]) -> Range<usize> {
    remap_offset(range.start, deltas)..remap_offset(range.end, deltas)
}
