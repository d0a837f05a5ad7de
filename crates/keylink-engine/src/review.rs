//! Pending user decisions and suggestion-marker resolution.
//!
//! A preview shows the spans a scan would apply; the user marks each one
//! and [`apply_decisions`] commits only the accepted ones. Suggestion
//! markers already written into a note are resolved the same way, turning
//! each into a real link or back into its plain label.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::apply::{Applied, Edit, apply_spans};
use crate::classify::is_inside_table;
use crate::classify::kinds::Suggestion;
use crate::scan::{MatchSpan, ScanResult, render};
use crate::span::Span;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Decision {
    Accept,
    Reject,
    #[default]
    Undecided,
}

/// A span awaiting the user's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDecision {
    pub span: MatchSpan,
    pub decision: Decision,
}

/// One undecided entry per accepted span of `result`.
pub fn pending_decisions(result: &ScanResult) -> Vec<PendingDecision> {
    result
        .accepted_spans
        .iter()
        .cloned()
        .map(|span| PendingDecision {
            span,
            decision: Decision::Undecided,
        })
        .collect()
}

/// Applies the accepted spans to `text`; rejected and undecided spans are
/// left as they were.
pub fn apply_decisions(text: &str, decisions: &[PendingDecision]) -> Applied {
    let accepted: Vec<MatchSpan> = decisions
        .iter()
        .filter(|d| d.decision == Decision::Accept)
        .map(|d| d.span.clone())
        .collect();
    apply_spans(text, &accepted)
}

/// A suggestion marker found in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionMarker {
    /// The whole marker, opening tag to closing tag.
    pub span: Span,
    pub target: String,
    pub block: Option<String>,
    pub relative: bool,
    /// Decoded visible label.
    pub label: String,
}

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"{}((?:\s+[\w-]+="[^"]*")*)\s*>([^<\n]*){}"#,
        regex::escape(Suggestion::OPEN),
        regex::escape(Suggestion::CLOSE)
    ))
    .expect("suggestion marker regex is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)="([^"]*)""#).expect("attribute regex is valid")
});

/// All well-formed suggestion markers in `text`, in document order.
///
/// Markers without a target are ignored.
pub fn find_suggestions(text: &str) -> Vec<SuggestionMarker> {
    MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let mut target = None;
            let mut block = None;
            let mut relative = false;
            for attr in ATTRIBUTE.captures_iter(caps.get(1).map_or("", |m| m.as_str())) {
                let value = html_escape::decode_html_entities(&attr[2]).into_owned();
                match &attr[1] {
                    name if name == Suggestion::ATTR_TARGET => target = Some(value),
                    name if name == Suggestion::ATTR_BLOCK => block = Some(value),
                    name if name == Suggestion::ATTR_RELATIVE => relative = value == "true",
                    _ => {}
                }
            }
            let target = target.filter(|t| !t.trim().is_empty())?;
            Some(SuggestionMarker {
                span: Span::new(whole.start(), whole.end()),
                target,
                block,
                relative,
                label: html_escape::decode_html_entities(&caps[2]).into_owned(),
            })
        })
        .collect()
}

/// Turns matching suggestion markers into links.
pub fn accept_suggestions<F>(text: &str, filter: F) -> Applied
where
    F: Fn(&SuggestionMarker) -> bool,
{
    resolve_suggestions(text, filter, |marker| {
        render::link(
            &marker.target,
            marker.block.as_deref(),
            marker.relative,
            &marker.label,
            is_inside_table(text, marker.span.start),
        )
    })
}

/// Strips matching suggestion markers back to their label.
pub fn reject_suggestions<F>(text: &str, filter: F) -> Applied
where
    F: Fn(&SuggestionMarker) -> bool,
{
    resolve_suggestions(text, filter, |marker| marker.label.clone())
}

fn resolve_suggestions<F, R>(text: &str, filter: F, render: R) -> Applied
where
    F: Fn(&SuggestionMarker) -> bool,
    R: Fn(&SuggestionMarker) -> String,
{
    let edits: Vec<Edit> = find_suggestions(text)
        .into_iter()
        .filter(|marker| filter(marker))
        .map(|marker| Edit {
            start: marker.span.start,
            len: marker.span.len(),
            replacement: render(&marker),
        })
        .collect();
    apply_spans(text, &edits)
}
