//! # Occurrence Scanner
//!
//! Finds whole-word keyword occurrences in one document, longest surface
//! form first, filters each candidate through the classifier and produces
//! the accepted spans together with their replacement text.
//!
//! A scan never touches the caller's buffer. It reads a [`Document`]
//! snapshot and returns a [`ScanResult`] the caller may commit.

pub mod render;
pub mod tags;

use std::collections::{BTreeMap, HashMap};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::apply::{OffsetDelta, Substitution, apply_spans, remap_offset};
use crate::classify::kinds::Suggestion;
use crate::classify::{TextIndex, exclusion_at, is_inside_table};
use crate::document::{Document, note_basename};
use crate::error::EngineError;
use crate::oracle::VaultOracle;
use crate::rules::{LinkScope, ResolvedRule, RuleTable, SurfaceEntry};
use crate::span::Span;

pub use tags::sanitize_tag;

/// Engine-wide switches that are not per rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub case_sensitive: bool,
    /// Link only the first occurrence of each surface form per document.
    pub first_occurrence_only: bool,
    /// Never link a note to itself, whatever the rule says.
    pub prevent_self_link_global: bool,
}

/// Where a scan is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning { rule: usize },
    Done,
}

impl ScanState {
    /// `Idle -> Scanning -> Done`, with `Scanning` repeated once per surface
    /// form. An empty table goes straight from `Idle` to `Done`.
    pub fn can_advance_to(self, next: ScanState) -> bool {
        matches!(
            (self, next),
            (ScanState::Idle, ScanState::Scanning { .. })
                | (ScanState::Scanning { .. }, ScanState::Scanning { .. })
                | (ScanState::Idle | ScanState::Scanning { .. }, ScanState::Done)
        )
    }
}

/// One accepted occurrence and what it becomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    /// Byte offset into the scanned text.
    pub start: usize,
    pub len: usize,
    /// The text as it appears in the document.
    pub surface_text: String,
    /// Index into [`RuleTable::rules`].
    pub rule: usize,
    pub replacement: String,
}

impl MatchSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end())
    }

    pub fn length_delta(&self) -> isize {
        Substitution::length_delta(self)
    }
}

impl Substitution for MatchSpan {
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

/// Everything one scan of one document produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanResult {
    /// New text, or `None` when nothing was accepted.
    pub changed_text: Option<String>,
    /// Ascending by `start`, never overlapping.
    pub accepted_spans: Vec<MatchSpan>,
    pub link_count: usize,
    /// Tags to add to the scanned note.
    pub source_tags: Vec<String>,
    /// Tags to add to target notes, keyed by target.
    pub pending_tag_requests: BTreeMap<String, String>,
    pub deltas: Vec<OffsetDelta>,
}

impl ScanResult {
    pub fn is_unchanged(&self) -> bool {
        self.changed_text.is_none()
    }

    /// Maps an offset in the scanned text to the changed text.
    pub fn remap_offset(&self, offset: usize) -> usize {
        remap_offset(offset, &self.deltas)
    }

    /// The changed text, provided `live` still equals the snapshot that
    /// was scanned. Stale results yield `None` and should be discarded.
    pub fn commit_against(&self, live: &str, snapshot: &str) -> Option<&str> {
        if live != snapshot {
            log::debug!("Discarding scan result: document changed while scanning");
            return None;
        }
        self.changed_text.as_deref()
    }
}

/// Scans `document` against every rule in `table`.
///
/// Fails only when the document itself cannot be scanned; rule-level
/// problems (failing oracles, unusable patterns) skip the rule.
pub fn scan(
    document: &Document,
    table: &RuleTable,
    options: &ScanOptions,
    oracle: &dyn VaultOracle,
) -> Result<ScanResult, EngineError> {
    document.validate()?;

    let mut scanner = Scanner::new(document, table, options, oracle);
    for entry in table.scan_order() {
        scanner.scan_form(entry);
    }
    Ok(scanner.finish())
}

struct Scanner<'a> {
    document: &'a Document,
    table: &'a RuleTable,
    options: &'a ScanOptions,
    oracle: &'a dyn VaultOracle,
    index: TextIndex,
    guards: HashMap<usize, bool>,
    accepted: Vec<MatchSpan>,
    state: ScanState,
}

impl<'a> Scanner<'a> {
    fn new(
        document: &'a Document,
        table: &'a RuleTable,
        options: &'a ScanOptions,
        oracle: &'a dyn VaultOracle,
    ) -> Self {
        Self {
            document,
            table,
            options,
            oracle,
            index: TextIndex::new(&document.text),
            guards: HashMap::new(),
            accepted: Vec::new(),
            state: ScanState::Idle,
        }
    }

    fn advance(&mut self, next: ScanState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "scan cannot move from {:?} to {next:?}",
            self.state
        );
        self.state = next;
    }

    fn scan_form(&mut self, entry: &SurfaceEntry) {
        self.advance(ScanState::Scanning { rule: entry.rule });
        if !self.rule_allowed(entry.rule) {
            return;
        }

        let (document, table) = (self.document, self.table);
        let text = document.text.as_str();
        let first_only = self.options.first_occurrence_only;
        if first_only && already_linked(text, &entry.form, self.options.case_sensitive) {
            log::debug!(
                "'{}' is already linked in {}, skipping",
                entry.form,
                document.id
            );
            return;
        }

        let pattern = match literal_pattern(&entry.form, self.options.case_sensitive) {
            Ok(pattern) => pattern,
            Err(e) => {
                log::warn!("Cannot build pattern for '{}': {e}", entry.form);
                return;
            }
        };

        let rule = table.rule(entry.rule);
        for found in pattern.find_iter(text) {
            let (start, end) = (found.start(), found.end());
            if let Some(reason) = exclusion_at(text, start, end - start, &self.index) {
                log::trace!("'{}' at {start} excluded: {reason:?}", found.as_str());
                continue;
            }
            let candidate = Span::new(start, end);
            if self.accepted.iter().any(|m| m.span().overlaps(candidate)) {
                continue;
            }

            let in_table = is_inside_table(text, start);
            self.accepted.push(MatchSpan {
                start,
                len: end - start,
                surface_text: found.as_str().to_string(),
                rule: entry.rule,
                replacement: render::replacement(rule, found.as_str(), in_table),
            });
            if first_only {
                break;
            }
        }
    }

    fn rule_allowed(&mut self, index: usize) -> bool {
        if let Some(&allowed) = self.guards.get(&index) {
            return allowed;
        }
        let allowed = self.evaluate_guards(self.table.rule(index));
        self.guards.insert(index, allowed);
        allowed
    }

    fn evaluate_guards(&self, rule: &ResolvedRule) -> bool {
        let doc = self.document;
        if (rule.prevent_self_link || self.options.prevent_self_link_global)
            && is_self_target(doc, &rule.target)
        {
            log::debug!("'{}' targets {} itself, skipping", rule.keyword, doc.id);
            return false;
        }
        if rule.only_in_notes_linking_to
            && !self.ask(
                rule,
                "links-to-target",
                self.oracle.source_links_to_target(doc.id(), &rule.target),
            )
        {
            return false;
        }
        if let Some(tag) = rule.require_tag.as_deref() {
            if !self.ask(rule, "require-tag", self.oracle.target_has_tag(&rule.target, tag)) {
                return false;
            }
        }
        if rule.link_scope != LinkScope::VaultWide {
            let in_scope = self.oracle.resolve_scope_folder(
                doc.id(),
                &rule.target,
                rule.link_scope,
                rule.scope_folder.as_deref(),
            );
            if !self.ask(rule, "scope", in_scope) {
                return false;
            }
        }
        true
    }

    fn ask(&self, rule: &ResolvedRule, guard: &str, answer: anyhow::Result<bool>) -> bool {
        match answer {
            Ok(true) => true,
            Ok(false) => {
                log::debug!(
                    "'{}' fails {guard} guard in {}",
                    rule.keyword,
                    self.document.id
                );
                false
            }
            Err(e) => {
                log::warn!(
                    "{guard} guard for '{}' in {} failed, skipping rule: {e:#}",
                    rule.keyword,
                    self.document.id
                );
                false
            }
        }
    }

    fn finish(mut self) -> ScanResult {
        let last = self.state;
        self.advance(ScanState::Done);
        self.accepted.sort_by_key(|m| m.start);

        let mut result = ScanResult {
            link_count: self.accepted.len(),
            ..ScanResult::default()
        };
        self.collect_tags(&mut result);

        if !self.accepted.is_empty() {
            let applied = apply_spans(&self.document.text, &self.accepted);
            result.changed_text = Some(applied.text);
            result.deltas = applied.deltas;
        }
        log::debug!(
            "Scanned {}: {} spans accepted (last state {last:?})",
            self.document.id,
            self.accepted.len(),
        );
        result.accepted_spans = self.accepted;
        result
    }

    fn collect_tags(&self, result: &mut ScanResult) {
        let mut linked: Vec<usize> = self.accepted.iter().map(|m| m.rule).collect();
        linked.sort_unstable();
        linked.dedup();

        for index in linked {
            let rule = self.table.rule(index);
            if !rule.enable_tags {
                continue;
            }
            let tag = sanitize_tag(&rule.keyword);
            if tag.is_empty() {
                continue;
            }
            if !result.source_tags.contains(&tag) {
                result.source_tags.push(tag.clone());
            }
            if !is_self_target(self.document, &rule.target) {
                result
                    .pending_tag_requests
                    .insert(rule.target.clone(), tag);
            }
        }
    }
}

fn is_self_target(document: &Document, target: &str) -> bool {
    note_basename(target).to_lowercase() == document.basename().to_lowercase()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `form` as a literal with `\b` on each edge that is a word character, so
/// `C++` still matches before a space. The boundary is part of the pattern
/// rather than a check after matching, which would consume text an
/// overlapping valid match needs.
fn literal_pattern(form: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    let mut pattern = regex::escape(form);
    if form.chars().next().is_some_and(is_word_char) {
        pattern.insert_str(0, r"\b");
    }
    if form.chars().next_back().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
}

/// Whether the document already links or suggests `form` anywhere.
fn already_linked(text: &str, form: &str, case_sensitive: bool) -> bool {
    let f = regex::escape(form);
    let label = regex::escape(&html_escape::encode_text(form));
    let class = regex::escape(Suggestion::CLASS);
    let pattern = format!(
        r#"\[\[{f}(?:[#|][^\]\n]*)?\]\]|\[\[[^\]\n|]*\|{f}\]\]|\[{f}\]\([^)\n]*\)|<span class="{class}"[^>]*>{label}</span>"#
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .is_ok_and(|re| re.is_match(text))
}
