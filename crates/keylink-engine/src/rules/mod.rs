//! # Keyword Rule Resolver
//!
//! Flattens raw keyword definitions, group defaults and collaborator-supplied
//! aliases into a single [`RuleTable`] mapping each surface form to exactly
//! one [`ResolvedRule`].

pub mod resolver;
pub mod types;

use std::cmp::Reverse;
use std::collections::HashMap;

pub use resolver::{delete_group, resolve_rules};
pub use types::{Flag, KeywordGroup, KeywordRule, LinkScope, ResolvedRule, RuleSettings};

/// One registered surface form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEntry {
    /// The literal text to match, as configured.
    pub form: String,
    /// Index into [`RuleTable::rules`].
    pub rule: usize,
    /// Global registration order, used as the final tie-break.
    pub registration: usize,
}

/// Lookup table from surface form to resolved rule.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<ResolvedRule>,
    entries: Vec<SurfaceEntry>,
    index: HashMap<String, usize>,
}

impl RuleTable {
    pub fn rules(&self) -> &[ResolvedRule] {
        &self.rules
    }

    pub fn rule(&self, index: usize) -> &ResolvedRule {
        &self.rules[index]
    }

    pub fn entries(&self) -> &[SurfaceEntry] {
        &self.entries
    }

    /// Case-insensitive lookup of the rule that owns `form`.
    pub fn lookup(&self, form: &str) -> Option<&ResolvedRule> {
        self.index
            .get(&fold(form))
            .map(|&entry| &self.rules[self.entries[entry].rule])
    }

    /// Number of registered surface forms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in matching order: longest form first, then declaration order.
    pub fn scan_order(&self) -> Vec<&SurfaceEntry> {
        let mut ordered: Vec<&SurfaceEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|e| {
            (
                Reverse(e.form.chars().count()),
                self.rules[e.rule].keyword_index,
                e.registration,
            )
        });
        ordered
    }

    pub(crate) fn push_rule(&mut self, rule: ResolvedRule) -> usize {
        self.rules.push(rule);
        self.rules.len() - 1
    }

    /// Registers `form` for `rule` unless it is blank or already taken.
    pub(crate) fn register(&mut self, form: &str, rule: usize) -> bool {
        let form = form.trim();
        if form.is_empty() {
            return false;
        }
        let key = fold(form);
        if self.index.contains_key(&key) {
            return false;
        }
        let registration = self.entries.len();
        self.index.insert(key, registration);
        self.entries.push(SurfaceEntry {
            form: form.to_string(),
            rule,
            registration,
        });
        self.rules[rule].surface_forms.push(form.to_string());
        true
    }
}

fn fold(form: &str) -> String {
    form.trim().to_lowercase()
}
