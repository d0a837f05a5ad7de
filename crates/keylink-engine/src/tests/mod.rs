use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

use relative_path::RelativePath;
use tempfile::TempDir;

use crate::oracle::{NullVault, VaultOracle};
use crate::rules::{KeywordRule, LinkScope, RuleTable, resolve_rules};

/// Create a temporary notes directory with test files
pub fn create_test_notes_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test markdown file with content, making parent folders as needed
pub fn create_test_file(notes_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = notes_dir.path().join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Resolve ungrouped keywords with no aliases
pub fn rule_table(rules: Vec<KeywordRule>) -> RuleTable {
    resolve_rules(&rules, &[], &NullVault)
}

/// Oracle that gives the same answer to every question and counts them
pub struct FixedOracle {
    answer: Option<bool>,
    calls: Cell<usize>,
}

impl FixedOracle {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer: Some(answer),
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn respond(&self) -> anyhow::Result<bool> {
        self.calls.set(self.calls.get() + 1);
        self.answer
            .ok_or_else(|| anyhow::anyhow!("metadata cache unavailable"))
    }
}

impl VaultOracle for FixedOracle {
    fn target_has_tag(&self, _target: &str, _tag: &str) -> anyhow::Result<bool> {
        self.respond()
    }

    fn source_links_to_target(
        &self,
        _source: &RelativePath,
        _target: &str,
    ) -> anyhow::Result<bool> {
        self.respond()
    }

    fn resolve_scope_folder(
        &self,
        _source: &RelativePath,
        _target: &str,
        _scope: LinkScope,
        _folder: Option<&str>,
    ) -> anyhow::Result<bool> {
        self.respond()
    }
}
