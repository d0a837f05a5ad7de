//! Collaborator interfaces the engine consumes but does not implement.
//!
//! Answers come from whatever owns the vault (metadata cache, file system,
//! tests). Oracle errors never propagate out of a scan: the scanner treats
//! them as `false` and excludes the rule for that document.

use std::collections::HashMap;

use relative_path::RelativePath;

use crate::rules::LinkScope;

/// Front-matter-derived alternate surface forms for a target note.
pub trait AliasResolver {
    fn resolve_aliases(&self, target: &str) -> Vec<String>;
}

/// Vault knowledge needed by the per-rule guards.
pub trait VaultOracle {
    /// Whether the target note carries `tag`. Unknown target means `false`.
    fn target_has_tag(&self, target: &str, tag: &str) -> anyhow::Result<bool>;

    /// Whether `source` already links to `target` somewhere.
    fn source_links_to_target(&self, source: &RelativePath, target: &str)
    -> anyhow::Result<bool>;

    /// Whether `source` and `target` satisfy a rule's folder scope.
    fn resolve_scope_folder(
        &self,
        source: &RelativePath,
        target: &str,
        scope: LinkScope,
        folder: Option<&str>,
    ) -> anyhow::Result<bool>;
}

/// A vault that knows nothing: no aliases, and every guard passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVault;

impl AliasResolver for NullVault {
    fn resolve_aliases(&self, _target: &str) -> Vec<String> {
        Vec::new()
    }
}

impl VaultOracle for NullVault {
    fn target_has_tag(&self, _target: &str, _tag: &str) -> anyhow::Result<bool> {
        Ok(true)
    }

    fn source_links_to_target(
        &self,
        _source: &RelativePath,
        _target: &str,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }

    fn resolve_scope_folder(
        &self,
        _source: &RelativePath,
        _target: &str,
        _scope: LinkScope,
        _folder: Option<&str>,
    ) -> anyhow::Result<bool> {
        Ok(true)
    }
}

impl AliasResolver for HashMap<String, Vec<String>> {
    fn resolve_aliases(&self, target: &str) -> Vec<String> {
        self.get(target).cloned().unwrap_or_default()
    }
}
