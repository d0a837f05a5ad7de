//! File-system backed collaborator for scans.
//!
//! [`FsVault`] indexes every markdown note under a notes directory and
//! answers alias, tag, link and scope questions from the notes themselves.
//! Front matter is read once when the vault is opened; links are read from
//! the source note on demand.

pub mod front_matter;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::RegexBuilder;
use relative_path::{RelativePath, RelativePathBuf};

use crate::classify::kinds::MarkdownLink;
use crate::document::note_basename;
use crate::io::{self, IoError};
use crate::oracle::{AliasResolver, VaultOracle};
use crate::rules::LinkScope;
use crate::session::TagSink;

pub use front_matter::{NoteMeta, with_tags};

#[derive(Debug, Clone)]
struct Note {
    path: RelativePathBuf,
    meta: NoteMeta,
}

/// A notes directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    notes: Vec<Note>,
}

impl FsVault {
    /// Indexes every markdown note under `root`.
    pub fn open(root: &Path) -> Result<Self, IoError> {
        let notes = io::scan_markdown_files(root)?;
        Self::with_notes(root, notes)
    }

    /// Indexes only `notes`, e.g. after exclusion filtering.
    pub fn with_notes(root: &Path, notes: Vec<RelativePathBuf>) -> Result<Self, IoError> {
        io::validate_notes_dir(root)?;
        let notes = notes
            .into_iter()
            .map(|path| {
                let meta = match io::read_file(&path, root) {
                    Ok(text) => NoteMeta::parse(&text),
                    Err(e) => {
                        log::warn!("Cannot read {path}: {e}");
                        NoteMeta::default()
                    }
                };
                Note { path, meta }
            })
            .collect::<Vec<_>>();
        log::debug!("Indexed {} notes under {}", notes.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            notes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn notes(&self) -> impl Iterator<Item = &RelativePath> {
        self.notes.iter().map(|n| n.path.as_relative_path())
    }

    /// Finds the note a link target refers to: a full vault path when the
    /// target has folders, otherwise the first note with that file name.
    pub fn locate(&self, target: &str) -> Option<&RelativePath> {
        self.find(target).map(|n| n.path.as_relative_path())
    }

    fn find(&self, target: &str) -> Option<&Note> {
        let target = target.trim().trim_start_matches('/');
        if target.contains('/') {
            let wanted = with_extension(target).to_lowercase();
            return self
                .notes
                .iter()
                .find(|n| n.path.as_str().to_lowercase() == wanted);
        }
        let wanted = note_basename(target).to_lowercase();
        self.notes
            .iter()
            .find(|n| note_basename(n.path.as_str()).to_lowercase() == wanted)
    }

    fn update_tags(&self, path: &RelativePath, tags: &[String]) -> anyhow::Result<()> {
        let text = io::read_file(path, &self.root)?;
        match with_tags(&text, tags).with_context(|| format!("Updating front matter of {path}"))? {
            Some(updated) => {
                io::write_file(path, &self.root, &updated)?;
                log::info!("Tagged {path} with {}", tags.join(", "));
            }
            None => log::debug!("{path} front matter left unchanged"),
        }
        Ok(())
    }
}

fn with_extension(target: &str) -> String {
    if target.ends_with(MarkdownLink::EXTENSION) {
        target.to_string()
    } else {
        format!("{target}{}", MarkdownLink::EXTENSION)
    }
}

/// Whether `text` contains a wikilink or markdown link to `target`.
pub fn links_to(text: &str, target: &str) -> bool {
    let name = note_basename(target);
    let plain = regex::escape(name);
    let encoded = regex::escape(&urlencoding::encode(name));
    let pattern = format!(
        r"\[\[(?:[^\]|#\n]*/)?{plain}(?:\.md)?(?:[#|][^\]\n]*)?\]\]|\]\((?:[^)\n]*/)?(?:{plain}|{encoded})\.md(?:#[^)\n]*)?\)"
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .is_ok_and(|re| re.is_match(text))
}

impl AliasResolver for FsVault {
    fn resolve_aliases(&self, target: &str) -> Vec<String> {
        self.find(target)
            .map(|n| n.meta.aliases.clone())
            .unwrap_or_default()
    }
}

impl VaultOracle for FsVault {
    fn target_has_tag(&self, target: &str, tag: &str) -> anyhow::Result<bool> {
        Ok(self.find(target).is_some_and(|n| n.meta.has_tag(tag)))
    }

    fn source_links_to_target(
        &self,
        source: &RelativePath,
        target: &str,
    ) -> anyhow::Result<bool> {
        let text = io::read_file(source, &self.root)
            .with_context(|| format!("Reading links of {source}"))?;
        Ok(links_to(&text, target))
    }

    fn resolve_scope_folder(
        &self,
        source: &RelativePath,
        target: &str,
        scope: LinkScope,
        folder: Option<&str>,
    ) -> anyhow::Result<bool> {
        let target_path = self.locate(target);
        let in_folder = |path: &RelativePath| -> anyhow::Result<bool> {
            let folder = folder
                .map(|f| f.trim().trim_matches('/'))
                .filter(|f| !f.is_empty())
                .with_context(|| format!("{scope:?} scope for '{target}' has no folder"))?;
            Ok(path.starts_with(folder))
        };

        match scope {
            LinkScope::VaultWide => Ok(true),
            LinkScope::SameFolder => Ok(target_path.is_some_and(|t| t.parent() == source.parent())),
            LinkScope::SourceFolder => in_folder(source),
            LinkScope::TargetFolder => match target_path {
                Some(t) => in_folder(t),
                None => Ok(false),
            },
        }
    }
}

impl TagSink for FsVault {
    fn apply_tag_requests(
        &self,
        source: &RelativePath,
        source_tags: &[String],
        target_tags: &BTreeMap<String, String>,
    ) -> anyhow::Result<()> {
        if !source_tags.is_empty() {
            self.update_tags(source, source_tags)?;
        }
        for (target, tag) in target_tags {
            match self.locate(target) {
                Some(path) => self.update_tags(path, std::slice::from_ref(tag))?,
                None => log::debug!("No note for target '{target}', tag '{tag}' not written"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_notes_dir};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn vault() -> (TempDir, FsVault) {
        let dir = create_test_notes_dir();
        create_test_file(
            &dir,
            "topics/Machine Learning.md",
            "---\naliases: [ML]\ntags: [topic]\n---\n# ML\n",
        );
        create_test_file(&dir, "topics/Source.md", "see [[Machine Learning|ml]]\n");
        create_test_file(&dir, "daily/Today.md", "nothing linked\n");
        let vault = FsVault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn resolves_aliases_from_front_matter() {
        let (_dir, vault) = vault();
        assert_eq!(vault.resolve_aliases("Machine Learning"), vec!["ML"]);
        assert!(vault.resolve_aliases("Unknown").is_empty());
    }

    #[test]
    fn locates_by_name_or_path() {
        let (_dir, vault) = vault();
        let expected = Some(RelativePath::new("topics/Machine Learning.md"));
        assert_eq!(vault.locate("machine learning"), expected);
        assert_eq!(vault.locate("topics/Machine Learning"), expected);
        assert_eq!(vault.locate("other/Machine Learning"), None);
    }

    #[test]
    fn answers_tag_questions() {
        let (_dir, vault) = vault();
        assert!(vault.target_has_tag("Machine Learning", "#topic").unwrap());
        assert!(!vault.target_has_tag("Machine Learning", "other").unwrap());
        assert!(!vault.target_has_tag("Missing", "topic").unwrap());
    }

    #[test]
    fn answers_link_questions() {
        let (_dir, vault) = vault();
        let linked = vault
            .source_links_to_target(RelativePath::new("topics/Source.md"), "Machine Learning")
            .unwrap();
        let unlinked = vault
            .source_links_to_target(RelativePath::new("daily/Today.md"), "Machine Learning")
            .unwrap();
        assert!(linked);
        assert!(!unlinked);
        assert!(
            vault
                .source_links_to_target(RelativePath::new("gone.md"), "Machine Learning")
                .is_err()
        );
    }

    #[rstest]
    #[case("[[Target]]", true)]
    #[case("[[folder/target#Heading|x]]", true)]
    #[case("[x](Target.md)", true)]
    #[case("[x](../My%20Target.md#^b)", false)]
    #[case("[[Targets]]", false)]
    #[case("Target", false)]
    fn detects_links(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(links_to(text, "Target"), expected);
    }

    #[test]
    fn detects_encoded_markdown_links() {
        assert!(links_to("[x](../My%20Target.md#^b)", "My Target"));
    }

    #[rstest]
    #[case::vault_wide("daily/Today.md", LinkScope::VaultWide, None, true)]
    #[case::same_folder("topics/Source.md", LinkScope::SameFolder, None, true)]
    #[case::other_folder("daily/Today.md", LinkScope::SameFolder, None, false)]
    #[case::source_in("daily/Today.md", LinkScope::SourceFolder, Some("daily"), true)]
    #[case::source_out("topics/Source.md", LinkScope::SourceFolder, Some("/daily/"), false)]
    #[case::target_in("daily/Today.md", LinkScope::TargetFolder, Some("topics"), true)]
    fn resolves_scopes(
        #[case] source: &str,
        #[case] scope: LinkScope,
        #[case] folder: Option<&str>,
        #[case] expected: bool,
    ) {
        let (_dir, vault) = vault();
        let answer = vault
            .resolve_scope_folder(RelativePath::new(source), "Machine Learning", scope, folder)
            .unwrap();
        assert_eq!(answer, expected);
    }

    #[test]
    fn folder_scope_without_folder_is_an_error() {
        let (_dir, vault) = vault();
        let answer = vault.resolve_scope_folder(
            RelativePath::new("daily/Today.md"),
            "Machine Learning",
            LinkScope::SourceFolder,
            None,
        );
        assert!(answer.is_err());
    }

    #[test]
    fn writes_requested_tags() {
        let (dir, vault) = vault();
        vault
            .apply_tag_requests(
                RelativePath::new("daily/Today.md"),
                &["machine-learning".to_string()],
                &BTreeMap::from([(
                    "Machine Learning".to_string(),
                    "machine-learning".to_string(),
                )]),
            )
            .unwrap();

        let source = std::fs::read_to_string(dir.path().join("daily/Today.md")).unwrap();
        assert_eq!(source, "---\ntags:\n- machine-learning\n---\nnothing linked\n");

        let target =
            std::fs::read_to_string(dir.path().join("topics/Machine Learning.md")).unwrap();
        assert_eq!(
            NoteMeta::parse(&target).tags,
            vec!["topic", "machine-learning"]
        );
        assert!(target.ends_with("---\n# ML\n"));
    }

    #[test]
    fn unreadable_front_matter_survives_tag_requests() {
        let dir = create_test_notes_dir();
        let original = "---\ntitle: Important\naliases: [unclosed\n---\nbody\n";
        create_test_file(&dir, "Broken.md", original);
        let vault = FsVault::open(dir.path()).unwrap();

        vault
            .apply_tag_requests(
                RelativePath::new("Broken.md"),
                &["keyword1".to_string()],
                &BTreeMap::new(),
            )
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("Broken.md")).unwrap();
        assert_eq!(text, original);
    }
}
