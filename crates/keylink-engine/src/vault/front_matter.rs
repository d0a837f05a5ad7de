use serde_yaml::{Mapping, Value};

use crate::classify::kinds::FrontMatter;
use crate::classify::{front_matter_body, front_matter_bounds};

const ALIAS_KEYS: [&str; 2] = ["aliases", "alias"];
const TAG_KEYS: [&str; 2] = ["tags", "tag"];

/// Aliases and tags declared in a note's YAML front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMeta {
    pub aliases: Vec<String>,
    /// Without a leading `#`.
    pub tags: Vec<String>,
}

impl NoteMeta {
    /// Reads both list and scalar forms. Missing or unparseable front
    /// matter yields empty metadata.
    pub fn parse(text: &str) -> Self {
        let Some(mapping) = parse_mapping(text) else {
            return Self::default();
        };
        Self {
            aliases: collect(&mapping, &ALIAS_KEYS, false),
            tags: collect(&mapping, &TAG_KEYS, true)
                .into_iter()
                .map(|t| normalize_tag(&t).to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(wanted))
    }
}

/// `text` with `tags` merged into its front matter `tags` list, creating the
/// block when absent. `None` when every tag is already present, or when
/// the existing front matter is not a YAML mapping and would be lost by a
/// rewrite.
pub fn with_tags(text: &str, tags: &[String]) -> Result<Option<String>, serde_yaml::Error> {
    let meta = NoteMeta::parse(text);
    let missing: Vec<&str> = tags
        .iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty() && !meta.has_tag(t))
        .collect();
    if missing.is_empty() {
        return Ok(None);
    }

    let (mut mapping, body) = match front_matter_bounds(text) {
        Some(bounds) => {
            let Some(mapping) = parse_mapping(text) else {
                log::warn!("Front matter is not a YAML mapping, not writing tags {missing:?}");
                return Ok(None);
            };
            (mapping, &text[bounds.end..])
        }
        None => (Mapping::new(), text),
    };

    let mut listed = mapping
        .get(TAG_KEYS[0])
        .map(|v| strings(v, true))
        .unwrap_or_default();
    let mut seen = Vec::new();
    for tag in missing {
        if !seen.contains(&tag) {
            listed.push(tag.to_string());
            seen.push(tag);
        }
    }
    mapping.insert(
        Value::from(TAG_KEYS[0]),
        Value::Sequence(listed.into_iter().map(Value::from).collect()),
    );

    let yaml = serde_yaml::to_string(&mapping)?;
    let fence = FrontMatter::DELIMITER;
    Ok(Some(format!("{fence}\n{yaml}{fence}\n{body}")))
}

fn parse_mapping(text: &str) -> Option<Mapping> {
    let yaml = front_matter_body(text)?;
    if yaml.trim().is_empty() {
        return Some(Mapping::new());
    }
    match serde_yaml::from_str(yaml) {
        Ok(mapping) => Some(mapping),
        Err(e) => {
            log::debug!("Ignoring unparseable front matter: {e}");
            None
        }
    }
}

fn collect(mapping: &Mapping, keys: &[&str], split_commas: bool) -> Vec<String> {
    keys.iter()
        .filter_map(|key| mapping.get(*key))
        .flat_map(|value| strings(value, split_commas))
        .collect()
}

fn strings(value: &Value, split_commas: bool) -> Vec<String> {
    match value {
        Value::String(s) if split_commas => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Sequence(items) => items.iter().flat_map(|v| strings(v, false)).collect(),
        Value::String(s) => vec![s.trim().to_string()],
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        _ => Vec::new(),
    }
}

fn normalize_tag(tag: &str) -> &str {
    tag.trim().trim_start_matches('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::lists("---\naliases: [AI, Machine Mind]\ntags: [ml, '#tech']\n---\nbody", vec!["AI", "Machine Mind"], vec!["ml", "tech"])]
    #[case::scalars("---\nalias: AI\ntag: ml, tech\n---\n", vec!["AI"], vec!["ml", "tech"])]
    #[case::numbers("---\ntags:\n  - 2024\n---\n", vec![], vec!["2024"])]
    #[case::none("no front matter", vec![], vec![])]
    #[case::broken("---\naliases: [unclosed\n---\n", vec![], vec![])]
    fn parses_metadata(
        #[case] text: &str,
        #[case] aliases: Vec<&str>,
        #[case] tags: Vec<&str>,
    ) {
        let meta = NoteMeta::parse(text);
        assert_eq!(meta.aliases, aliases);
        assert_eq!(meta.tags, tags);
    }

    #[test]
    fn tag_lookup_ignores_hash_and_case() {
        let meta = NoteMeta::parse("---\ntags: [Topic]\n---\n");
        assert!(meta.has_tag("#topic"));
        assert!(!meta.has_tag("other"));
    }

    #[test]
    fn adds_front_matter_when_missing() {
        let updated = with_tags("body\n", &["keyword1".to_string()]).unwrap();
        assert_eq!(updated.as_deref(), Some("---\ntags:\n- keyword1\n---\nbody\n"));
    }

    #[test]
    fn merges_into_existing_tags() {
        let text = "---\ntitle: Note\ntags: [old]\n---\nbody";
        let updated = with_tags(text, &["new".to_string(), "old".to_string()])
            .unwrap()
            .unwrap();

        assert!(updated.ends_with("---\nbody"));
        let meta = NoteMeta::parse(&updated);
        assert_eq!(meta.tags, vec!["old", "new"]);
        assert!(updated.contains("title: Note"));
    }

    #[rstest]
    #[case::broken_yaml("---\ntitle: Important\naliases: [unclosed\n---\nbody\n")]
    #[case::yaml_list("---\n- just\n- a list\n---\nbody\n")]
    #[case::scalar("---\njust a sentence\n---\nbody\n")]
    fn unreadable_front_matter_is_left_alone(#[case] text: &str) {
        assert_eq!(with_tags(text, &["keyword1".to_string()]).unwrap(), None);
    }

    #[test]
    fn present_tags_change_nothing() {
        let text = "---\ntags: [ml]\n---\n";
        assert_eq!(with_tags(text, &["#ML".to_string()]).unwrap(), None);
    }
}
