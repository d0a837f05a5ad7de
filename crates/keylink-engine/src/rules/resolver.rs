use std::collections::HashMap;

use uuid::Uuid;

use crate::oracle::AliasResolver;

use super::RuleTable;
use super::types::{KeywordGroup, KeywordRule, ResolvedRule, RuleSettings};

/// Builds the effective rule table.
///
/// Keywords are processed in declaration order. Each one starts from its
/// group's defaults (when the group exists), overrides them with its own
/// explicit settings and collapses anything still inherited to `false`.
/// The primary keyword, its variations and then its aliases are registered;
/// the first keyword to register a surface form keeps it.
///
/// Keywords with a blank keyword or target are skipped, never fatal.
pub fn resolve_rules(
    keywords: &[KeywordRule],
    groups: &[KeywordGroup],
    aliases: &dyn AliasResolver,
) -> RuleTable {
    let defaults: HashMap<Uuid, &RuleSettings> =
        groups.iter().map(|g| (g.id, &g.defaults)).collect();
    let mut table = RuleTable::default();

    for (keyword_index, raw) in keywords.iter().enumerate() {
        let keyword = raw.keyword.trim();
        let target = raw.target.trim();
        if keyword.is_empty() || target.is_empty() {
            log::debug!("Skipping keyword #{keyword_index}: empty keyword or target");
            continue;
        }

        let settings = match raw.group_id.and_then(|id| defaults.get(&id)) {
            Some(group_defaults) => raw.settings.over(group_defaults),
            None => raw.settings.clone(),
        };

        let rule = table.push_rule(ResolvedRule {
            id: raw.id,
            keyword_index,
            keyword: keyword.to_string(),
            target: target.to_string(),
            surface_forms: Vec::new(),
            enable_tags: settings.enable_tags.resolve(),
            use_relative_links: settings.use_relative_links.resolve(),
            only_in_notes_linking_to: settings.only_in_notes_linking_to.resolve(),
            suggest_mode: settings.suggest_mode.resolve(),
            prevent_self_link: settings.prevent_self_link.resolve(),
            link_scope: settings.link_scope.unwrap_or_default(),
            scope_folder: settings
                .scope_folder
                .as_deref()
                .map(|f| f.trim().trim_matches('/'))
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            block_ref: clean_reference(raw.block_ref.as_deref()),
            require_tag: clean_reference(raw.require_tag.as_deref()),
        });

        table.register(keyword, rule);
        for variation in &raw.variations {
            table.register(variation, rule);
        }
        for alias in aliases.resolve_aliases(target) {
            table.register(&alias, rule);
        }
    }

    log::debug!(
        "Resolved {} rules into {} surface forms",
        table.rules().len(),
        table.len()
    );
    table
}

/// Removes a group; member keywords become ungrouped rather than deleted.
pub fn delete_group(
    groups: &mut Vec<KeywordGroup>,
    keywords: &mut [KeywordRule],
    id: Uuid,
) -> Option<KeywordGroup> {
    let position = groups.iter().position(|g| g.id == id)?;
    for keyword in keywords.iter_mut().filter(|k| k.group_id == Some(id)) {
        keyword.group_id = None;
    }
    Some(groups.remove(position))
}

/// Trims whitespace and a leading `#` from block refs and tag names.
fn clean_reference(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().trim_start_matches('#').trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NullVault;
    use crate::rules::{Flag, LinkScope};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn forms(table: &RuleTable) -> Vec<(&str, &str)> {
        table
            .entries()
            .iter()
            .map(|e| (e.form.as_str(), table.rule(e.rule).target.as_str()))
            .collect()
    }

    #[test]
    fn registers_keyword_variations_then_aliases() {
        let keywords = vec![KeywordRule::new("Rust", "Rust Language").with_variations(["rustlang"])];
        let aliases = HashMap::from([(
            "Rust Language".to_string(),
            vec!["Ferris".to_string(), "RUST".to_string()],
        )]);

        let table = resolve_rules(&keywords, &[], &aliases);

        assert_eq!(
            forms(&table),
            vec![
                ("Rust", "Rust Language"),
                ("rustlang", "Rust Language"),
                ("Ferris", "Rust Language"),
            ]
        );
        assert_eq!(table.rule(0).surface_forms, vec!["Rust", "rustlang", "Ferris"]);
    }

    #[test]
    fn earliest_keyword_wins_collisions() {
        let keywords = vec![
            KeywordRule::new("Apple", "Fruit"),
            KeywordRule::new("apple", "Company"),
            KeywordRule::new("Pear", "Fruit").with_variations(["APPLE"]),
        ];

        let table = resolve_rules(&keywords, &[], &NullVault);

        assert_eq!(forms(&table), vec![("Apple", "Fruit"), ("Pear", "Fruit")]);
        assert_eq!(table.lookup("APPLE").map(|r| r.target.as_str()), Some("Fruit"));
        assert!(table.rule(1).surface_forms.is_empty());
    }

    #[test]
    fn blank_keyword_or_target_is_skipped() {
        let keywords = vec![
            KeywordRule::new("  ", "Target"),
            KeywordRule::new("Keyword", " "),
            KeywordRule::new("Kept", "Target").with_variations(["", "  "]),
        ];

        let table = resolve_rules(&keywords, &[], &NullVault);

        assert_eq!(forms(&table), vec![("Kept", "Target")]);
        assert_eq!(table.rule(0).keyword_index, 2);
    }

    #[test]
    fn group_defaults_fill_unset_fields() {
        let group = KeywordGroup::new(
            "people",
            RuleSettings {
                enable_tags: Flag::Explicit(true),
                suggest_mode: Flag::Explicit(true),
                link_scope: Some(LinkScope::TargetFolder),
                scope_folder: Some("/people/".into()),
                ..RuleSettings::default()
            },
        );
        let keywords = vec![
            KeywordRule::new("Ada", "Ada Lovelace")
                .in_group(group.id)
                .with_settings(RuleSettings {
                    suggest_mode: Flag::Explicit(false),
                    ..RuleSettings::default()
                }),
        ];

        let table = resolve_rules(&keywords, std::slice::from_ref(&group), &NullVault);
        let rule = table.rule(0);

        assert!(rule.enable_tags);
        assert!(!rule.suggest_mode);
        assert!(!rule.use_relative_links);
        assert_eq!(rule.link_scope, LinkScope::TargetFolder);
        assert_eq!(rule.scope_folder.as_deref(), Some("people"));
    }

    #[test]
    fn missing_group_means_plain_defaults() {
        let keywords = vec![KeywordRule::new("Ada", "Ada Lovelace").in_group(Uuid::new_v4())];

        let table = resolve_rules(&keywords, &[], &NullVault);
        let rule = table.rule(0);

        assert!(!rule.enable_tags);
        assert_eq!(rule.link_scope, LinkScope::VaultWide);
    }

    #[test]
    fn block_ref_and_tag_are_normalised() {
        let mut raw = KeywordRule::new("Intro", "Guide");
        raw.block_ref = Some(" #^intro ".into());
        raw.require_tag = Some("#published".into());

        let table = resolve_rules(&[raw], &[], &NullVault);

        assert_eq!(table.rule(0).block_ref.as_deref(), Some("^intro"));
        assert_eq!(table.rule(0).require_tag.as_deref(), Some("published"));
    }

    #[test]
    fn scan_order_is_longest_first_then_declaration() {
        let keywords = vec![
            KeywordRule::new("Note", "A"),
            KeywordRule::new("Daily Note", "B"),
            KeywordRule::new("Tags", "C"),
        ];

        let table = resolve_rules(&keywords, &[], &NullVault);
        let order: Vec<&str> = table.scan_order().iter().map(|e| e.form.as_str()).collect();

        assert_eq!(order, vec!["Daily Note", "Note", "Tags"]);
    }

    #[test]
    fn deleting_group_ungroups_members() {
        let group = KeywordGroup::new("g", RuleSettings::default());
        let mut groups = vec![group.clone()];
        let mut keywords = vec![
            KeywordRule::new("A", "T").in_group(group.id),
            KeywordRule::new("B", "T"),
        ];

        let removed = delete_group(&mut groups, &mut keywords, group.id);

        assert_eq!(removed.map(|g| g.name), Some("g".to_string()));
        assert!(groups.is_empty());
        assert_eq!(keywords.len(), 2);
        assert!(keywords.iter().all(|k| k.group_id.is_none()));
    }
}
