use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-rule boolean that may defer to its group.
///
/// Serialized as an optional bool: absent or `null` means [`Flag::Inherit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Flag {
    Explicit(bool),
    #[default]
    Inherit,
}

impl Flag {
    /// `self` if explicitly set, otherwise `fallback`.
    #[must_use]
    pub fn or(self, fallback: Flag) -> Flag {
        match self {
            Flag::Explicit(_) => self,
            Flag::Inherit => fallback,
        }
    }

    /// Collapses any remaining inheritance to `false`.
    #[must_use]
    pub fn resolve(self) -> bool {
        matches!(self, Flag::Explicit(true))
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, Flag::Inherit)
    }
}

impl From<Option<bool>> for Flag {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Flag::Inherit, Flag::Explicit)
    }
}

impl From<Flag> for Option<bool> {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Explicit(b) => Some(b),
            Flag::Inherit => None,
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag::Explicit(value)
    }
}

/// Which notes a rule may act within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkScope {
    #[default]
    VaultWide,
    /// Source and target notes live in the same folder.
    SameFolder,
    /// The source note lives under `scope_folder`.
    SourceFolder,
    /// The target note lives under `scope_folder`.
    TargetFolder,
}

/// The inheritable settings shared by rules and group defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    #[serde(skip_serializing_if = "Flag::is_inherit")]
    pub enable_tags: Flag,
    #[serde(skip_serializing_if = "Flag::is_inherit")]
    pub use_relative_links: Flag,
    #[serde(skip_serializing_if = "Flag::is_inherit")]
    pub only_in_notes_linking_to: Flag,
    #[serde(skip_serializing_if = "Flag::is_inherit")]
    pub suggest_mode: Flag,
    #[serde(skip_serializing_if = "Flag::is_inherit")]
    pub prevent_self_link: Flag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_scope: Option<LinkScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_folder: Option<String>,
}

impl RuleSettings {
    /// Field-wise: explicit values in `self` win over `defaults`.
    #[must_use]
    pub fn over(&self, defaults: &RuleSettings) -> RuleSettings {
        RuleSettings {
            enable_tags: self.enable_tags.or(defaults.enable_tags),
            use_relative_links: self.use_relative_links.or(defaults.use_relative_links),
            only_in_notes_linking_to: self
                .only_in_notes_linking_to
                .or(defaults.only_in_notes_linking_to),
            suggest_mode: self.suggest_mode.or(defaults.suggest_mode),
            prevent_self_link: self.prevent_self_link.or(defaults.prevent_self_link),
            link_scope: self.link_scope.or(defaults.link_scope),
            scope_folder: self
                .scope_folder
                .clone()
                .or_else(|| defaults.scope_folder.clone()),
        }
    }
}

/// A keyword definition as the user configured it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub keyword: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_tag: Option<String>,
    #[serde(default)]
    pub settings: RuleSettings,
}

impl KeywordRule {
    pub fn new(keyword: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            keyword: keyword.into(),
            target: target.into(),
            variations: Vec::new(),
            group_id: None,
            block_ref: None,
            require_tag: None,
            settings: RuleSettings::default(),
        }
    }

    pub fn with_variations<I, S>(mut self, variations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variations = variations.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_group(mut self, group_id: Uuid) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_settings(mut self, settings: RuleSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// A named bundle of default settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub defaults: RuleSettings,
}

impl KeywordGroup {
    pub fn new(name: impl Into<String>, defaults: RuleSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            defaults,
        }
    }
}

/// A rule with every setting decided, ready for scanning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRule {
    pub id: Uuid,
    /// Position of the source keyword in declaration order.
    pub keyword_index: usize,
    pub keyword: String,
    pub target: String,
    /// Primary keyword, variations and aliases that this rule won.
    pub surface_forms: Vec<String>,
    pub enable_tags: bool,
    pub use_relative_links: bool,
    pub only_in_notes_linking_to: bool,
    pub suggest_mode: bool,
    pub prevent_self_link: bool,
    pub link_scope: LinkScope,
    pub scope_folder: Option<String>,
    pub block_ref: Option<String>,
    pub require_tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_flag_wins_over_fallback() {
        assert_eq!(Flag::Explicit(false).or(Flag::Explicit(true)), Flag::Explicit(false));
        assert_eq!(Flag::Inherit.or(Flag::Explicit(true)), Flag::Explicit(true));
        assert!(!Flag::Inherit.resolve());
    }

    #[test]
    fn settings_merge_field_by_field() {
        let defaults = RuleSettings {
            enable_tags: Flag::Explicit(true),
            suggest_mode: Flag::Explicit(true),
            link_scope: Some(LinkScope::SameFolder),
            ..RuleSettings::default()
        };
        let own = RuleSettings {
            suggest_mode: Flag::Explicit(false),
            ..RuleSettings::default()
        };
        let merged = own.over(&defaults);
        assert_eq!(merged.enable_tags, Flag::Explicit(true));
        assert_eq!(merged.suggest_mode, Flag::Explicit(false));
        assert_eq!(merged.use_relative_links, Flag::Inherit);
        assert_eq!(merged.link_scope, Some(LinkScope::SameFolder));
    }

    #[test]
    fn flag_serializes_as_optional_bool() {
        let yaml = to_yaml(&RuleSettings {
            enable_tags: Flag::Explicit(true),
            ..RuleSettings::default()
        });
        assert_eq!(yaml, "enable_tags: true\n");
    }

    #[test]
    fn missing_and_null_flags_inherit() {
        let settings: RuleSettings =
            serde_yaml::from_str("enable_tags: null\nsuggest_mode: false\n").unwrap();
        assert_eq!(settings.enable_tags, Flag::Inherit);
        assert_eq!(settings.suggest_mode, Flag::Explicit(false));
        assert_eq!(settings.prevent_self_link, Flag::Inherit);
    }

    #[test]
    fn link_scope_uses_kebab_case() {
        let scope: LinkScope = serde_yaml::from_str("same-folder").unwrap();
        assert_eq!(scope, LinkScope::SameFolder);
    }

    fn to_yaml(settings: &RuleSettings) -> String {
        serde_yaml::to_string(settings).unwrap()
    }
}
