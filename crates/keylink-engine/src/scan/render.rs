//! Replacement text for accepted matches.
//!
//! Three shapes: a wikilink, a relative markdown link, or an inert
//! suggestion marker that carries everything needed to become one of the
//! other two later.

use crate::classify::kinds::{MarkdownLink, Suggestion, WikiLink};
use crate::rules::ResolvedRule;

/// Replacement for `label` under `rule`.
pub fn replacement(rule: &ResolvedRule, label: &str, in_table: bool) -> String {
    let block = rule.block_ref.as_deref();
    if rule.suggest_mode {
        suggestion_marker(&rule.target, block, rule.use_relative_links, label)
    } else {
        link(&rule.target, block, rule.use_relative_links, label, in_table)
    }
}

/// A committed link in whichever syntax the rule asks for.
pub fn link(
    target: &str,
    block: Option<&str>,
    relative: bool,
    label: &str,
    in_table: bool,
) -> String {
    if relative {
        relative_link(target, block, label, in_table)
    } else {
        wikilink(target, block, label, in_table)
    }
}

/// `[[target#block|label]]`, or `[[label]]` when nothing else is needed.
///
/// Inside a table the alias separator is written as `\|` so the row keeps
/// its column count.
pub fn wikilink(target: &str, block: Option<&str>, label: &str, in_table: bool) -> String {
    let (open, close) = (WikiLink::OPEN_TEXT, WikiLink::CLOSE_TEXT);
    if block.is_none() && target == label {
        return format!("{open}{label}{close}");
    }

    let mut out = String::with_capacity(target.len() + label.len() + 8);
    out.push_str(open);
    out.push_str(target);
    if let Some(block) = block {
        out.push(WikiLink::HEADING as char);
        out.push_str(block);
    }
    if in_table {
        out.push_str(WikiLink::TABLE_ALIAS);
    } else {
        out.push(WikiLink::ALIAS as char);
    }
    out.push_str(label);
    out.push_str(close);
    out
}

/// `[label](target.md#block)` with every path segment percent-encoded.
pub fn relative_link(target: &str, block: Option<&str>, label: &str, in_table: bool) -> String {
    let label = if in_table {
        label.replace('|', WikiLink::TABLE_ALIAS)
    } else {
        label.to_string()
    };

    let mut url = target
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if !url.ends_with(MarkdownLink::EXTENSION) {
        url.push_str(MarkdownLink::EXTENSION);
    }
    if let Some(block) = block {
        url.push(WikiLink::HEADING as char);
        url.push_str(block);
    }

    format!(
        "{}{label}{}{}{url}{}",
        MarkdownLink::TEXT_OPEN as char,
        MarkdownLink::TEXT_CLOSE as char,
        MarkdownLink::URL_OPEN as char,
        MarkdownLink::URL_CLOSE as char,
    )
}

/// The inert `<span>` marker used in suggest mode.
pub fn suggestion_marker(target: &str, block: Option<&str>, relative: bool, label: &str) -> String {
    let mut out = String::from(Suggestion::OPEN);
    push_attr(&mut out, Suggestion::ATTR_TARGET, target);
    if let Some(block) = block {
        push_attr(&mut out, Suggestion::ATTR_BLOCK, block);
    }
    push_attr(
        &mut out,
        Suggestion::ATTR_RELATIVE,
        if relative { "true" } else { "false" },
    );
    out.push('>');
    out.push_str(&html_escape::encode_text(label));
    out.push_str(Suggestion::CLOSE);
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}
