use std::sync::LazyLock;

use regex::Regex;

use crate::span::Span;

use super::lines::line_bounds;
use super::tld::{TLDS, is_known_tld};

/// Size of the local windows inspected either side of a match.
pub const URL_WINDOW: usize = 100;

static PROTOCOL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?|ftps?|sftp|file)://[^\s\]]+").expect("protocol url pattern")
});

static WWW_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwww\.[^\s\]]+").expect("www host pattern"));

static DOMAIN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let tlds = TLDS.join("|");
    Regex::new(&format!(
        r#"(?i)(?:^|[\s(\[<{{"'])((?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+(?:{tlds})\b(?:[/?#][^\s\]]*)?)"#
    ))
    .expect("domain token pattern")
});

/// True when the match `[offset, offset + len)` is part of a URL or domain.
pub fn is_part_of_url(text: &str, offset: usize, len: usize) -> bool {
    if offset >= text.len() || len == 0 {
        return false;
    }
    let end = (offset + len).min(text.len());
    let matched = Span::new(offset, end);
    let line = line_bounds(text, offset);
    let Some(line_text) = text.get(line.start..line.end) else {
        return false;
    };

    let hit = |start: usize, stop: usize| {
        Span::new(line.start + start, line.start + stop).overlaps(matched)
    };

    if PROTOCOL_URL.find_iter(line_text).any(|m| hit(m.start(), m.end()))
        || WWW_HOST.find_iter(line_text).any(|m| hit(m.start(), m.end()))
    {
        return true;
    }
    if DOMAIN_TOKEN
        .captures_iter(line_text)
        .filter_map(|c| c.get(1))
        .any(|m| hit(m.start(), m.end()))
    {
        return true;
    }

    text.get(offset..end).is_some_and(ends_with_tld)
        || unterminated_prefix_before(text, line, offset)
        || tld_suffix_after(text, line, end)
}

/// The matched text itself looks like a domain, e.g. `example.com`.
fn ends_with_tld(matched: &str) -> bool {
    matched
        .rsplit_once('.')
        .is_some_and(|(head, tld)| !head.is_empty() && is_known_tld(tld))
}

/// A `scheme://` or `www.` run reaches the match without whitespace or `]`.
fn unterminated_prefix_before(text: &str, line: Span, offset: usize) -> bool {
    let floor = offset.saturating_sub(URL_WINDOW).max(line.start);
    let window = &text.as_bytes()[floor..offset];
    let token_start = window
        .iter()
        .rposition(|&b| b.is_ascii_whitespace() || b == b']')
        .map_or(0, |i| i + 1);
    let token = String::from_utf8_lossy(&window[token_start..]).to_ascii_lowercase();
    token.contains("://") || token.starts_with("www.") || token.contains("/www.")
}

/// The match is immediately followed by `.tld` and a non-word character.
fn tld_suffix_after(text: &str, line: Span, end: usize) -> bool {
    let ceiling = (end + URL_WINDOW).min(line.end);
    let window = &text.as_bytes()[end.min(ceiling)..ceiling];
    let Some(rest) = window.strip_prefix(b".") else {
        return false;
    };
    let label_len = rest.iter().take_while(|b| b.is_ascii_alphanumeric()).count();
    if label_len == 0 {
        return false;
    }
    let boundary_ok = rest
        .get(label_len)
        .is_none_or(|&b| !(b.is_ascii_alphanumeric() || b == b'_'));
    boundary_ok && std::str::from_utf8(&rest[..label_len]).is_ok_and(is_known_tld)
}
