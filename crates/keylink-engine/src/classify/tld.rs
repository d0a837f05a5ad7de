//! Top-level domains recognised by URL exclusion.
//!
//! A fixed allow-list rather than a validity check: adding or removing an
//! entry changes which keyword occurrences get excluded, so the table is
//! versioned. Two-letter codes that are also common English words (`in`,
//! `it`, `is`, `to`, `me`, `be`, `no`, `so`, `at`, `as`) are deliberately
//! absent, as is `md` so note file names never read as domains. This is a
//! departure from the usual public-suffix style lists, and every change to
//! the entries must bump [`TLD_TABLE_VERSION`].

pub const TLD_TABLE_VERSION: u32 = 1;

pub const TLDS: &[&str] = &[
    // generic
    "com", "org", "net", "edu", "gov", "mil", "int", "info", "biz", "xyz", "app", "dev", "io",
    "ai", "co", "tech", "site", "online", "blog", "news", "shop", "store", "cloud", "page",
    "wiki", "club", "live", "pro", "name", "museum", "design", "email",
    // country codes
    "uk", "us", "ca", "de", "fr", "jp", "cn", "au", "ru", "br", "es", "nl", "se", "ch", "eu",
    "tv", "cc", "ly", "gg", "fm", "nz", "kr", "pl", "mx", "ar", "za", "ie", "dk", "fi", "nu",
    "cz", "pt", "gr", "hu", "ro", "tw", "hk", "sg", "il", "ua", "vn",
];

/// Case-insensitive membership test.
pub fn is_known_tld(candidate: &str) -> bool {
    TLDS.iter().any(|tld| tld.eq_ignore_ascii_case(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_ignores_case() {
        assert!(is_known_tld("COM"));
        assert!(is_known_tld("io"));
        assert!(!is_known_tld("in"));
        assert!(!is_known_tld("md"));
    }

    #[test]
    fn word_like_codes_stay_out() {
        for word in ["in", "it", "is", "to", "me", "be", "no", "so", "at", "as", "md"] {
            assert!(!is_known_tld(word), "{word} must not be a tld");
        }
    }

    #[test]
    fn table_changes_bump_the_version() {
        // Update both numbers together when editing the list.
        assert_eq!((TLD_TABLE_VERSION, TLDS.len()), (1, 73));
    }

    #[test]
    fn entries_are_lowercase_and_unique() {
        for (i, tld) in TLDS.iter().enumerate() {
            assert_eq!(*tld, tld.to_lowercase());
            assert!(!TLDS[i + 1..].contains(tld), "duplicate tld {tld}");
        }
    }
}
