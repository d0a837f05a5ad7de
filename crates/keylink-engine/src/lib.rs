pub mod apply;
pub mod classify;
pub mod document;
pub mod error;
pub mod io;
pub mod oracle;
pub mod review;
pub mod rules;
pub mod scan;
pub mod session;
pub mod span;
pub mod vault;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use apply::{Applied, OffsetDelta, Patch, Substitution, apply_spans, remap_offset, remap_range};
pub use document::Document;
pub use error::EngineError;
pub use oracle::{AliasResolver, NullVault, VaultOracle};
pub use rules::{
    Flag, KeywordGroup, KeywordRule, LinkScope, ResolvedRule, RuleSettings, RuleTable,
    resolve_rules,
};
pub use scan::{MatchSpan, ScanOptions, ScanResult, scan};
pub use span::Span;
