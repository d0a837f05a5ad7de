//! # Markup Kinds
//!
//! Types that own the syntax delimiters the classifier looks for.
//!
//! ## Types
//!
//! - **`WikiLink`**: `OPEN = b"[["`, `CLOSE = b"]]"`, `ALIAS = b'|'`
//! - **`CodeSpan`**: `TICK = b'\`'`
//! - **`MarkdownLink`**: `[text](url)` brackets and parens
//! - **`Suggestion`**: the inert `<span>` marker the engine emits
//! - **`FrontMatter`**: `---` / `...` delimiter lines
//! - **`BlockRef`**: the `^` anchor prefix
//!
//! Predicates call these constants; they never hardcode `[[` or `` ` ``.

pub mod block_ref;
pub mod code_span;
pub mod front_matter;
pub mod markdown_link;
pub mod suggestion;
pub mod wikilink;

pub use block_ref::BlockRef;
pub use code_span::CodeSpan;
pub use front_matter::FrontMatter;
pub use markdown_link::MarkdownLink;
pub use suggestion::Suggestion;
pub use wikilink::WikiLink;
