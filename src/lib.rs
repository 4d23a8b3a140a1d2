pub mod cli;
pub mod dom;
pub mod error;
pub mod picker;
pub mod selector;
pub mod trace;

use std::path::Path;

use crate::dom::{Dom, load_snapshot, parse_html};
use crate::error::Result;

pub use crate::selector::{GeneratedSelector, SelectorGenerator, StrategyKind, generate_selector};

/// Parses `content` as a JSON snapshot when it looks like one, else as HTML.
pub fn parse_document(content: &str) -> Result<Dom> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        load_snapshot(content)
    } else {
        parse_html(content)
    }
}

/// Loads a document from disk; `.json` files are snapshots, anything else is HTML.
pub fn load_document(path: impl AsRef<Path>) -> Result<Dom> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_snapshot(&content)
    } else {
        parse_document(&content)
    }
}
