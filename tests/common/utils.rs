#![allow(dead_code)]

use std::path::PathBuf;

use smart_selector::dom::{Dom, NodeId, parse_html};
use smart_selector::error::{Result, SelectorError};
use smart_selector::picker::ports::{Clipboard, Notifier};
use smart_selector::selector::GeneratedSelector;

pub fn fixture_path(name: &str) -> PathBuf {
    let base = std::env::current_dir().unwrap();
    base.join("tests").join("fixtures").join(name)
}

pub fn fixture(name: &str) -> Dom {
    smart_selector::load_document(fixture_path(name)).expect("fixture should load")
}

pub fn html(src: &str) -> Dom {
    parse_html(src).expect("test markup should parse")
}

/// First element matching `query`; panics with the query when nothing matches.
pub fn node(dom: &Dom, query: &str) -> NodeId {
    dom.query_selector(query)
        .expect("lookup query should parse")
        .unwrap_or_else(|| panic!("no element matches '{}'", query))
}

/// The generated selector matches `target`, and exactly it unless it is the absolute path.
pub fn assert_round_trip(dom: &Dom, target: NodeId, generated: &GeneratedSelector) {
    let matches = dom
        .query_selector_all(&generated.selector)
        .unwrap_or_else(|e| panic!("generated selector '{}' does not parse: {}", generated.selector, e));
    assert!(
        matches.contains(&target),
        "selector '{}' ({}) does not match its element",
        generated.selector,
        generated.strategy
    );
    assert_eq!(
        matches.len(),
        generated.match_count,
        "reported match count for '{}'",
        generated.selector
    );
    if generated.strategy.guarantees_uniqueness() {
        assert_eq!(
            matches.len(),
            1,
            "selector '{}' from {} must be unique",
            generated.selector,
            generated.strategy
        );
    }
}

#[derive(Debug, Default)]
pub struct RecordingClipboard {
    pub writes: Vec<String>,
    pub fail: bool,
}

impl Clipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            return Err(SelectorError::Clipboard("permission denied".into()));
        }
        self.writes.push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub messages: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
