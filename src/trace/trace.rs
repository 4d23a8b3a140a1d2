use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::selector::selector_model::GeneratedSelector;

/// One line of the generation decision trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorTraceEvent {
    pub timestamp_ms: u128,

    pub tag: String,
    pub strategy: String,
    pub selector: String,
    pub match_count: usize,

    /// Strategies tried in order, winner last.
    pub attempts: Vec<String>,

    pub document_fingerprint: Option<String>,
    pub source: Option<String>,
}

impl SelectorTraceEvent {
    pub fn now(tag: &str, generated: &GeneratedSelector) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            tag: tag.to_string(),
            strategy: generated.strategy.name().to_string(),
            selector: generated.selector.clone(),
            match_count: generated.match_count,
            attempts: generated
                .attempts
                .iter()
                .map(|a| a.strategy.name().to_string())
                .collect(),
            document_fingerprint: None,
            source: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.document_fingerprint = fingerprint;
        self
    }

    pub fn with_source(mut self, source: impl ToString) -> Self {
        self.source = Some(source.to_string());
        self
    }
}
