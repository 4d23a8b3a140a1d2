use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectorError>;

#[derive(Debug, Error)]
pub enum SelectorError {
    /// Markup could not be turned into a tree
    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    /// JSON snapshot produced by a browser-side extraction was malformed
    #[error("snapshot parse error ({context}): {source}")]
    SnapshotParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Query string outside the supported selector grammar
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// No element matched the target query
    #[error("element '{target}' not found: {context}")]
    ElementNotFound { target: String, context: String },

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SelectorError {
    /// Syntax problems in a candidate query are treated as "not unique" by the oracle.
    pub fn is_query_syntax(&self) -> bool {
        matches!(self, SelectorError::UnsupportedSelector(_))
    }
}
