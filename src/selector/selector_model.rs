use serde::{Deserialize, Serialize};

/// Which step of the generator produced a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    DateInput,
    DynamicId,
    StableId,
    DataAttribute,
    Hybrid,
    RobustClass,
    NthChild,
    FallbackPath,
    AbsolutePath,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::DateInput => "date-input",
            StrategyKind::DynamicId => "dynamic-id",
            StrategyKind::StableId => "stable-id",
            StrategyKind::DataAttribute => "data-attribute",
            StrategyKind::Hybrid => "hybrid",
            StrategyKind::RobustClass => "robust-class",
            StrategyKind::NthChild => "nth-child",
            StrategyKind::FallbackPath => "fallback-path",
            StrategyKind::AbsolutePath => "absolute-path",
        }
    }

    /// Special cases and cascade strategies only win with a unique match.
    pub fn guarantees_uniqueness(&self) -> bool {
        !matches!(self, StrategyKind::AbsolutePath)
    }

    pub fn is_special_case(&self) -> bool {
        matches!(self, StrategyKind::DateInput | StrategyKind::DynamicId)
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One strategy tried during a generation, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: StrategyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSelector {
    pub selector: String,
    pub strategy: StrategyKind,
    /// Matches of `selector` at generation time; `1` for everything but the absolute path.
    pub match_count: usize,
    #[serde(default)]
    pub attempts: Vec<StrategyAttempt>,
}

impl GeneratedSelector {
    pub fn is_unique(&self) -> bool {
        self.match_count == 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_data_attributes")]
    pub data_attributes: Vec<String>,

    /// Require data-attribute selectors to be unique before accepting them.
    #[serde(default = "default_verify_data_attributes")]
    pub verify_data_attributes: bool,

    #[serde(default = "default_date_placeholder_markers")]
    pub date_placeholder_markers: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_attributes: default_data_attributes(),
            verify_data_attributes: default_verify_data_attributes(),
            date_placeholder_markers: default_date_placeholder_markers(),
        }
    }
}

fn default_data_attributes() -> Vec<String> {
    [
        "data-testid",
        "data-cy",
        "data-qa",
        "data-id",
        "data-name",
        "data-role",
        "data-type",
        "data-target",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_verify_data_attributes() -> bool {
    true
}

fn default_date_placeholder_markers() -> Vec<String> {
    ["日期", "date", "yyyy", "mm/dd", "dd/mm"]
        .into_iter()
        .map(String::from)
        .collect()
}
