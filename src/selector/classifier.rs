//! Stability classification of ids, class tokens and attribute values.
//!
//! Everything here is a pure function of the candidate string; nothing consults the tree.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Values that look machine-generated or state-dependent.
static IGNORE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("leading-digit", r"^[0-9]"),
        ("trailing-number", r"-[0-9]+$"),
        ("iso-date", r"[0-9]{4}-[0-9]{2}-[0-9]{2}"),
        ("state-token", r"^(active|hover|focus|selected|disabled)$"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid ignore pattern")))
    .collect()
});

static DYNAMIC_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[0-9]",
        r"[0-9]{4}-[0-9]{2}-[0-9]{2}",
        r"_[0-9]+$",
        r"(?i)-[0-9a-f]{8,}$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid dynamic id pattern"))
    .collect()
});

static SINGLE_LETTER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]-").expect("valid prefix pattern"));

static SHORT_ALPHA_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{1,2}[0-9]+$").expect("valid short token pattern"));

/// Framework class prefixes that stay attached to a component across renders.
const STABLE_NG_PREFIXES: [&str; 2] = ["ng-star-inserted", "ng-tns-"];

/// Layout/business tokens that are meaningful despite being short or generic.
const BUSINESS_CLASSES: [&str; 9] = [
    "submenu",
    "menu-item",
    "item-content",
    "item-label",
    "grandchild-item",
    "third-level",
    "left",
    "right",
    "icon-wrapper",
];

const MAX_IDENTIFIER_DIGIT_RATIO: f64 = 0.3;
const MAX_CLASS_DIGIT_RATIO: f64 = 0.2;
const MAX_MEANINGFUL_DIGIT_RATIO: f64 = 0.3;

/// Share of ASCII digits among all characters; `0.0` for the empty string.
pub fn digit_ratio(value: &str) -> f64 {
    let total = value.chars().count();
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    digits as f64 / total.max(1) as f64
}

fn matched_ignore_pattern(value: &str) -> Option<&'static str> {
    IGNORE_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(value))
        .map(|(name, _)| *name)
}

pub fn is_stable_identifier(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    if value.chars().count() < 2 {
        return false;
    }
    if matched_ignore_pattern(value).is_some() {
        return false;
    }
    digit_ratio(value) <= MAX_IDENTIFIER_DIGIT_RATIO
}

pub fn is_stable_class(token: &str) -> bool {
    token.chars().count() >= 3
        && matched_ignore_pattern(token).is_none()
        && !token.contains("--") // BEM modifier
        && digit_ratio(token) < MAX_CLASS_DIGIT_RATIO
}

pub fn is_meaningful_class(token: &str) -> bool {
    if !is_stable_class(token) {
        return false;
    }

    // Script hooks and single-letter utility prefixes
    if token.starts_with("js-") || SINGLE_LETTER_PREFIX.is_match(token) {
        return false;
    }

    if token.starts_with("ng-") {
        return STABLE_NG_PREFIXES
            .iter()
            .any(|prefix| token.starts_with(prefix));
    }

    if BUSINESS_CLASSES.contains(&token) {
        return true;
    }

    token.chars().count() >= 4
        && !SHORT_ALPHA_NUMERIC.is_match(token)
        && digit_ratio(token) < MAX_MEANINGFUL_DIGIT_RATIO
}

pub fn is_dynamic_id(id: &str) -> bool {
    DYNAMIC_ID_PATTERNS.iter().any(|pattern| pattern.is_match(id))
}

/// Why a value was (or was not) accepted as a stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierReport {
    pub value: String,
    pub stable_identifier: bool,
    pub stable_class: bool,
    pub meaningful_class: bool,
    pub dynamic_id: bool,
    pub digit_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
}

pub fn explain_identifier(value: &str) -> IdentifierReport {
    let ratio = digit_ratio(value);
    let rejected_by = if value.chars().count() < 2 {
        Some("too-short".to_string())
    } else if let Some(pattern) = matched_ignore_pattern(value) {
        Some(format!("pattern:{}", pattern))
    } else if ratio > MAX_IDENTIFIER_DIGIT_RATIO {
        Some(format!("digit-ratio:{:.2}", ratio))
    } else {
        None
    };

    IdentifierReport {
        value: value.to_string(),
        stable_identifier: is_stable_identifier(Some(value)),
        stable_class: is_stable_class(value),
        meaningful_class: is_meaningful_class(value),
        dynamic_id: is_dynamic_id(value),
        digit_ratio: ratio,
        rejected_by,
    }
}
