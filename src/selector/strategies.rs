//! The ordered candidate strategies. Each produces at most one query for an element.

use tracing::trace;

use crate::dom::{DocumentTree, NodeId};
use crate::selector::classifier::is_stable_identifier;
use crate::selector::fragments::{
    attr_equals, class_compound, descendant, first_stable_class, grandparent_qualifier,
    id_selector, meaningful_classes, parent_identifier, positional_part, tag_of, with_type_index,
};
use crate::selector::oracle::UniquenessOracle;
use crate::selector::selector_model::{GeneratorConfig, StrategyKind};

const HYBRID_ATTRIBUTES: [&str; 5] = ["type", "name", "placeholder", "role", "aria-label"];
const PATH_ATTRIBUTES: [&str; 5] = ["name", "type", "role", "aria-label", "tabindex"];

const MAX_HYBRID_CLASSES: usize = 2;
const MAX_ROBUST_CLASSES: usize = 3;
const MAX_TEXT_LENGTH: usize = 100;
const PRECISE_PATH_DEPTH: usize = 4;
const STABLE_PATH_DEPTH: usize = 5;

/// Read-only state shared by every strategy during one generation.
pub struct StrategyContext<'a> {
    pub tree: &'a dyn DocumentTree,
    pub oracle: UniquenessOracle<'a>,
    pub config: &'a GeneratorConfig,
}

impl<'a> StrategyContext<'a> {
    pub fn new(tree: &'a dyn DocumentTree, config: &'a GeneratorConfig) -> Self {
        Self {
            tree,
            oracle: UniquenessOracle::new(tree),
            config,
        }
    }

    /// Keeps `query` only if it selects `node` and nothing else.
    pub fn accept(&self, query: String, node: NodeId) -> Option<String> {
        if self.oracle.is_unique_match(&query, node) {
            Some(query)
        } else {
            trace!(%query, "candidate not unique");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    StableId,
    DataAttribute,
    Hybrid,
    RobustClass,
    NthChild,
    FallbackPath,
}

impl Strategy {
    pub const CASCADE: [Strategy; 6] = [
        Strategy::StableId,
        Strategy::DataAttribute,
        Strategy::Hybrid,
        Strategy::RobustClass,
        Strategy::NthChild,
        Strategy::FallbackPath,
    ];

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::StableId => StrategyKind::StableId,
            Strategy::DataAttribute => StrategyKind::DataAttribute,
            Strategy::Hybrid => StrategyKind::Hybrid,
            Strategy::RobustClass => StrategyKind::RobustClass,
            Strategy::NthChild => StrategyKind::NthChild,
            Strategy::FallbackPath => StrategyKind::FallbackPath,
        }
    }

    pub fn attempt(&self, ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
        match self {
            Strategy::StableId => stable_id(ctx, node),
            Strategy::DataAttribute => data_attribute(ctx, node),
            Strategy::Hybrid => hybrid(ctx, node),
            Strategy::RobustClass => robust_class(ctx, node),
            Strategy::NthChild => nth_child(ctx, node),
            Strategy::FallbackPath => fallback_path(ctx, node),
        }
    }
}

fn stable_id(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let id = ctx.tree.id(node)?;
    if !is_stable_identifier(Some(id)) {
        return None;
    }
    ctx.accept(id_selector(id), node)
}

fn data_attribute(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let tag = tag_of(ctx.tree, node);

    for name in &ctx.config.data_attributes {
        let Some(value) = ctx.tree.attr(node, name) else {
            continue;
        };
        if !is_stable_identifier(Some(value)) {
            continue;
        }

        let bare = format!("{}{}", tag, attr_equals(name, value));
        let qualified = grandparent_qualifier(ctx.tree, node).map(|gp| descendant(&gp, &bare));

        if !ctx.config.verify_data_attributes {
            return Some(qualified.unwrap_or(bare));
        }

        let found = qualified
            .and_then(|query| ctx.accept(query, node))
            .or_else(|| ctx.accept(bare, node));
        if found.is_some() {
            return found;
        }
    }
    None
}

fn hybrid(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let tag = tag_of(ctx.tree, node);
    let base = class_compound(&tag, &meaningful_classes(ctx.tree, node, MAX_HYBRID_CLASSES));

    HYBRID_ATTRIBUTES.iter().find_map(|name| {
        let value = ctx.tree.attr(node, name)?;
        if value.chars().count() <= 2 {
            return None;
        }
        ctx.accept(format!("{}{}", base, attr_equals(name, value)), node)
    })
}

fn robust_class(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let classes = meaningful_classes(ctx.tree, node, MAX_ROBUST_CLASSES);
    let tag = tag_of(ctx.tree, node);

    (1..=classes.len())
        .rev()
        .find_map(|count| ctx.accept(class_compound(&tag, &classes[..count]), node))
}

fn nth_child(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let parent = ctx.tree.parent_element(node)?;
    let index = ctx.tree.child_position(node)?;
    let step = format!("{}:nth-child({})", tag_of(ctx.tree, node), index);

    ctx.accept(descendant(&parent_identifier(ctx.tree, parent), &step), node)
        .or_else(|| ctx.accept(step, node))
}

fn fallback_path(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    if let Some(query) = text_anchored(ctx, node) {
        return Some(query);
    }

    if let Some(query) = ctx.accept(precise_class_path(ctx, node), node) {
        return Some(query);
    }

    stable_path(ctx, node).and_then(|query| ctx.accept(query, node))
}

/// Leaf whose trimmed text no other element of its tag shares: `parent tag`.
fn text_anchored(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    if !ctx.tree.element_children(node).is_empty() {
        return None;
    }
    let text = ctx.tree.text_content(node);
    let text = text.trim();
    if text.is_empty() || text.chars().count() > MAX_TEXT_LENGTH {
        return None;
    }

    let tag = tag_of(ctx.tree, node);
    let same_text = ctx
        .tree
        .query_selector_all(&tag)
        .ok()?
        .into_iter()
        .filter(|other| ctx.tree.text_content(*other).trim() == text)
        .count();
    if same_text != 1 {
        return None;
    }

    let parent = ctx.tree.parent_element(node)?;
    ctx.accept(descendant(&parent_identifier(ctx.tree, parent), &tag), node)
}

fn join(parts: &[String]) -> String {
    parts.join(" ")
}

/// Walks up to four levels, preferring the largest meaningful-class combination per level.
pub fn precise_class_path(ctx: &StrategyContext<'_>, node: NodeId) -> String {
    let mut path: Vec<String> = Vec::new();
    let mut current = Some(node);

    for _ in 0..PRECISE_PATH_DEPTH {
        let Some(level) = current else { break };
        let tag = tag_of(ctx.tree, level);
        let classes = meaningful_classes(ctx.tree, level, MAX_ROBUST_CLASSES);

        let part = if classes.is_empty() {
            positional_part(ctx.tree, level)
        } else {
            // Largest combination that makes the partial path unique, else the first class.
            (1..=classes.len())
                .rev()
                .map(|count| class_compound(&tag, &classes[..count]))
                .find(|candidate| {
                    let mut trial = vec![candidate.clone()];
                    trial.extend(path.iter().cloned());
                    ctx.oracle.is_unique_match(&join(&trial), node)
                })
                .unwrap_or_else(|| class_compound(&tag, &classes[..1]))
        };
        path.insert(0, part);

        let query = join(&path);
        if path.len() > 1 && ctx.oracle.is_unique_match(&query, node) {
            return query;
        }
        current = ctx.tree.parent_element(level);
    }

    join(&path)
}

struct PathLevel {
    node: NodeId,
    part: String,
    positional: bool,
}

/// Class, stable attribute, position, or bare tag for one level of the stable path.
fn level_identifier(ctx: &StrategyContext<'_>, node: NodeId) -> PathLevel {
    let tag = tag_of(ctx.tree, node);
    let level = |part: String, positional: bool| PathLevel {
        node,
        part,
        positional,
    };

    let classes = meaningful_classes(ctx.tree, node, MAX_HYBRID_CLASSES);
    if !classes.is_empty() {
        return level(class_compound(&tag, &classes), false);
    }

    if let Some(class) = first_stable_class(ctx.tree, node) {
        return level(class_compound(&tag, &[class]), false);
    }

    let stable_attr = PATH_ATTRIBUTES.iter().find_map(|name| {
        let value = ctx.tree.attr(node, name)?;
        is_stable_identifier(Some(value)).then(|| format!("{}{}", tag, attr_equals(name, value)))
    });
    if let Some(part) = stable_attr {
        return level(part, false);
    }

    let part = positional_part(ctx.tree, node);
    let positional = part != tag;
    level(part, positional)
}

/// Up to five levels of [`level_identifier`], then a retry with positions added.
fn stable_path(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let mut levels: Vec<PathLevel> = Vec::new();
    let mut current = Some(node);

    for _ in 0..STABLE_PATH_DEPTH {
        let Some(level) = current else { break };
        levels.insert(0, level_identifier(ctx, level));

        let query = join_levels(&levels, |l| l.part.clone());
        if levels.len() > 1 && ctx.oracle.is_unique_match(&query, node) {
            return Some(query);
        }
        current = ctx.tree.parent_element(level);
    }

    let base = join_levels(&levels, |l| l.part.clone());
    if ctx.oracle.is_unique_match(&base, node) {
        return Some(base);
    }

    let positioned = join_levels(&levels, |l| {
        if l.positional {
            l.part.clone()
        } else {
            with_type_index(ctx.tree, l.node, &l.part)
        }
    });
    ctx.accept(positioned, node)
}

fn join_levels(levels: &[PathLevel], part: impl Fn(&PathLevel) -> String) -> String {
    levels.iter().map(part).collect::<Vec<_>>().join(" ")
}
