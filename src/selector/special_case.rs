//! Element kinds that need bespoke handling before the general cascade.

use crate::dom::{DocumentTree, NodeId, css_escape};
use crate::selector::classifier::{is_dynamic_id, is_stable_identifier};
use crate::selector::fragments::{
    attr_equals, class_compound, descendant, first_stable_class, id_selector, parent_identifier,
    tag_of,
};
use crate::selector::selector_model::StrategyKind;
use crate::selector::strategies::StrategyContext;

const SEMANTIC_ATTRIBUTES: [&str; 4] = ["role", "aria-label", "title", "alt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCase {
    DateInput,
    DynamicId,
}

impl SpecialCase {
    pub fn kind(&self) -> StrategyKind {
        match self {
            SpecialCase::DateInput => StrategyKind::DateInput,
            SpecialCase::DynamicId => StrategyKind::DynamicId,
        }
    }

    pub fn resolve(&self, ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
        match self {
            SpecialCase::DateInput => date_input(ctx, node),
            SpecialCase::DynamicId => dynamic_id(ctx, node),
        }
    }
}

/// Date controls first, then elements carrying a generated-looking id.
pub fn detect(tree: &dyn DocumentTree, node: NodeId) -> Option<SpecialCase> {
    let is_date = tree
        .attr(node, "type")
        .is_some_and(|t| t.eq_ignore_ascii_case("date"));
    if is_date {
        return Some(SpecialCase::DateInput);
    }

    tree.id(node)
        .filter(|id| is_dynamic_id(id))
        .map(|_| SpecialCase::DynamicId)
}

fn date_input(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let tag = tag_of(ctx.tree, node);

    if let Some(name) = ctx.tree.attr(node, "name").filter(|n| !n.is_empty()) {
        if let Some(query) = ctx.accept(format!("{}{}", tag, attr_equals("name", name)), node) {
            return Some(query);
        }
    }

    if let Some(fragment) = ctx
        .tree
        .attr(node, "placeholder")
        .and_then(|placeholder| date_marker_in(placeholder, &ctx.config.date_placeholder_markers))
    {
        let query = format!("{}[placeholder*=\"{}\"]", tag, css_escape(fragment));
        if let Some(query) = ctx.accept(query, node) {
            return Some(query);
        }
    }

    if let Some(target) = find_associated_label(ctx.tree, node)
        .and_then(|label| ctx.tree.attr(label, "for"))
        .filter(|target| !target.is_empty())
    {
        if let Some(query) = ctx.accept(id_selector(target), node) {
            return Some(query);
        }
    }

    let parent = ctx.tree.parent_element(node)?;
    let class = first_stable_class(ctx.tree, parent)?;
    let input_type = ctx.tree.attr(node, "type")?;
    let scope = class_compound(&tag_of(ctx.tree, parent), &[class]);
    let query = descendant(&scope, &format!("{}{}", tag, attr_equals("type", input_type)));
    ctx.accept(query, node)
}

/// The part of `placeholder` matching the first marker it contains, in the placeholder's casing.
pub fn date_marker_in<'p>(placeholder: &'p str, markers: &[String]) -> Option<&'p str> {
    let haystack = placeholder.to_ascii_lowercase();
    markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .find_map(|marker| {
            let start = haystack.find(&marker.to_ascii_lowercase())?;
            placeholder.get(start..start + marker.len())
        })
}

/// `label[for=<id>]`, else an enclosing label, else a sibling label.
pub fn find_associated_label(tree: &dyn DocumentTree, node: NodeId) -> Option<NodeId> {
    let id = tree.id(node)?;

    let query = format!("label{}", attr_equals("for", id));
    if let Some(label) = tree
        .query_selector_all(&query)
        .ok()
        .and_then(|labels| labels.into_iter().next())
    {
        return Some(label);
    }

    let mut ancestor = tree.parent_element(node);
    while let Some(current) = ancestor {
        if tree.tag_name(current) == Some("label") {
            return Some(current);
        }
        ancestor = tree.parent_element(current);
    }

    tree.sibling_elements(node)
        .into_iter()
        .find(|sibling| tree.tag_name(*sibling) == Some("label"))
}

fn dynamic_id(ctx: &StrategyContext<'_>, node: NodeId) -> Option<String> {
    let tag = tag_of(ctx.tree, node);

    if let Some(name) = ctx.tree.attr(node, "name") {
        if is_stable_identifier(Some(name)) {
            if let Some(query) = ctx.accept(format!("{}{}", tag, attr_equals("name", name)), node) {
                return Some(query);
            }
        }
    }

    if let Some(parent) = ctx.tree.parent_element(node) {
        let scope = parent_identifier(ctx.tree, parent);
        let positioned = ctx.tree.child_position(node).and_then(|index| {
            let step = format!("{}:nth-child({})", tag, index);
            ctx.accept(descendant(&scope, &step), node)
        });
        if let Some(query) = positioned.or_else(|| ctx.accept(descendant(&scope, &tag), node)) {
            return Some(query);
        }
    }

    SEMANTIC_ATTRIBUTES.iter().find_map(|name| {
        let value = ctx.tree.attr(node, name)?;
        if !is_stable_identifier(Some(value)) {
            return None;
        }
        ctx.accept(format!("{}{}", tag, attr_equals(name, value)), node)
    })
}
