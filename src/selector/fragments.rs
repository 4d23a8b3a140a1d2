//! Building blocks for candidate queries. Every emitted name and value is escaped.

use crate::dom::{DocumentTree, NodeId, css_escape};
use crate::selector::classifier::{is_meaningful_class, is_stable_class};

pub fn tag_of(tree: &dyn DocumentTree, node: NodeId) -> String {
    tree.tag_name(node).map(css_escape).unwrap_or_default()
}

pub fn id_selector(id: &str) -> String {
    format!("#{}", css_escape(id))
}

/// `tag.a.b`, or the bare tag without classes.
pub fn class_compound(tag: &str, classes: &[&str]) -> String {
    let mut out = tag.to_string();
    for class in classes {
        out.push('.');
        out.push_str(&css_escape(class));
    }
    out
}

/// `[name="value"]`
pub fn attr_equals(name: &str, value: &str) -> String {
    format!("[{}=\"{}\"]", css_escape(name), css_escape(value))
}

pub fn descendant(ancestor: &str, target: &str) -> String {
    format!("{} {}", ancestor, target)
}

pub fn meaningful_classes(tree: &dyn DocumentTree, node: NodeId, limit: usize) -> Vec<&str> {
    tree.class_list(node)
        .into_iter()
        .filter(|c| is_meaningful_class(c))
        .take(limit)
        .collect()
}

pub fn first_stable_class(tree: &dyn DocumentTree, node: NodeId) -> Option<&str> {
    tree.class_list(node).into_iter().find(|c| is_stable_class(c))
}

/// Short context segment for a parent: tag plus its first stable class.
pub fn parent_identifier(tree: &dyn DocumentTree, parent: NodeId) -> String {
    let tag = tag_of(tree, parent);
    match first_stable_class(tree, parent) {
        Some(class) => class_compound(&tag, &[class]),
        None => tag,
    }
}

/// Tag plus first meaningful class of the element two levels up, if any.
pub fn grandparent_qualifier(tree: &dyn DocumentTree, node: NodeId) -> Option<String> {
    let grandparent = tree.parent_element(tree.parent_element(node)?)?;
    let class = meaningful_classes(tree, grandparent, 1).into_iter().next()?;
    Some(class_compound(&tag_of(tree, grandparent), &[class]))
}

/// 1-based index among same-tag siblings, only when that tag is shared.
pub fn shared_type_index(tree: &dyn DocumentTree, node: NodeId) -> Option<usize> {
    let siblings = tree.siblings_of_type(node);
    if siblings.len() < 2 {
        return None;
    }
    siblings.iter().position(|s| *s == node).map(|p| p + 1)
}

/// `tag:nth-of-type(k)` when siblings share the tag, else the bare tag.
pub fn positional_part(tree: &dyn DocumentTree, node: NodeId) -> String {
    let tag = tag_of(tree, node);
    match shared_type_index(tree, node) {
        Some(index) => format!("{}:nth-of-type({})", tag, index),
        None => tag,
    }
}

/// Appends `:nth-of-type(k)` to an existing segment when siblings share the tag.
pub fn with_type_index(tree: &dyn DocumentTree, node: NodeId, part: &str) -> String {
    match shared_type_index(tree, node) {
        Some(index) => format!("{}:nth-of-type({})", part, index),
        None => part.to_string(),
    }
}
