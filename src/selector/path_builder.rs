use crate::dom::{DocumentTree, NodeId};
use crate::selector::fragments::positional_part;

pub const ABSOLUTE_PATH_DEPTH: usize = 5;

/// Ancestor chain of at most five levels, positional where a tag is shared.
///
/// Always produces a query that matches `node`; it may match other elements too.
pub fn build_unique_path(tree: &dyn DocumentTree, node: NodeId) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(ABSOLUTE_PATH_DEPTH);
    let mut current = Some(node);

    while let Some(level) = current {
        if parts.len() == ABSOLUTE_PATH_DEPTH || tree.tag_name(level).is_none() {
            break;
        }
        parts.push(positional_part(tree, level));
        current = tree.parent_element(level);
    }

    parts.reverse();
    parts.join(" ")
}
