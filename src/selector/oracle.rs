use tracing::trace;

use crate::dom::{DocumentTree, NodeId};

/// Evaluates candidate queries against the whole document.
///
/// A query the engine cannot parse is reported as "not unique"; the error never
/// leaves this type.
pub struct UniquenessOracle<'a> {
    tree: &'a dyn DocumentTree,
}

impl<'a> UniquenessOracle<'a> {
    pub fn new(tree: &'a dyn DocumentTree) -> Self {
        Self { tree }
    }

    fn evaluate(&self, query: &str) -> Option<Vec<NodeId>> {
        match self.tree.query_selector_all(query) {
            Ok(matches) => Some(matches),
            Err(err) => {
                trace!(query, error = %err, "candidate query rejected by engine");
                None
            }
        }
    }

    /// Number of matches, `None` when the query is not valid.
    pub fn match_count(&self, query: &str) -> Option<usize> {
        self.evaluate(query).map(|matches| matches.len())
    }

    pub fn is_unique(&self, query: &str) -> bool {
        self.match_count(query) == Some(1)
    }

    /// Unique, and the single match is `node`.
    pub fn is_unique_match(&self, query: &str, node: NodeId) -> bool {
        self.evaluate(query)
            .is_some_and(|matches| matches.len() == 1 && matches[0] == node)
    }
}
