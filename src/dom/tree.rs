use crate::dom::dom_model::{Dom, NodeId};
use crate::error::Result;

/// Read-only view of a document that selector generation runs against.
///
/// `Dom` implements it; a live-browser backend can implement it too. Sibling helpers
/// are defined in terms of `parent_element`, so the root element has no siblings.
pub trait DocumentTree {
    /// Lowercase tag name, `None` for non-element nodes.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Class tokens in source order.
    fn class_list(&self, node: NodeId) -> Vec<&str>;

    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    fn element_children(&self, node: NodeId) -> Vec<NodeId>;

    fn text_content(&self, node: NodeId) -> String;

    /// Every element in the document matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>>;

    /// Identity of the current document contents, if the backend can compute one.
    fn fingerprint(&self) -> Option<String> {
        None
    }

    fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id").filter(|id| !id.is_empty())
    }

    fn sibling_elements(&self, node: NodeId) -> Vec<NodeId> {
        self.parent_element(node)
            .map(|parent| self.element_children(parent))
            .unwrap_or_default()
    }

    /// 1-based position among all element siblings.
    fn child_position(&self, node: NodeId) -> Option<usize> {
        self.sibling_elements(node)
            .iter()
            .position(|s| *s == node)
            .map(|p| p + 1)
    }

    fn siblings_of_type(&self, node: NodeId) -> Vec<NodeId> {
        let Some(tag) = self.tag_name(node) else {
            return Vec::new();
        };
        self.sibling_elements(node)
            .into_iter()
            .filter(|s| self.tag_name(*s) == Some(tag))
            .collect()
    }
}

impl DocumentTree for Dom {
    fn tag_name(&self, node: NodeId) -> Option<&str> {
        Dom::tag_name(self, node)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        Dom::attr(self, node, name)
    }

    fn class_list(&self, node: NodeId) -> Vec<&str> {
        Dom::class_list(self, node)
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        Dom::parent_element(self, node)
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        Dom::element_children(self, node)
    }

    fn text_content(&self, node: NodeId) -> String {
        Dom::text_content(self, node)
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        Dom::query_selector_all(self, selector)
    }

    fn fingerprint(&self) -> Option<String> {
        Some(Dom::fingerprint(self))
    }
}
