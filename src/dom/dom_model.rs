use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag_name: String,
    pub attrs: HashMap<String, String>,
}

impl Element {
    pub fn new(tag_name: &str, attrs: HashMap<String, String>) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Class tokens in source order, duplicates dropped (DOMTokenList semantics).
    pub fn class_list(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(raw) = self.attr("class") {
            for token in raw.split_ascii_whitespace() {
                if !out.contains(&token) {
                    out.push(token);
                }
            }
        }
        out
    }
}

/// Arena-backed document tree. Nodes are never removed, so a `NodeId` stays valid
/// for the lifetime of the `Dom` that issued it.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id.0)
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent_id.0) {
                parent_node.children.push(id);
            }
        }
        id
    }

    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        self.create_node(Some(parent), NodeType::Element(Element::new(tag_name, attrs)))
    }

    pub fn create_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text.to_string()))
    }

    pub fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.node(node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some()
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.element(node_id)?.attr(name)
    }

    pub fn class_list(&self, node_id: NodeId) -> Vec<&str> {
        self.element(node_id)
            .map(Element::class_list)
            .unwrap_or_default()
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.node(node_id)?.parent
    }

    /// Parent only when it is an element; the document node is not a parent element.
    pub fn parent_element(&self, node_id: NodeId) -> Option<NodeId> {
        self.parent(node_id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.node(node_id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, node_id: NodeId) -> Vec<NodeId> {
        self.children(node_id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Element children of this node's parent (including the node itself).
    pub fn element_siblings(&self, node_id: NodeId) -> Vec<NodeId> {
        match self.parent(node_id) {
            Some(parent) => self.element_children(parent),
            None => Vec::new(),
        }
    }

    pub fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let siblings = self.element_siblings(node_id);
        let pos = siblings.iter().position(|s| *s == node_id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Element siblings sharing this node's tag, in document order.
    pub fn same_tag_siblings(&self, node_id: NodeId) -> Vec<NodeId> {
        let Some(tag) = self.tag_name(node_id) else {
            return Vec::new();
        };
        self.element_siblings(node_id)
            .into_iter()
            .filter(|s| self.tag_name(*s) == Some(tag))
            .collect()
    }

    /// 1-based index among same-tag siblings (the `:nth-of-type` index).
    pub fn index_of_type(&self, node_id: NodeId) -> Option<usize> {
        self.same_tag_siblings(node_id)
            .iter()
            .position(|s| *s == node_id)
            .map(|p| p + 1)
    }

    pub fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            match &node.node_type {
                NodeType::Text(text) => out.push_str(text),
                NodeType::Document | NodeType::Element(_) => {
                    stack.extend(node.children.iter().rev().copied());
                }
            }
        }
        out
    }

    /// All elements in document (pre-order) order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    pub fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            if self.is_element(current) {
                out.push(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
    }

    /// Stable digest of the tree's structure, attributes and text.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha1::new();
        let mut stack = vec![(self.root, false)];
        while let Some((current, closing)) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if closing {
                hasher.update(b"}");
                continue;
            }
            match &node.node_type {
                NodeType::Document => hasher.update(b"#document{"),
                NodeType::Text(text) => {
                    hasher.update(b"#text:");
                    hasher.update(text.as_bytes());
                    hasher.update(b"\n");
                    continue;
                }
                NodeType::Element(element) => {
                    let mut attrs: Vec<_> = element.attrs.iter().collect();
                    attrs.sort();
                    hasher.update(element.tag_name.as_bytes());
                    for (key, value) in attrs {
                        hasher.update(format!("[{}={:?}]", key, value).as_bytes());
                    }
                    hasher.update(b"{");
                }
            }
            stack.push((current, true));
            for child in node.children.iter().rev() {
                stack.push((*child, false));
            }
        }
        format!("{:x}", hasher.finalize())
    }
}
