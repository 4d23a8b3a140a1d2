use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dom::dom_model::{Dom, NodeId};
use crate::error::{Result, SelectorError};

/// One node of a serialized document, as emitted by a browser-side extraction script.
///
/// Element nodes carry `tag`; text nodes carry only `text`. `text` on an element is
/// shorthand for a single leading text child.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

/// Accepts either a single root node or an array of top-level nodes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Single(SnapshotNode),
    Many(Vec<SnapshotNode>),
}

pub fn load_snapshot(json: &str) -> Result<Dom> {
    let document: SnapshotDocument =
        serde_json::from_str(json).map_err(|source| SelectorError::SnapshotParse {
            context: "document snapshot".into(),
            source,
        })?;

    let roots = match document {
        SnapshotDocument::Single(node) => vec![node],
        SnapshotDocument::Many(nodes) => nodes,
    };

    let mut dom = Dom::new();
    let root = dom.root();
    // Explicit work stack keeps deeply nested snapshots off the call stack.
    let mut pending: Vec<(NodeId, &SnapshotNode)> = roots.iter().rev().map(|n| (root, n)).collect();

    while let Some((parent, node)) = pending.pop() {
        match &node.tag {
            Some(tag) => {
                if tag.trim().is_empty() {
                    return Err(SelectorError::InvalidSnapshot("element with empty tag".into()));
                }
                let attrs = node
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                    .collect();
                let element = dom.create_element(parent, tag.trim(), attrs);
                if let Some(text) = &node.text {
                    dom.create_text(element, text);
                }
                pending.extend(node.children.iter().rev().map(|child| (element, child)));
            }
            None => {
                if let Some(text) = &node.text {
                    dom.create_text(parent, text);
                }
            }
        }
    }

    Ok(dom)
}
