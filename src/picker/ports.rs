//! Side effects of an interactive picking session, injected by the host.

use tracing::info;

use crate::dom::NodeId;
use crate::error::Result;

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Hover outline on elements. Implementations restore the element's own styling on removal.
pub trait Highlighter {
    fn highlight(&mut self, node: NodeId);
    fn unhighlight(&mut self, node: NodeId);
    fn clear(&mut self);
}

/// Keeps the last written text; used when no system clipboard is available.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Routes notifications to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        info!("{}", message);
    }
}

/// Tracks which nodes are outlined without rendering anything.
#[derive(Debug, Default)]
pub struct OutlineTracker {
    pub outlined: Vec<NodeId>,
}

impl Highlighter for OutlineTracker {
    fn highlight(&mut self, node: NodeId) {
        if !self.outlined.contains(&node) {
            self.outlined.push(node);
        }
    }

    fn unhighlight(&mut self, node: NodeId) {
        self.outlined.retain(|n| *n != node);
    }

    fn clear(&mut self) {
        self.outlined.clear();
    }
}
