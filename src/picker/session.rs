use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dom::{DocumentTree, NodeId};
use crate::picker::ports::{Clipboard, Highlighter, Notifier};
use crate::picker::settings::{PickerSettings, SettingsUpdate};
use crate::selector::generator::SelectorGenerator;
use crate::selector::selector_model::{GeneratorConfig, StrategyKind};
use crate::trace::{SelectorTraceEvent, TraceLogger};

/// The last selector handed to the user, kept for redisplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedSelector {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_fingerprint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerState {
    pub is_picking_mode: bool,
    pub settings: PickerSettings,
    pub current_selector: Option<String>,
}

/// Interactive picking: hover outlines, click to generate, right-click to cancel.
///
/// Owned by the host. The generator itself stays stateless; everything that outlives a
/// single click lives here.
pub struct PickerSession<C, N, H> {
    settings: PickerSettings,
    generator_config: GeneratorConfig,
    picking: bool,
    current: Option<PickedSelector>,
    trace: TraceLogger,
    clipboard: C,
    notifier: N,
    highlighter: H,
}

impl<C: Clipboard, N: Notifier, H: Highlighter> PickerSession<C, N, H> {
    pub fn new(settings: PickerSettings, clipboard: C, notifier: N, highlighter: H) -> Self {
        Self {
            settings,
            generator_config: GeneratorConfig::default(),
            picking: false,
            current: None,
            trace: TraceLogger::disabled(),
            clipboard,
            notifier,
            highlighter,
        }
    }

    pub fn with_generator_config(mut self, config: GeneratorConfig) -> Self {
        self.generator_config = config;
        self
    }

    pub fn with_trace(mut self, trace: TraceLogger) -> Self {
        self.trace = trace;
        self
    }

    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    pub fn generator_config(&self) -> &GeneratorConfig {
        &self.generator_config
    }

    pub fn is_picking(&self) -> bool {
        self.picking
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn highlighter(&self) -> &H {
        &self.highlighter
    }

    fn announce(&mut self, message: &str) {
        if self.settings.show_notification {
            self.notifier.notify(message);
        }
    }

    pub fn update_settings(&mut self, update: &SettingsUpdate) {
        if update.is_empty() {
            return;
        }
        self.settings.merge(update);
        if !self.settings.show_highlight {
            self.highlighter.clear();
        }
    }

    pub fn start(&mut self, update: &SettingsUpdate) {
        self.update_settings(update);
        self.picking = true;
        debug!(settings = ?self.settings, "picking mode started");
        self.announce("Picking mode started, click an element to generate its selector");
    }

    pub fn stop(&mut self) {
        self.picking = false;
        self.highlighter.clear();
        debug!("picking mode stopped");
    }

    pub fn hover(&mut self, node: NodeId) {
        if self.picking && self.settings.show_highlight {
            self.highlighter.highlight(node);
        }
    }

    pub fn hover_out(&mut self, node: NodeId) {
        if self.picking {
            self.highlighter.unhighlight(node);
        }
    }

    /// Right click: leaves picking mode. Returns whether a session was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.picking {
            return false;
        }
        self.stop();
        self.announce("Picking cancelled");
        true
    }

    /// Generates and caches the selector for a clicked element.
    pub fn click(&mut self, tree: &dyn DocumentTree, node: NodeId) -> Option<PickedSelector> {
        if !self.picking {
            return None;
        }

        let generator = SelectorGenerator::with_config(tree, self.generator_config.clone());
        let generated = generator.generate(node)?;
        let fingerprint = tree.fingerprint();

        let tag = tree.tag_name(node).unwrap_or_default();
        self.trace.log(
            &SelectorTraceEvent::now(tag, &generated)
                .with_fingerprint(fingerprint.clone())
                .with_source("picker"),
        );

        let picked = PickedSelector {
            selector: generated.selector.clone(),
            strategy: Some(generated.strategy),
            match_count: Some(generated.match_count),
            document_fingerprint: fingerprint,
        };
        self.current = Some(picked.clone());

        if self.settings.auto_copy {
            if let Err(e) = self.clipboard.write_text(&generated.selector) {
                warn!("could not copy selector: {}", e);
            }
        }

        let message = if generated.match_count == 1 {
            format!("{} selector generated: {}", generated.strategy, generated.selector)
        } else {
            format!(
                "{} selector generated (matches {} elements): {}",
                generated.strategy, generated.match_count, generated.selector
            )
        };
        self.announce(&message);

        Some(picked)
    }

    pub fn current_selector(&self) -> Option<&PickedSelector> {
        self.current.as_ref()
    }

    /// The cached selector, unless it was picked on a document that has since changed.
    pub fn current_selector_for(&self, tree: &dyn DocumentTree) -> Option<&PickedSelector> {
        let current = self.current.as_ref()?;
        match (&current.document_fingerprint, tree.fingerprint()) {
            (Some(picked_on), Some(now)) if *picked_on != now => None,
            _ => Some(current),
        }
    }

    /// Replaces the cached selector with one edited by the user.
    pub fn save_selector(&mut self, selector: impl Into<String>) {
        self.current = Some(PickedSelector {
            selector: selector.into(),
            strategy: None,
            match_count: None,
            document_fingerprint: None,
        });
    }

    pub fn state(&self) -> PickerState {
        PickerState {
            is_picking_mode: self.picking,
            settings: self.settings,
            current_selector: self.current.as_ref().map(|c| c.selector.clone()),
        }
    }
}
