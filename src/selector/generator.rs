use tracing::debug;

use crate::dom::{DocumentTree, NodeId};
use crate::selector::path_builder::build_unique_path;
use crate::selector::selector_model::{
    GeneratedSelector, GeneratorConfig, StrategyAttempt, StrategyKind,
};
use crate::selector::special_case::detect;
use crate::selector::strategies::{Strategy, StrategyContext};

/// Runs special cases, then the strategy cascade, then the absolute path.
///
/// Holds no state between calls; the same tree and element always give the same result.
pub struct SelectorGenerator<'a> {
    tree: &'a dyn DocumentTree,
    config: GeneratorConfig,
}

impl<'a> SelectorGenerator<'a> {
    pub fn new(tree: &'a dyn DocumentTree) -> Self {
        Self::with_config(tree, GeneratorConfig::default())
    }

    pub fn with_config(tree: &'a dyn DocumentTree, config: GeneratorConfig) -> Self {
        Self { tree, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// `None` only when `node` is not an element with a tag.
    pub fn generate(&self, node: NodeId) -> Option<GeneratedSelector> {
        let Some(tag) = self.tree.tag_name(node).filter(|t| !t.is_empty()) else {
            debug!(node = node.index(), "not an element, nothing to generate");
            return None;
        };
        debug!("Generating selector for <{}>", tag);

        let ctx = StrategyContext::new(self.tree, &self.config);
        let mut attempts = Vec::new();

        if let Some(case) = detect(self.tree, node) {
            let kind = case.kind();
            debug!("Trying special case: {}", kind);
            let selector = case.resolve(&ctx, node);
            attempts.push(StrategyAttempt {
                strategy: kind,
                selector: selector.clone(),
            });
            if let Some(selector) = selector {
                return Some(self.finish(&ctx, selector, kind, attempts));
            }
        }

        for strategy in Strategy::CASCADE {
            let kind = strategy.kind();
            debug!("Trying strategy: {}", kind);
            let selector = strategy.attempt(&ctx, node);
            attempts.push(StrategyAttempt {
                strategy: kind,
                selector: selector.clone(),
            });
            match selector {
                Some(selector) => return Some(self.finish(&ctx, selector, kind, attempts)),
                None => debug!("Strategy {} produced no unique selector", kind),
            }
        }

        debug!("All strategies exhausted, using absolute path");
        let selector = build_unique_path(self.tree, node);
        attempts.push(StrategyAttempt {
            strategy: StrategyKind::AbsolutePath,
            selector: Some(selector.clone()),
        });
        Some(self.finish(&ctx, selector, StrategyKind::AbsolutePath, attempts))
    }

    fn finish(
        &self,
        ctx: &StrategyContext<'_>,
        selector: String,
        strategy: StrategyKind,
        attempts: Vec<StrategyAttempt>,
    ) -> GeneratedSelector {
        let match_count = ctx.oracle.match_count(&selector).unwrap_or(0);
        debug!(
            "Generated selector using {} strategy: {} ({} match{})",
            strategy,
            selector,
            match_count,
            if match_count == 1 { "" } else { "es" }
        );
        GeneratedSelector {
            selector,
            strategy,
            match_count,
            attempts,
        }
    }
}

/// Selector for `node` with the default configuration, or `None` for a non-element.
pub fn generate_selector(tree: &dyn DocumentTree, node: NodeId) -> Option<String> {
    SelectorGenerator::new(tree)
        .generate(node)
        .map(|generated| generated.selector)
}
