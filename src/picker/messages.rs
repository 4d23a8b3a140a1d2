//! Request/response protocol between a host UI and the picker session.

use serde::{Deserialize, Serialize};

use crate::dom::{DocumentTree, NodeId};
use crate::error::SelectorError;
use crate::picker::ports::{Clipboard, Highlighter, Notifier};
use crate::picker::session::{PickedSelector, PickerSession, PickerState};
use crate::picker::settings::SettingsUpdate;
use crate::selector::generator::SelectorGenerator;
use crate::selector::selector_model::StrategyKind;

/// Elements are addressed by a query; the first match is the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PickerRequest {
    StartPicking {
        #[serde(default)]
        settings: SettingsUpdate,
    },
    StopPicking,
    UpdateSettings {
        #[serde(default)]
        settings: SettingsUpdate,
    },
    /// One-off generation, independent of picking mode.
    GenerateSelector { target: String },
    Hover { target: String },
    HoverOut { target: String },
    Click { target: String },
    /// Right click.
    Cancel,
    GetCurrentSelector,
    SaveCurrentSelector { selector: String },
    GetState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PickerResponse {
    Started,
    Stopped,
    Ok,
    #[serde(rename_all = "camelCase")]
    SelectorGenerated {
        selector: String,
        strategy: StrategyKind,
        match_count: usize,
    },
    SelectorCancelled,
    #[serde(rename_all = "camelCase")]
    CurrentSelector {
        selector: Option<PickedSelector>,
    },
    State {
        state: PickerState,
    },
    Ignored,
    Error {
        error: String,
    },
}

impl PickerResponse {
    fn error(err: impl ToString) -> Self {
        PickerResponse::Error {
            error: err.to_string(),
        }
    }
}

fn resolve_target(tree: &dyn DocumentTree, target: &str) -> Result<NodeId, SelectorError> {
    tree.query_selector_all(target)?
        .into_iter()
        .next()
        .ok_or_else(|| SelectorError::ElementNotFound {
            target: target.to_string(),
            context: "no element matches".into(),
        })
}

impl<C: Clipboard, N: Notifier, H: Highlighter> PickerSession<C, N, H> {
    pub fn dispatch(&mut self, tree: &dyn DocumentTree, request: &PickerRequest) -> PickerResponse {
        match request {
            PickerRequest::StartPicking { settings } => {
                self.start(settings);
                PickerResponse::Started
            }
            PickerRequest::StopPicking => {
                self.stop();
                PickerResponse::Stopped
            }
            PickerRequest::UpdateSettings { settings } => {
                self.update_settings(settings);
                PickerResponse::Ok
            }
            PickerRequest::GenerateSelector { target } => {
                let node = match resolve_target(tree, target) {
                    Ok(node) => node,
                    Err(e) => return PickerResponse::error(e),
                };
                SelectorGenerator::with_config(tree, self.generator_config().clone())
                    .generate(node)
                    .map(|generated| PickerResponse::SelectorGenerated {
                        selector: generated.selector,
                        strategy: generated.strategy,
                        match_count: generated.match_count,
                    })
                    .unwrap_or_else(|| PickerResponse::error("target is not an element"))
            }
            PickerRequest::Hover { target } => match resolve_target(tree, target) {
                Ok(node) => {
                    self.hover(node);
                    PickerResponse::Ok
                }
                Err(e) => PickerResponse::error(e),
            },
            PickerRequest::HoverOut { target } => match resolve_target(tree, target) {
                Ok(node) => {
                    self.hover_out(node);
                    PickerResponse::Ok
                }
                Err(e) => PickerResponse::error(e),
            },
            PickerRequest::Click { target } => {
                let node = match resolve_target(tree, target) {
                    Ok(node) => node,
                    Err(e) => return PickerResponse::error(e),
                };
                match self.click(tree, node) {
                    Some(picked) => PickerResponse::SelectorGenerated {
                        selector: picked.selector,
                        strategy: picked.strategy.unwrap_or(StrategyKind::AbsolutePath),
                        match_count: picked.match_count.unwrap_or_default(),
                    },
                    None => PickerResponse::Ignored,
                }
            }
            PickerRequest::Cancel => {
                if self.cancel() {
                    PickerResponse::SelectorCancelled
                } else {
                    PickerResponse::Ignored
                }
            }
            PickerRequest::GetCurrentSelector => PickerResponse::CurrentSelector {
                selector: self.current_selector_for(tree).cloned(),
            },
            PickerRequest::SaveCurrentSelector { selector } => {
                self.save_selector(selector.clone());
                PickerResponse::Ok
            }
            PickerRequest::GetState => PickerResponse::State {
                state: self.state(),
            },
        }
    }
}
