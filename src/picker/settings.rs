use serde::{Deserialize, Serialize};

/// Picker behavior toggles. YAML uses snake_case, messages use camelCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerSettings {
    #[serde(default = "default_true", alias = "autoCopy")]
    pub auto_copy: bool,

    #[serde(default = "default_true", alias = "showHighlight")]
    pub show_highlight: bool,

    #[serde(default = "default_true", alias = "showNotification")]
    pub show_notification: bool,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            auto_copy: true,
            show_highlight: true,
            show_notification: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Partial settings carried by `startPicking` / `updateSettings`; absent fields keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_copy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_highlight: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_notification: Option<bool>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.auto_copy.is_none() && self.show_highlight.is_none() && self.show_notification.is_none()
    }
}

impl PickerSettings {
    pub fn merge(&mut self, update: &SettingsUpdate) {
        if let Some(value) = update.auto_copy {
            self.auto_copy = value;
        }
        if let Some(value) = update.show_highlight {
            self.show_highlight = value;
        }
        if let Some(value) = update.show_notification {
            self.show_notification = value;
        }
    }
}
