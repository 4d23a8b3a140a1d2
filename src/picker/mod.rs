pub mod messages;
pub mod ports;
pub mod session;
pub mod settings;

pub use messages::{PickerRequest, PickerResponse};
pub use ports::{Clipboard, Highlighter, LogNotifier, MemoryClipboard, Notifier, OutlineTracker};
pub use session::{PickedSelector, PickerSession, PickerState};
pub use settings::{PickerSettings, SettingsUpdate};
