//! Geteilte Typen: Modell-Optionen und Präferenzen.

pub mod options;
pub mod preferences;

pub use options::ModelOptions;
pub use options::{HISTORY_DEPTH, NEW_LAYER_NAME};
pub use preferences::{MemoryPreferences, Preferences, TomlPreferences, ACTIVE_LAYER};
