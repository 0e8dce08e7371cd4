//! Application-Layer: Document Model, Commands, Events, History und Clipboard.

pub mod clipboard;
pub mod commands;
pub mod events;
pub mod history;
pub mod model;
pub mod selection;
/// Modell-Zustand
///
/// Bestand, Selektion, Gateways und Event-Bus, auf die alle Commands wirken.
pub mod state;

pub use clipboard::{
    Clipboard, ClipboardContent, ClipboardHandler, FeatureClipboard, LayerClipboard,
};
pub use commands::{GeometryMap, LayerCommand, LayerMutation, LayerRestore};
pub use events::{EventBus, ModelEvent, Reducer, ReducerId};
pub use history::{Command, UndoStack};
pub use model::DocumentModel;
pub use selection::Selection;
pub use state::ModelState;
