//! Input-Layer Dokumentmodell.
//! Layer/Feature-Bestand, Undo/Redo, Event-Fan-out und Clipboard als Library,
//! exportiert für Host-Anwendungen und Tests.

pub mod app;
pub mod core;
pub mod geojson;
pub mod io;
pub mod shared;

pub use app::{
    Clipboard, ClipboardContent, ClipboardHandler, DocumentModel, GeometryMap, ModelEvent,
    ReducerId, Selection,
};
pub use core::{
    disambiguate, Feature, FeatureId, Geometry, Layer, LayerId, LayerStore, LayerView,
    Position, Properties, ResourceId, ResourceKind,
};
pub use geojson::{read_feature, read_features, write_feature, write_features};
pub use io::{DirectoryIo, LayerDocument, LayerIo, MemoryIo};
pub use shared::{MemoryPreferences, ModelOptions, Preferences, TomlPreferences};
