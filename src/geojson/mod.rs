//! GeoJSON Import/Export für Layer-Dokumente.
//!
//! Ein Layer-Dokument ist eine `FeatureCollection`. Einzelne Features
//! (Clipboard-Inhalte) werden als `Feature`-Objekt serialisiert.

pub mod parser;
pub mod writer;

pub use parser::{read_feature, read_features};
pub use writer::{write_feature, write_features, EMPTY_COLLECTION};
