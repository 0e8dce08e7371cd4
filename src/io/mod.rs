//! Persistenz-Gateway für Layer-Dokumente.
//!
//! Ein Layer entspricht genau einem Dokument, adressiert über den Layer-Namen.
//! Der Inhalt ist für das Gateway opak (GeoJSON-Text).

mod directory;
mod memory;

pub use directory::DirectoryIo;
pub use memory::MemoryIo;

use anyhow::Result;

/// Name und Inhalt eines persistierten Layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDocument {
    pub name: String,
    pub contents: String,
}

impl LayerDocument {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Lesender und schreibender Zugriff auf persistierte Layer.
pub trait LayerIo {
    /// Listet alle persistierten Layer (beim Start).
    fn load_layers(&self) -> Result<Vec<LayerDocument>>;

    /// Liest den Inhalt eines Layers.
    fn read_layer(&self, name: &str) -> Result<String>;

    /// Legt einen neuen Layer an. Ein vorhandenes Dokument gleichen Namens
    /// wird nicht überschrieben.
    fn create_layer(&mut self, name: &str, contents: &str) -> Result<()>;

    /// Schreibt (oder überschreibt) einen Layer.
    fn write_layer(&mut self, name: &str, contents: &str) -> Result<()>;

    /// Benennt einen Layer um; das Ziel darf noch nicht existieren.
    fn rename_layer(&mut self, prev_name: &str, next_name: &str) -> Result<()>;

    /// Löscht einen Layer.
    fn delete_layer(&mut self, name: &str) -> Result<()>;
}
