//! In-Memory-Gateway (Tests, Headless-Betrieb).

use super::{LayerDocument, LayerIo};
use anyhow::{bail, Result};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Gateway ohne Dateisystem.
///
/// Klone teilen sich denselben Speicher, damit Tests nach der Übergabe an das
/// Modell weiterhin den persistierten Zustand prüfen können.
#[derive(Debug, Clone, Default)]
pub struct MemoryIo {
    documents: Rc<RefCell<IndexMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryIo {
    /// Erstellt ein leeres Gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt ein Gateway mit vorhandenen Dokumenten.
    pub fn with_documents<I, N, C>(documents: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let io = Self::new();
        io.documents.borrow_mut().extend(
            documents
                .into_iter()
                .map(|(name, contents)| (name.into(), contents.into())),
        );
        io
    }

    /// Inhalt eines Dokuments (falls vorhanden).
    pub fn document(&self, name: &str) -> Option<String> {
        self.documents.borrow().get(name).cloned()
    }

    /// Namen aller Dokumente in Einfügereihenfolge.
    pub fn names(&self) -> Vec<String> {
        self.documents.borrow().keys().cloned().collect()
    }

    /// Lässt alle schreibenden Operationen fehlschlagen (Fehlerpfade testen).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.get() {
            bail!("Schreibzugriff verweigert");
        }
        Ok(())
    }
}

impl LayerIo for MemoryIo {
    fn load_layers(&self) -> Result<Vec<LayerDocument>> {
        Ok(self
            .documents
            .borrow()
            .iter()
            .map(|(name, contents)| LayerDocument::new(name.clone(), contents.clone()))
            .collect())
    }

    fn read_layer(&self, name: &str) -> Result<String> {
        match self.documents.borrow().get(name) {
            Some(contents) => Ok(contents.clone()),
            None => bail!("Layer '{}' nicht gefunden", name),
        }
    }

    fn create_layer(&mut self, name: &str, contents: &str) -> Result<()> {
        self.check_writable()?;
        let mut documents = self.documents.borrow_mut();
        if documents.contains_key(name) {
            bail!("Layer '{}' existiert bereits", name);
        }
        documents.insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn write_layer(&mut self, name: &str, contents: &str) -> Result<()> {
        self.check_writable()?;
        self.documents
            .borrow_mut()
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn rename_layer(&mut self, prev_name: &str, next_name: &str) -> Result<()> {
        self.check_writable()?;
        let mut documents = self.documents.borrow_mut();
        if documents.contains_key(next_name) {
            bail!("Layer '{}' existiert bereits", next_name);
        }
        let Some(contents) = documents.shift_remove(prev_name) else {
            bail!("Layer '{}' nicht gefunden", prev_name);
        };
        documents.insert(next_name.to_string(), contents);
        Ok(())
    }

    fn delete_layer(&mut self, name: &str) -> Result<()> {
        self.check_writable()?;
        if self.documents.borrow_mut().shift_remove(name).is_none() {
            bail!("Layer '{}' nicht gefunden", name);
        }
        Ok(())
    }
}
