//! Clipboard: Copy/Cut/Paste/Delete/Select-All pro Ressourcen-Art.
//!
//! Der Dispatcher wählt den Handler anhand der zuerst selektierten ID;
//! Paste wählt ihn anhand der Art des Clipboard-Inhalts.

use super::model::DocumentModel;
use crate::core::{FeatureId, ResourceId, ResourceKind};
use crate::geojson::write_feature;
use crate::io::LayerDocument;
use anyhow::Result;
use std::collections::HashMap;

/// Inhalt des Clipboards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContent {
    /// Serialisierte Features (inklusive `layerId`)
    Features(Vec<String>),
    /// Layer-Dokumente (Name + Inhalt)
    Layers(Vec<LayerDocument>),
}

impl ClipboardContent {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ClipboardContent::Features(_) => ResourceKind::Feature,
            ClipboardContent::Layers(_) => ResourceKind::Layer,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ClipboardContent::Features(features) => features.is_empty(),
            ClipboardContent::Layers(layers) => layers.is_empty(),
        }
    }
}

/// Clipboard-Operationen einer Ressourcen-Art. Alle Methoden sind No-ops,
/// solange ein Handler sie nicht überschreibt.
pub trait ClipboardHandler {
    /// IDs, die "Alles auswählen" selektiert.
    fn select_all(&self, _model: &DocumentModel) -> Vec<ResourceId> {
        Vec::new()
    }

    fn copy(&self, _model: &DocumentModel) -> Result<Option<ClipboardContent>> {
        Ok(None)
    }

    fn cut(&self, _model: &mut DocumentModel) -> Result<Option<ClipboardContent>> {
        Ok(None)
    }

    fn paste(&self, _model: &mut DocumentModel, _content: &ClipboardContent) -> Result<()> {
        Ok(())
    }

    fn delete(&self, _model: &mut DocumentModel) -> Result<()> {
        Ok(())
    }
}

/// Feature-Handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureClipboard;

impl FeatureClipboard {
    fn serialize(model: &DocumentModel, ids: &[FeatureId]) -> Result<Vec<String>> {
        ids.iter()
            .filter_map(|id| model.store().feature(*id))
            .map(write_feature)
            .collect()
    }
}

impl ClipboardHandler for FeatureClipboard {
    /// Alle entsperrten, sichtbaren Features.
    fn select_all(&self, model: &DocumentModel) -> Vec<ResourceId> {
        model
            .features()
            .filter(|feature| feature.is_unlocked() && feature.is_showing())
            .map(|feature| ResourceId::Feature(feature.id))
            .collect()
    }

    /// Kopieren erlaubt auch gesperrte Features.
    fn copy(&self, model: &DocumentModel) -> Result<Option<ClipboardContent>> {
        let ids = model.selection().selected_features();
        let features = Self::serialize(model, &ids)?;
        Ok(Some(ClipboardContent::Features(features)))
    }

    /// Ausschneiden nur für die löschbare Selektion.
    fn cut(&self, model: &mut DocumentModel) -> Result<Option<ClipboardContent>> {
        let ids = model.deletable_selection();
        let features = Self::serialize(model, &ids)?;
        model.remove_features(&ids)?;
        Ok(Some(ClipboardContent::Features(features)))
    }

    fn paste(&self, model: &mut DocumentModel, content: &ClipboardContent) -> Result<()> {
        if let ClipboardContent::Features(features) = content {
            model.add_features(features)?;
        }
        Ok(())
    }

    fn delete(&self, model: &mut DocumentModel) -> Result<()> {
        let ids = model.deletable_selection();
        model.remove_features(&ids)
    }
}

/// Layer-Handler. Außer Paste wirken alle Operationen nur auf den zuerst
/// selektierten Layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerClipboard;

impl ClipboardHandler for LayerClipboard {
    fn copy(&self, model: &DocumentModel) -> Result<Option<ClipboardContent>> {
        let Some(layer_id) = model.selection().selected_layers().first().copied() else {
            return Ok(None);
        };
        Ok(model
            .layer_document(layer_id)?
            .map(|document| ClipboardContent::Layers(vec![document])))
    }

    /// Der aktive Layer wird nicht entfernt, sein Inhalt aber trotzdem geliefert.
    fn cut(&self, model: &mut DocumentModel) -> Result<Option<ClipboardContent>> {
        let Some(layer_id) = model.selection().selected_layers().first().copied() else {
            return Ok(None);
        };
        let Some(document) = model.layer_document(layer_id)? else {
            return Ok(None);
        };

        if model.active_layer().is_some_and(|layer| layer.id == layer_id) {
            log::warn!("Aktiver Layer '{}' wird nicht entfernt", document.name);
        } else {
            model.remove_layer(layer_id)?;
        }
        Ok(Some(ClipboardContent::Layers(vec![document])))
    }

    /// Legt immer neue Layer mit disambiguierten Namen an.
    fn paste(&self, model: &mut DocumentModel, content: &ClipboardContent) -> Result<()> {
        if let ClipboardContent::Layers(documents) = content {
            for document in documents {
                model.write_layer(document.clone())?;
            }
        }
        Ok(())
    }

    fn delete(&self, model: &mut DocumentModel) -> Result<()> {
        let Some(layer_id) = model.selection().selected_layers().first().copied() else {
            return Ok(());
        };
        if model.active_layer().is_some_and(|layer| layer.id == layer_id) {
            log::warn!("Aktiver Layer wird nicht gelöscht");
            return Ok(());
        }
        model.remove_layer(layer_id)
    }
}

/// Dispatcher mit Handler-Registry und Zwischenablage.
#[derive(Default)]
pub struct Clipboard {
    handlers: HashMap<ResourceKind, Box<dyn ClipboardHandler>>,
    content: Option<ClipboardContent>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard mit den Handlern für Features und Layer.
    pub fn with_model_handlers() -> Self {
        let mut clipboard = Self::new();
        clipboard.register_handler(ResourceKind::Feature, Box::new(FeatureClipboard));
        clipboard.register_handler(ResourceKind::Layer, Box::new(LayerClipboard));
        clipboard
    }

    /// Registriert (oder ersetzt) den Handler für eine Ressourcen-Art.
    pub fn register_handler(&mut self, kind: ResourceKind, handler: Box<dyn ClipboardHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// Aktueller Inhalt der Zwischenablage.
    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    pub fn set_content(&mut self, content: ClipboardContent) {
        self.content = Some(content);
    }

    fn handler_for_selection(&self, model: &DocumentModel) -> Option<&dyn ClipboardHandler> {
        let kind = model.selection().first()?.kind();
        self.handlers.get(&kind).map(|handler| handler.as_ref())
    }

    /// Selektiert alles, was der Handler der aktuellen Selektion liefert.
    /// Ohne Selektion gilt der Feature-Handler.
    pub fn select_all(&self, model: &mut DocumentModel) -> usize {
        let kind = model
            .selection()
            .first()
            .map_or(ResourceKind::Feature, |id| id.kind());
        let Some(handler) = self.handlers.get(&kind) else {
            return 0;
        };
        let ids = handler.select_all(model);
        let count = ids.len();
        model.select(ids);
        count
    }

    /// Kopiert die Selektion in die Zwischenablage.
    pub fn copy(&mut self, model: &DocumentModel) -> Result<()> {
        let Some(handler) = self.handler_for_selection(model) else {
            return Ok(());
        };
        if let Some(content) = handler.copy(model)? {
            self.content = Some(content);
        }
        Ok(())
    }

    /// Schneidet die Selektion aus.
    pub fn cut(&mut self, model: &mut DocumentModel) -> Result<()> {
        let Some(handler) = self.handler_for_selection(model) else {
            return Ok(());
        };
        if let Some(content) = handler.cut(model)? {
            self.content = Some(content);
        }
        Ok(())
    }

    /// Fügt den Inhalt der Zwischenablage über den passenden Handler ein.
    pub fn paste(&self, model: &mut DocumentModel) -> Result<()> {
        let Some(content) = self.content.as_ref().filter(|content| !content.is_empty()) else {
            return Ok(());
        };
        match self.handlers.get(&content.kind()) {
            Some(handler) => handler.paste(model, content),
            None => Ok(()),
        }
    }

    pub fn delete(&self, model: &mut DocumentModel) -> Result<()> {
        match self.handler_for_selection(model) {
            Some(handler) => handler.delete(model),
            None => Ok(()),
        }
    }
}
