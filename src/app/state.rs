//! Modell-Zustand: Bestand, Selektion, Gateways und Event-Bus.

use super::events::{EventBus, ModelEvent};
use super::selection::Selection;
use crate::core::{LayerId, LayerStore};
use crate::geojson::write_features;
use crate::io::LayerIo;
use crate::shared::Preferences;
use anyhow::{Context, Result};
use indexmap::IndexSet;

/// Alles, worauf Commands wirken.
///
/// Der Bestand ist nach außen nur lesbar; Mutationen laufen über
/// `LayerCommand`/`LayerMutation`.
pub struct ModelState {
    pub(crate) store: LayerStore,
    pub(crate) selection: Selection,
    pub(crate) io: Box<dyn LayerIo>,
    pub(crate) preferences: Box<dyn Preferences>,
    pub(crate) events: EventBus,
}

impl ModelState {
    /// Erstellt einen leeren Zustand über den angegebenen Gateways.
    pub fn new(io: Box<dyn LayerIo>, preferences: Box<dyn Preferences>) -> Self {
        Self {
            store: LayerStore::new(),
            selection: Selection::new(),
            io,
            preferences,
            events: EventBus::new(),
        }
    }

    /// Layer- und Feature-Bestand (nur lesend).
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Aktuelle Selektion.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Persistenz-Gateway (nur lesend).
    pub fn io(&self) -> &dyn LayerIo {
        self.io.as_ref()
    }

    /// Präferenzen (nur lesend).
    pub fn preferences(&self) -> &dyn Preferences {
        self.preferences.as_ref()
    }

    /// Vollständiger Zustand als `Snapshot`-Event.
    pub fn snapshot(&self) -> ModelEvent {
        ModelEvent::Snapshot {
            layers: self.store.layer_views(),
            features: self.store.features().cloned().collect(),
        }
    }

    pub(crate) fn emit(&mut self, event: ModelEvent) {
        self.events.emit(event);
    }

    /// Schreibt die aktuellen Features der angegebenen Layer zurück.
    /// Nicht (mehr) existierende Layer werden übersprungen.
    pub(crate) fn write_layers(
        &mut self,
        layer_ids: impl IntoIterator<Item = LayerId>,
    ) -> Result<()> {
        let layer_ids: IndexSet<LayerId> = layer_ids.into_iter().collect();
        for layer_id in layer_ids {
            let Some(layer) = self.store.layer(layer_id) else {
                continue;
            };
            let name = layer.name.clone();
            let contents = write_features(self.store.layer_features(layer_id))
                .with_context(|| format!("Layer '{}' nicht serialisierbar", name))?;
            self.io
                .write_layer(&name, &contents)
                .with_context(|| format!("Layer '{}' nicht speicherbar", name))?;
            log::debug!("Layer '{}' gespeichert", name);
        }
        Ok(())
    }
}
