//! Commands: der einzige Mutationspfad für Layer und Features.
//!
//! `LayerCommand` ist rückgängig machbar und läuft über den `UndoStack`.
//! `LayerMutation` wird nur angewendet (Lock/Hide, Aktivierung, Properties,
//! Start-Laden) und landet nie in der History.
//!
//! Reihenfolge innerhalb von `apply`: erst den Bestand vollständig mutieren,
//! dann Events einplanen, zuletzt persistieren.

use super::events::ModelEvent;
use super::history::Command;
use super::state::ModelState;
use crate::core::{is_internal_property, Feature, FeatureId, Geometry, Layer, LayerId, Properties};
use crate::geojson::read_features;
use crate::io::LayerDocument;
use crate::shared::ACTIVE_LAYER;
use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;

/// Geometrien pro Feature (Reihenfolge = Reihenfolge der Änderung).
pub type GeometryMap = IndexMap<FeatureId, Geometry>;

/// Beim Entfernen eines Layers gesicherter Zustand für die Wiederherstellung.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRestore {
    /// Features mit ihren ursprünglichen IDs
    pub features: Vec<Feature>,
    /// War der Layer aktiv?
    pub active: bool,
}

/// Rückgängig machbare Änderung am Layer-Modell.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerCommand {
    /// Features mit bereits vergebenen IDs einfügen
    InsertFeatures { features: Vec<Feature> },
    /// Features löschen (Klone vor dem Löschen gesichert)
    DeleteFeatures { features: Vec<Feature> },
    /// Geometrien auf `current` setzen
    UpdateGeometries {
        initial: GeometryMap,
        current: GeometryMap,
    },
    /// Layer (und Dokument) umbenennen
    RenameLayer {
        layer_id: LayerId,
        prev_name: String,
        next_name: String,
    },
    /// Neues Layer-Dokument schreiben und Layer anlegen
    WriteLayer {
        layer_id: LayerId,
        basename: String,
        contents: String,
        /// Gesetzt bei Wiederherstellung eines entfernten Layers
        restore: Option<LayerRestore>,
    },
    /// Layer-Dokument löschen und Layer samt Features entfernen
    UnlinkLayer {
        layer_id: LayerId,
        name: String,
        contents: String,
        features: Vec<Feature>,
        active: bool,
    },
}

impl LayerCommand {
    /// Löscht die angegebenen Features; unbekannte IDs werden ignoriert.
    pub fn delete_features(state: &ModelState, ids: &[FeatureId]) -> Self {
        let features = ids
            .iter()
            .filter_map(|id| state.store.feature(*id))
            .cloned()
            .collect();
        LayerCommand::DeleteFeatures { features }
    }

    /// Legt einen neuen Layer an.
    pub fn write_layer(
        layer_id: LayerId,
        basename: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        LayerCommand::WriteLayer {
            layer_id,
            basename: basename.into(),
            contents: contents.into(),
            restore: None,
        }
    }

    /// Entfernt einen Layer. Sichert dafür Dokument-Inhalt und Features.
    /// `None` wenn der Layer nicht existiert.
    pub fn unlink_layer(state: &ModelState, layer_id: LayerId) -> Result<Option<Self>> {
        let Some(layer) = state.store.layer(layer_id) else {
            return Ok(None);
        };
        let contents = state
            .io
            .read_layer(&layer.name)
            .with_context(|| format!("Layer '{}' nicht lesbar", layer.name))?;

        Ok(Some(LayerCommand::UnlinkLayer {
            layer_id,
            name: layer.name.clone(),
            contents,
            features: state.store.layer_features(layer_id).cloned().collect(),
            active: layer.active,
        }))
    }

    /// Kurzname für Logs.
    pub fn name(&self) -> &'static str {
        match self {
            LayerCommand::InsertFeatures { .. } => "insertFeatures",
            LayerCommand::DeleteFeatures { .. } => "deleteFeatures",
            LayerCommand::UpdateGeometries { .. } => "updateGeometries",
            LayerCommand::RenameLayer { .. } => "renameLayer",
            LayerCommand::WriteLayer { .. } => "writeLayer",
            LayerCommand::UnlinkLayer { .. } => "unlinkLayer",
        }
    }
}

impl Command<ModelState> for LayerCommand {
    fn apply(&self, state: &mut ModelState) -> Result<()> {
        log::debug!("apply {}", self.name());
        match self {
            LayerCommand::InsertFeatures { features } => insert_features(state, features),
            LayerCommand::DeleteFeatures { features } => delete_features(state, features),
            LayerCommand::UpdateGeometries { current, .. } => update_geometries(state, current),
            LayerCommand::RenameLayer {
                layer_id,
                prev_name,
                next_name,
            } => rename_layer(state, *layer_id, prev_name, next_name),
            LayerCommand::WriteLayer {
                layer_id,
                basename,
                contents,
                restore,
            } => write_layer(state, *layer_id, basename, contents, restore.as_ref()),
            LayerCommand::UnlinkLayer { layer_id, .. } => unlink_layer(state, *layer_id),
        }
    }

    fn inverse(&self, state: &ModelState) -> Result<Self> {
        Ok(match self {
            LayerCommand::InsertFeatures { features } => {
                let ids: Vec<FeatureId> = features.iter().map(|f| f.id).collect();
                LayerCommand::delete_features(state, &ids)
            }
            LayerCommand::DeleteFeatures { features } => LayerCommand::InsertFeatures {
                features: features.clone(),
            },
            LayerCommand::UpdateGeometries { initial, current } => {
                LayerCommand::UpdateGeometries {
                    initial: current.clone(),
                    current: initial.clone(),
                }
            }
            LayerCommand::RenameLayer {
                layer_id,
                prev_name,
                next_name,
            } => LayerCommand::RenameLayer {
                layer_id: *layer_id,
                prev_name: next_name.clone(),
                next_name: prev_name.clone(),
            },
            LayerCommand::WriteLayer { layer_id, .. } => {
                LayerCommand::unlink_layer(state, *layer_id)?
                    .ok_or_else(|| anyhow!("Layer {} existiert nicht mehr", layer_id))?
            }
            LayerCommand::UnlinkLayer {
                layer_id,
                name,
                contents,
                features,
                active,
            } => LayerCommand::WriteLayer {
                layer_id: *layer_id,
                basename: name.clone(),
                contents: contents.clone(),
                restore: Some(LayerRestore {
                    features: features.clone(),
                    active: *active,
                }),
            },
        })
    }
}

fn insert_features(state: &mut ModelState, features: &[Feature]) -> Result<()> {
    let added: Vec<Feature> = features
        .iter()
        .filter(|feature| state.store.insert_feature((*feature).clone()))
        .cloned()
        .collect();
    if added.is_empty() {
        return Ok(());
    }

    let layers: Vec<LayerId> = added.iter().map(Feature::layer_id).collect();
    state.emit(ModelEvent::FeaturesAdded {
        features: added,
        selected: true,
    });
    state.write_layers(layers)
}

fn delete_features(state: &mut ModelState, features: &[Feature]) -> Result<()> {
    let ids: Vec<FeatureId> = features.iter().map(|f| f.id).collect();
    state.selection.deselect(ids.iter().copied());

    let removed: Vec<FeatureId> = ids
        .into_iter()
        .filter(|id| state.store.remove_feature(*id).is_some())
        .collect();
    if removed.is_empty() {
        return Ok(());
    }

    let layers: Vec<LayerId> = removed.iter().map(|id| id.layer_id()).collect();
    state.emit(ModelEvent::FeaturesRemoved { ids: removed });
    state.write_layers(layers)
}

fn update_geometries(state: &mut ModelState, current: &GeometryMap) -> Result<()> {
    let mut updated = Vec::with_capacity(current.len());
    for (id, geometry) in current {
        if let Some(feature) = state.store.feature_mut(*id) {
            feature.geometry = Some(geometry.clone());
            updated.push((*id, geometry.clone()));
        }
    }
    if updated.is_empty() {
        return Ok(());
    }

    let layers: Vec<LayerId> = updated.iter().map(|(id, _)| id.layer_id()).collect();
    state.emit(ModelEvent::GeometriesUpdated {
        geometries: updated,
    });
    state.write_layers(layers)
}

fn rename_layer(
    state: &mut ModelState,
    layer_id: LayerId,
    prev_name: &str,
    next_name: &str,
) -> Result<()> {
    if state.store.layer(layer_id).is_none() {
        log::debug!("Umbenennen ignoriert: Layer {} unbekannt", layer_id);
        return Ok(());
    }

    state
        .io
        .rename_layer(prev_name, next_name)
        .with_context(|| format!("Layer '{}' nicht umbenennbar", prev_name))?;

    let mut active = false;
    if let Some(layer) = state.store.layer_mut(layer_id) {
        layer.name = next_name.to_string();
        active = layer.active;
    }

    state.emit(ModelEvent::LayerRenamed {
        layer_id,
        name: next_name.to_string(),
    });
    log::info!("Layer '{}' umbenannt in '{}'", prev_name, next_name);

    if active {
        state.preferences.set(ACTIVE_LAYER, next_name)?;
    }
    Ok(())
}

fn write_layer(
    state: &mut ModelState,
    layer_id: LayerId,
    basename: &str,
    contents: &str,
    restore: Option<&LayerRestore>,
) -> Result<()> {
    let name = state.store.disambiguate_layer_name(basename);
    let features: Vec<Feature> = match restore {
        Some(restore) => restore.features.clone(),
        None => read_features(contents)
            .with_context(|| format!("Layer '{}' nicht lesbar", name))?
            .into_iter()
            .map(|parsed| parsed.into_feature(layer_id))
            .collect(),
    };

    state
        .io
        .create_layer(&name, contents)
        .with_context(|| format!("Layer '{}' nicht speicherbar", name))?;

    state.store.insert_layer(Layer::new(layer_id, name.clone()));
    for feature in &features {
        state.store.insert_feature(feature.clone());
    }

    let activate =
        restore.is_some_and(|restore| restore.active) && state.store.active_layer().is_none();
    if activate {
        if let Some(layer) = state.store.layer_mut(layer_id) {
            layer.active = true;
        }
    }

    let Some(view) = state.store.layer_view(layer_id) else {
        return Ok(());
    };
    log::info!("Layer '{}' hinzugefügt ({} Features)", name, features.len());
    state.emit(ModelEvent::LayerAdded {
        layer: view,
        features,
    });

    if activate {
        state.preferences.set(ACTIVE_LAYER, &name)?;
    }
    Ok(())
}

fn unlink_layer(state: &mut ModelState, layer_id: LayerId) -> Result<()> {
    let Some(layer) = state.store.layer(layer_id) else {
        log::debug!("Entfernen ignoriert: Layer {} unbekannt", layer_id);
        return Ok(());
    };
    let name = layer.name.clone();

    state
        .io
        .delete_layer(&name)
        .with_context(|| format!("Layer '{}' nicht löschbar", name))?;

    let deactivated = clear_active(state, layer_id);
    let feature_ids: Vec<FeatureId> = state.store.layer_features(layer_id).map(|f| f.id).collect();
    state.selection.deselect(feature_ids);
    state.selection.deselect([layer_id]);
    state.store.remove_layer(layer_id);

    if deactivated {
        state.emit(ModelEvent::LayerDeactivated { layer_id });
    }
    state.emit(ModelEvent::LayerRemoved { layer_id });
    log::info!("Layer '{}' entfernt", name);

    if deactivated {
        state.preferences.remove(ACTIVE_LAYER)?;
    }
    Ok(())
}

/// Setzt den Layer inaktiv. `true` wenn er aktiv war.
fn clear_active(state: &mut ModelState, layer_id: LayerId) -> bool {
    match state.store.layer_mut(layer_id) {
        Some(layer) if layer.active => {
            layer.active = false;
            true
        }
        _ => false,
    }
}

/// Nicht rückgängig machbare Änderung am Layer-Modell.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerMutation {
    /// Persistierte Dokumente beim Start einlesen
    Load { documents: Vec<LayerDocument> },
    /// Alle Features des Layers sperren bzw. entsperren
    ToggleLock(LayerId),
    /// Alle Features des Layers verstecken bzw. zeigen
    ToggleShow(LayerId),
    /// Layer zum aktiven Layer machen
    Activate(LayerId),
    /// Aktiven Layer zurücksetzen
    Deactivate(LayerId),
    /// Sichtbare Properties eines Features ersetzen
    UpdateProperties {
        feature_id: FeatureId,
        properties: Properties,
    },
}

#[derive(Debug, Clone, Copy)]
enum LayerFlag {
    Locked,
    Hidden,
}

impl LayerMutation {
    /// Wendet die Änderung an.
    pub fn apply(&self, state: &mut ModelState) -> Result<()> {
        match self {
            LayerMutation::Load { documents } => load(state, documents),
            LayerMutation::ToggleLock(layer_id) => toggle_flag(state, *layer_id, LayerFlag::Locked),
            LayerMutation::ToggleShow(layer_id) => toggle_flag(state, *layer_id, LayerFlag::Hidden),
            LayerMutation::Activate(layer_id) => activate(state, *layer_id),
            LayerMutation::Deactivate(layer_id) => {
                if clear_active(state, *layer_id) {
                    state.emit(ModelEvent::LayerDeactivated {
                        layer_id: *layer_id,
                    });
                    state.preferences.remove(ACTIVE_LAYER)?;
                }
                Ok(())
            }
            LayerMutation::UpdateProperties {
                feature_id,
                properties,
            } => update_properties(state, *feature_id, properties),
        }
    }
}

fn load(state: &mut ModelState, documents: &[LayerDocument]) -> Result<()> {
    let active_name = state.preferences.get(ACTIVE_LAYER);

    for document in documents {
        let parsed = match read_features(&document.contents) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Layer '{}' übersprungen: {:#}", document.name, e);
                state.store.reserve_name(document.name.clone());
                continue;
            }
        };

        let layer_id = LayerId::generate();
        state
            .store
            .insert_layer(Layer::new(layer_id, document.name.clone()));
        let features: Vec<Feature> = parsed
            .into_iter()
            .map(|parsed| parsed.into_feature(layer_id))
            .collect();
        for feature in &features {
            state.store.insert_feature(feature.clone());
        }

        let activate = active_name.as_deref() == Some(document.name.as_str())
            && state.store.active_layer().is_none()
            && !state.store.is_layer_locked(layer_id)
            && !state.store.is_layer_hidden(layer_id);
        if activate {
            if let Some(layer) = state.store.layer_mut(layer_id) {
                layer.active = true;
            }
        }

        if let Some(view) = state.store.layer_view(layer_id) {
            state.emit(ModelEvent::LayerAdded {
                layer: view,
                features,
            });
        }
    }

    log::info!(
        "{} Layer mit {} Features geladen",
        state.store.layer_count(),
        state.store.feature_count()
    );
    Ok(())
}

fn toggle_flag(state: &mut ModelState, layer_id: LayerId, flag: LayerFlag) -> Result<()> {
    if state.store.layer(layer_id).is_none() {
        log::debug!("Umschalten ignoriert: Layer {} unbekannt", layer_id);
        return Ok(());
    }

    let set = match flag {
        LayerFlag::Locked => !state.store.is_layer_locked(layer_id),
        LayerFlag::Hidden => !state.store.is_layer_hidden(layer_id),
    };

    let mut feature_ids = Vec::new();
    for feature in state.store.layer_features_mut(layer_id) {
        match flag {
            LayerFlag::Locked => feature.locked = set,
            LayerFlag::Hidden => feature.hidden = set,
        }
        feature_ids.push(feature.id);
    }

    let deactivated = set && clear_active(state, layer_id);
    if set {
        state.selection.deselect(feature_ids);
    }

    if deactivated {
        state.emit(ModelEvent::LayerDeactivated { layer_id });
    }
    state.emit(match flag {
        LayerFlag::Locked => ModelEvent::LayerLocked {
            layer_id,
            locked: set,
        },
        LayerFlag::Hidden => ModelEvent::LayerHidden {
            layer_id,
            hidden: set,
        },
    });

    if deactivated {
        state.preferences.remove(ACTIVE_LAYER)?;
    }
    state.write_layers([layer_id])
}

fn activate(state: &mut ModelState, layer_id: LayerId) -> Result<()> {
    let Some(layer) = state.store.layer(layer_id) else {
        log::debug!("Aktivieren ignoriert: Layer {} unbekannt", layer_id);
        return Ok(());
    };
    if state.store.is_layer_locked(layer_id) || state.store.is_layer_hidden(layer_id) {
        log::warn!(
            "Layer '{}' ist gesperrt oder versteckt und kann nicht aktiviert werden",
            layer.name
        );
        return Ok(());
    }
    if layer.active {
        return Ok(());
    }
    let name = layer.name.clone();

    let mut previous = Vec::new();
    for layer in state.store.layers_mut() {
        if layer.active {
            previous.push(layer.id);
        }
        layer.active = layer.id == layer_id;
    }

    for previous_id in previous {
        state.emit(ModelEvent::LayerDeactivated {
            layer_id: previous_id,
        });
    }
    state.emit(ModelEvent::LayerActivated { layer_id });
    log::info!("Aktiver Layer: '{}'", name);

    state.preferences.set(ACTIVE_LAYER, &name)
}

fn update_properties(
    state: &mut ModelState,
    feature_id: FeatureId,
    properties: &Properties,
) -> Result<()> {
    let Some(feature) = state.store.feature_mut(feature_id) else {
        log::debug!("Properties ignoriert: Feature {} unbekannt", feature_id);
        return Ok(());
    };

    let next: Properties = properties
        .iter()
        .filter(|(key, value)| !is_internal_property(key) && !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    feature.properties = next.clone();

    state.emit(ModelEvent::FeaturePropertiesUpdated {
        feature_id,
        properties: next,
    });
    state.write_layers([feature_id.layer_id()])
}
