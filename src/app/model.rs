//! Document Model: öffentliche API über Layer, Features, Undo und Events.
//!
//! Jede Funktion baut einen Command (oder eine nicht rückgängig machbare
//! Mutation) und wendet ihn auf den `ModelState` an. Events werden dabei nur
//! eingeplant; Reducer sehen sie erst nach `dispatch_pending`.

use super::commands::{GeometryMap, LayerCommand, LayerMutation};
use super::events::{ModelEvent, ReducerId};
use super::history::UndoStack;
use super::selection::Selection;
use super::state::ModelState;
use crate::core::{
    Feature, FeatureId, Layer, LayerId, LayerStore, LayerView, Properties, ResourceId,
};
use crate::geojson::{read_feature, EMPTY_COLLECTION};
use crate::io::{LayerDocument, LayerIo};
use crate::shared::{ModelOptions, Preferences};
use anyhow::{Context, Result};

/// Das Layer/Feature-Modell eines Projekts.
pub struct DocumentModel {
    state: ModelState,
    history: UndoStack<LayerCommand>,
    options: ModelOptions,
}

impl DocumentModel {
    /// Erstellt ein leeres Modell ohne persistierte Layer zu lesen.
    pub fn new(
        io: Box<dyn LayerIo>,
        preferences: Box<dyn Preferences>,
        options: ModelOptions,
    ) -> Self {
        Self {
            state: ModelState::new(io, preferences),
            history: UndoStack::new_with_capacity(options.history_depth),
            options,
        }
    }

    /// Erstellt das Modell und lädt alle persistierten Layer.
    ///
    /// Nicht lesbare Dokumente werden übersprungen. Der Layer, dessen Name in
    /// der `activeLayer`-Präferenz steht, wird aktiv.
    pub fn load(
        io: Box<dyn LayerIo>,
        preferences: Box<dyn Preferences>,
        options: ModelOptions,
    ) -> Result<Self> {
        let mut model = Self::new(io, preferences, options);
        let documents = model
            .state
            .io
            .load_layers()
            .context("Layer konnten nicht geladen werden")?;
        LayerMutation::Load { documents }.apply(&mut model.state)?;
        Ok(model)
    }

    // ── Reducer ──────────────────────────────────────────────────────

    /// Registriert einen Reducer. Sein erstes Event ist ein `Snapshot` des
    /// aktuellen Zustands.
    pub fn register(&mut self, reducer: impl FnMut(&ModelEvent) + 'static) -> ReducerId {
        let snapshot = self.state.snapshot();
        self.state.events.register(Box::new(reducer), snapshot)
    }

    /// Meldet einen Reducer ab.
    pub fn deregister(&mut self, reducer: ReducerId) -> bool {
        self.state.events.deregister(reducer)
    }

    /// Stellt alle eingeplanten Events zu.
    pub fn dispatch_pending(&mut self) -> usize {
        self.state.events.dispatch_pending()
    }

    // ── Features ─────────────────────────────────────────────────────

    /// Löscht Features (rückgängig machbar). Leere Eingabe ist ein No-op.
    pub fn remove_features(&mut self, ids: &[FeatureId]) -> Result<()> {
        let command = LayerCommand::delete_features(&self.state, ids);
        if matches!(&command, LayerCommand::DeleteFeatures { features } if features.is_empty()) {
            return Ok(());
        }
        self.history.apply_and_push(&mut self.state, command)
    }

    /// Fügt serialisierte Features (Clipboard-Inhalt) ein.
    ///
    /// Ziel ist der aktive Layer; ohne aktiven Layer der Herkunfts-Layer des
    /// Features, sofern er noch existiert. Sonst wird das Feature verworfen.
    pub fn add_features(&mut self, content: &[String]) -> Result<Vec<FeatureId>> {
        let active = self.state.store.active_layer().map(|layer| layer.id);

        let mut features: Vec<Feature> = Vec::with_capacity(content.len());
        for json in content {
            let parsed = match read_feature(json) {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::warn!("Feature nicht einfügbar: {:#}", e);
                    continue;
                }
            };
            let target = active.or_else(|| {
                parsed
                    .origin_layer
                    .filter(|layer_id| self.state.store.layer(*layer_id).is_some())
            });
            match target {
                Some(layer_id) => features.push(parsed.into_feature(layer_id)),
                None => log::warn!("Feature verworfen: kein aktiver Layer und kein Herkunfts-Layer"),
            }
        }

        if features.is_empty() {
            return Ok(Vec::new());
        }
        let ids = features.iter().map(|feature| feature.id).collect();
        self.history
            .apply_and_push(&mut self.state, LayerCommand::InsertFeatures { features })?;
        Ok(ids)
    }

    /// Übernimmt geänderte Geometrien (rückgängig machbar).
    ///
    /// `initial` enthält die Geometrien vor der Bearbeitung, `current` die neuen.
    pub fn update_geometries(&mut self, initial: GeometryMap, current: GeometryMap) -> Result<()> {
        if current.is_empty() {
            return Ok(());
        }
        self.history.apply_and_push(
            &mut self.state,
            LayerCommand::UpdateGeometries { initial, current },
        )
    }

    /// Sichtbare Properties eines Features (ohne interne Keys).
    pub fn feature_properties(&self, feature_id: FeatureId) -> Option<Properties> {
        self.state
            .store
            .feature(feature_id)
            .map(|feature| feature.properties.clone())
    }

    /// Ersetzt die sichtbaren Properties eines Features.
    ///
    /// Interne Keys in der Eingabe werden ignoriert; fehlende oder `null`-Werte
    /// entfernen die Property.
    pub fn update_feature_properties(
        &mut self,
        feature_id: FeatureId,
        properties: Properties,
    ) -> Result<()> {
        LayerMutation::UpdateProperties {
            feature_id,
            properties,
        }
        .apply(&mut self.state)
    }

    // ── Layer ────────────────────────────────────────────────────────

    /// Sperrt bzw. entsperrt alle Features eines Layers.
    pub fn toggle_layer_lock(&mut self, layer_id: LayerId) -> Result<()> {
        LayerMutation::ToggleLock(layer_id).apply(&mut self.state)
    }

    /// Versteckt bzw. zeigt alle Features eines Layers.
    pub fn toggle_layer_show(&mut self, layer_id: LayerId) -> Result<()> {
        LayerMutation::ToggleShow(layer_id).apply(&mut self.state)
    }

    /// Macht den Layer zum aktiven Layer (verweigert bei gesperrt/versteckt).
    pub fn activate_layer(&mut self, layer_id: LayerId) -> Result<()> {
        LayerMutation::Activate(layer_id).apply(&mut self.state)
    }

    pub fn deactivate_layer(&mut self, layer_id: LayerId) -> Result<()> {
        LayerMutation::Deactivate(layer_id).apply(&mut self.state)
    }

    /// Benennt einen Layer um (rückgängig machbar).
    ///
    /// Der Name wird gegen alle anderen Layer disambiguiert; der eigene
    /// Name ist ein No-op.
    pub fn rename_layer(&mut self, layer_id: LayerId, name: &str) -> Result<()> {
        let Some(layer) = self.state.store.layer(layer_id) else {
            log::debug!("Umbenennen ignoriert: Layer {} unbekannt", layer_id);
            return Ok(());
        };
        let next_name = self
            .state
            .store
            .disambiguate_layer_name_except(name, layer_id);
        if next_name == layer.name {
            return Ok(());
        }

        let command = LayerCommand::RenameLayer {
            layer_id,
            prev_name: layer.name.clone(),
            next_name,
        };
        self.history.apply_and_push(&mut self.state, command)
    }

    /// Entfernt einen Layer samt Features und Dokument (rückgängig machbar).
    pub fn remove_layer(&mut self, layer_id: LayerId) -> Result<()> {
        match LayerCommand::unlink_layer(&self.state, layer_id)? {
            Some(command) => self.history.apply_and_push(&mut self.state, command),
            None => Ok(()),
        }
    }

    /// Legt einen leeren Layer an.
    pub fn create_layer(&mut self) -> Result<LayerId> {
        let name = self.options.new_layer_name.clone();
        self.write_layer(LayerDocument::new(name, EMPTY_COLLECTION))
    }

    /// Kopiert einen Layer unter neuem Namen. `None` für unbekannte Layer.
    pub fn duplicate_layer(&mut self, layer_id: LayerId) -> Result<Option<LayerId>> {
        let Some(document) = self.layer_document(layer_id)? else {
            return Ok(None);
        };
        self.write_layer(document).map(Some)
    }

    /// Legt einen Layer aus einem Dokument an; der Name wird disambiguiert.
    pub fn write_layer(&mut self, document: LayerDocument) -> Result<LayerId> {
        let layer_id = LayerId::generate();
        let command = LayerCommand::write_layer(layer_id, document.name, document.contents);
        self.history.apply_and_push(&mut self.state, command)?;
        Ok(layer_id)
    }

    /// Persistiertes Dokument eines Layers.
    pub fn layer_document(&self, layer_id: LayerId) -> Result<Option<LayerDocument>> {
        let Some(layer) = self.state.store.layer(layer_id) else {
            return Ok(None);
        };
        let contents = self
            .state
            .io
            .read_layer(&layer.name)
            .with_context(|| format!("Layer '{}' nicht lesbar", layer.name))?;
        Ok(Some(LayerDocument::new(layer.name.clone(), contents)))
    }

    /// Layer-Ansicht inklusive abgeleiteter Flags.
    pub fn layer_properties(&self, layer_id: LayerId) -> Option<LayerView> {
        self.state.store.layer_view(layer_id)
    }

    // ── Undo/Redo ────────────────────────────────────────────────────

    /// Macht den letzten Schritt rückgängig. `Ok(false)` wenn nichts zu tun ist.
    pub fn undo(&mut self) -> Result<bool> {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.history.redo(&mut self.state)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ── Selektion ────────────────────────────────────────────────────

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn select<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<ResourceId>,
    {
        self.state.selection.select(ids);
    }

    pub fn deselect<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<ResourceId>,
    {
        self.state.selection.deselect(ids);
    }

    /// Ersetzt die gesamte Selektion.
    pub fn set_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<ResourceId>,
    {
        self.state.selection.clear();
        self.state.selection.select(ids);
    }

    /// Selektierte Features, die weder gesperrt noch versteckt sind.
    pub fn deletable_selection(&self) -> Vec<FeatureId> {
        self.selected_features_where(|feature| feature.is_showing() && feature.is_unlocked())
    }

    /// Selektierte Features, die gesperrt oder versteckt sind. Sie dürfen in
    /// der Layer-Liste selektiert sein, aber nicht auf der Karte.
    pub fn special_selection(&self) -> Vec<FeatureId> {
        self.selected_features_where(Feature::is_hidden_or_locked)
    }

    fn selected_features_where(&self, predicate: impl Fn(&Feature) -> bool) -> Vec<FeatureId> {
        self.state
            .selection
            .selected_features()
            .into_iter()
            .filter_map(|id| self.state.store.feature(id))
            .filter(|feature| predicate(feature))
            .map(|feature| feature.id)
            .collect()
    }

    /// Klick auf die Karte: hebt die Selektion gesperrter/versteckter Features auf.
    pub fn map_clicked(&mut self) {
        let special = self.special_selection();
        if !special.is_empty() {
            log::debug!("{} gesperrte/versteckte Features deselektiert", special.len());
        }
        self.state.selection.deselect(special);
    }

    // ── Lesezugriff ──────────────────────────────────────────────────

    pub fn store(&self) -> &LayerStore {
        &self.state.store
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.state.store.layers()
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.state.store.features()
    }

    /// Layer per Name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.state.store.layer_by_name(name)
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.state.store.active_layer()
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Geometry;
    use crate::io::MemoryIo;
    use crate::shared::{MemoryPreferences, ACTIVE_LAYER};
    use glam::DVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    const ROADS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"name":"a"}},
        {"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{"name":"b"}}
    ]}"#;

    fn model_with(documents: &[(&str, &str)]) -> (DocumentModel, MemoryIo, MemoryPreferences) {
        let io = MemoryIo::with_documents(documents.iter().copied());
        let preferences = MemoryPreferences::new();
        let model = DocumentModel::load(
            Box::new(io.clone()),
            Box::new(preferences.clone()),
            ModelOptions::default(),
        )
        .unwrap();
        (model, io, preferences)
    }

    fn layer_id(model: &DocumentModel, name: &str) -> LayerId {
        model.layer(name).unwrap().id
    }

    #[test]
    fn create_layer_uses_configured_name_and_disambiguates() {
        let (mut model, io, _) = model_with(&[]);
        model.create_layer().unwrap();
        model.create_layer().unwrap();

        let names: Vec<&str> = model.layers().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["New Layer", "New Layer (1)"]);
        assert_eq!(io.document("New Layer").as_deref(), Some(EMPTY_COLLECTION));
    }

    #[test]
    fn duplicate_layer_copies_features() {
        let (mut model, _, _) = model_with(&[("Roads", ROADS)]);
        let copy = model
            .duplicate_layer(layer_id(&model, "Roads"))
            .unwrap()
            .unwrap();

        assert_eq!(model.store().layer(copy).unwrap().name, "Roads (1)");
        assert_eq!(model.store().layer_features(copy).count(), 2);
        assert_eq!(model.duplicate_layer(LayerId::generate()).unwrap(), None);
    }

    #[test]
    fn remove_layer_undo_redo() {
        let (mut model, io, _) = model_with(&[("Roads", ROADS)]);
        let roads = layer_id(&model, "Roads");
        let before = model.store().clone();

        model.remove_layer(roads).unwrap();
        assert_eq!(model.store().layer_count(), 0);
        assert!(io.document("Roads").is_none());

        assert!(model.undo().unwrap());
        assert_eq!(*model.store(), before);
        assert!(io.document("Roads").is_some());

        assert!(model.redo().unwrap());
        assert_eq!(model.store().layer_count(), 0);
    }

    #[test]
    fn rename_to_own_name_is_noop_and_taken_name_is_disambiguated() {
        let (mut model, io, _) = model_with(&[("Roads", ROADS), ("Lakes", EMPTY_COLLECTION)]);
        let roads = layer_id(&model, "Roads");

        model.rename_layer(roads, "Roads").unwrap();
        assert!(!model.can_undo());

        model.rename_layer(roads, "Lakes").unwrap();
        assert_eq!(model.store().layer(roads).unwrap().name, "Lakes (1)");
        assert!(io.document("Lakes (1)").is_some());

        model.undo().unwrap();
        assert_eq!(model.store().layer(roads).unwrap().name, "Roads");
        assert!(io.document("Roads").is_some());
    }

    #[test]
    fn add_features_targets_active_layer() {
        let (mut model, _, preferences) = model_with(&[("Roads", ROADS), ("Lakes", EMPTY_COLLECTION)]);
        let roads = layer_id(&model, "Roads");
        let lakes = layer_id(&model, "Lakes");
        model.activate_layer(lakes).unwrap();
        assert_eq!(preferences.get(ACTIVE_LAYER).as_deref(), Some("Lakes"));

        let source = model.store().layer_features(roads).next().unwrap().clone();
        let json = crate::geojson::write_feature(&source).unwrap();
        let ids = model.add_features(&[json]).unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].layer_id(), lakes);
        assert_eq!(model.store().layer_features(lakes).count(), 1);
    }

    #[test]
    fn add_features_without_active_layer_uses_origin() {
        let (mut model, _, _) = model_with(&[("Roads", ROADS)]);
        let roads = layer_id(&model, "Roads");
        let source = model.store().layer_features(roads).next().unwrap().clone();
        let json = crate::geojson::write_feature(&source).unwrap();

        let ids = model.add_features(&[json.clone()]).unwrap();
        assert_eq!(ids[0].layer_id(), roads);
        assert_ne!(ids[0], source.id);

        model.remove_layer(roads).unwrap();
        assert!(model.add_features(&[json]).unwrap().is_empty());
    }

    #[test]
    fn update_geometries_undo_restores_initial() {
        let (mut model, _, _) = model_with(&[("Roads", ROADS)]);
        let feature = model.features().next().unwrap().clone();
        let initial = feature.geometry.clone().unwrap();
        let moved = initial.translated(DVec2::new(5.0, 5.0));

        model
            .update_geometries(
                GeometryMap::from([(feature.id, initial.clone())]),
                GeometryMap::from([(feature.id, moved.clone())]),
            )
            .unwrap();
        assert_eq!(
            model.store().feature(feature.id).unwrap().geometry,
            Some(moved)
        );

        model.undo().unwrap();
        assert_eq!(
            model.store().feature(feature.id).unwrap().geometry,
            Some(initial)
        );
    }

    #[test]
    fn map_clicked_deselects_hidden_and_locked_features() {
        let (mut model, _, _) = model_with(&[("Roads", ROADS), ("Lakes", ROADS)]);
        let roads = layer_id(&model, "Roads");
        let lakes = layer_id(&model, "Lakes");
        let all: Vec<FeatureId> = model.features().map(|f| f.id).collect();

        model.toggle_layer_lock(roads).unwrap();
        model.select(all.clone());
        assert_eq!(model.special_selection().len(), 2);
        assert_eq!(model.deletable_selection().len(), 2);

        model.map_clicked();
        assert_eq!(model.selection().selected_features().len(), 2);
        assert!(model
            .selection()
            .selected_features()
            .iter()
            .all(|id| id.layer_id() == lakes));
    }

    #[test]
    fn events_are_queued_until_dispatch() {
        let (mut model, _, _) = model_with(&[("Roads", ROADS)]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model.register(move |event| sink.borrow_mut().push(event.kind()));

        model.create_layer().unwrap();
        assert!(seen.borrow().is_empty());

        assert_eq!(model.dispatch_pending(), 2);
        assert_eq!(*seen.borrow(), vec!["snapshot", "layeradded"]);
    }

    #[test]
    fn feature_properties_hide_internal_flags() {
        let (mut model, _, _) = model_with(&[("Roads", ROADS)]);
        let roads = layer_id(&model, "Roads");
        model.toggle_layer_show(roads).unwrap();

        let feature = model.features().next().unwrap().id;
        let properties = model.feature_properties(feature).unwrap();
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["name"]);
        assert!(model.layer_properties(roads).unwrap().hidden);
        assert!(model.feature_properties(FeatureId::generate(roads)).is_none());
        assert!(matches!(
            model.store().feature(feature).unwrap().geometry,
            Some(Geometry::Point(_))
        ));
    }
}
