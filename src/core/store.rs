//! Layer- und Feature-Bestand des Modells.
//!
//! Lesende Zugriffe sind öffentlich. Mutationen sind crate-intern und werden
//! ausschließlich aus den Commands (`app::commands`) heraus aufgerufen.

use super::{Feature, FeatureId, Layer, LayerId, LayerView};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;

/// Bestand aller Layer und Features, in Einfügereihenfolge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    layers: IndexMap<LayerId, Layer>,
    features: IndexMap<FeatureId, Feature>,
    /// Namen persistierter Dokumente, die nicht geladen werden konnten
    reserved_names: IndexSet<String>,
}

impl LayerStore {
    /// Erstellt einen leeren Bestand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alle Layer in Einfügereihenfolge.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Layer per ID.
    pub fn layer(&self, layer_id: LayerId) -> Option<&Layer> {
        self.layers.get(&layer_id)
    }

    /// Layer per Name (exakter Vergleich).
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.values().find(|layer| layer.name == name)
    }

    /// Der aktive Layer, falls vorhanden.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.values().find(|layer| layer.active)
    }

    /// Anzahl der Layer.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Alle Features in Einfügereihenfolge.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Feature per ID.
    pub fn feature(&self, feature_id: FeatureId) -> Option<&Feature> {
        self.features.get(&feature_id)
    }

    /// Anzahl der Features.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Alle Features eines Layers.
    pub fn layer_features(&self, layer_id: LayerId) -> impl Iterator<Item = &Feature> {
        self.features
            .values()
            .filter(move |feature| feature.layer_id() == layer_id)
    }

    /// Gesperrt, sobald mindestens ein Feature gesperrt ist.
    pub fn is_layer_locked(&self, layer_id: LayerId) -> bool {
        self.layer_features(layer_id).any(|f| f.locked)
    }

    /// Versteckt, sobald mindestens ein Feature versteckt ist.
    pub fn is_layer_hidden(&self, layer_id: LayerId) -> bool {
        self.layer_features(layer_id).any(|f| f.hidden)
    }

    /// Layer-Ansicht mit abgeleiteten `locked`/`hidden`-Flags.
    pub fn layer_view(&self, layer_id: LayerId) -> Option<LayerView> {
        let layer = self.layers.get(&layer_id)?;
        Some(LayerView {
            id: layer.id,
            name: layer.name.clone(),
            active: layer.active,
            locked: self.is_layer_locked(layer_id),
            hidden: self.is_layer_hidden(layer_id),
        })
    }

    /// Ansichten aller Layer.
    pub fn layer_views(&self) -> Vec<LayerView> {
        self.layers
            .keys()
            .filter_map(|id| self.layer_view(*id))
            .collect()
    }

    /// Namen nicht ladbarer Dokumente. Sie sind für neue Layer gesperrt.
    pub fn reserved_names(&self) -> impl Iterator<Item = &str> + Clone {
        self.reserved_names.iter().map(String::as_str)
    }

    /// Liefert einen unter allen Layern (und reservierten Namen) eindeutigen Namen.
    pub fn disambiguate_layer_name(&self, basename: &str) -> String {
        disambiguate(
            self.layers
                .values()
                .map(|l| l.name.as_str())
                .chain(self.reserved_names()),
            basename,
        )
    }

    /// Wie `disambiguate_layer_name`, ignoriert aber den angegebenen Layer
    /// (für Umbenennungen).
    pub fn disambiguate_layer_name_except(&self, basename: &str, except: LayerId) -> String {
        disambiguate(
            self.layers
                .values()
                .filter(|l| l.id != except)
                .map(|l| l.name.as_str())
                .chain(self.reserved_names()),
            basename,
        )
    }

    // ── Mutationen (nur für Commands) ─────────────────────────────────

    pub(crate) fn reserve_name(&mut self, name: impl Into<String>) {
        self.reserved_names.insert(name.into());
    }

    pub(crate) fn insert_layer(&mut self, layer: Layer) {
        self.layers.insert(layer.id, layer);
    }

    /// Entfernt den Layer samt aller seiner Features.
    pub(crate) fn remove_layer(&mut self, layer_id: LayerId) -> Option<Layer> {
        let removed = self.layers.shift_remove(&layer_id)?;
        self.features.retain(|_, f| f.layer_id() != layer_id);
        Some(removed)
    }

    pub(crate) fn layer_mut(&mut self, layer_id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&layer_id)
    }

    pub(crate) fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.values_mut()
    }

    /// Fügt ein Feature ein; verweigert Features ohne existierenden Layer.
    pub(crate) fn insert_feature(&mut self, feature: Feature) -> bool {
        if !self.layers.contains_key(&feature.layer_id()) {
            log::warn!(
                "Feature {} verworfen: Layer {} existiert nicht",
                feature.id,
                feature.layer_id()
            );
            return false;
        }
        self.features.insert(feature.id, feature);
        true
    }

    pub(crate) fn remove_feature(&mut self, feature_id: FeatureId) -> Option<Feature> {
        self.features.shift_remove(&feature_id)
    }

    pub(crate) fn feature_mut(&mut self, feature_id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(&feature_id)
    }

    pub(crate) fn layer_features_mut(
        &mut self,
        layer_id: LayerId,
    ) -> impl Iterator<Item = &mut Feature> {
        self.features
            .values_mut()
            .filter(move |feature| feature.layer_id() == layer_id)
    }
}

/// Namens-Disambiguierung nach dem Schema `"<Basis> (<n>)"`.
///
/// Ohne exakten Treffer bleibt der Name unverändert. Sonst wird die Basis
/// bestimmt (ein vorhandenes `" (n)"`-Suffix wird abgeschnitten), das höchste
/// vorhandene `n` zur Basis gesucht (Groß-/Kleinschreibung egal) und
/// `"<Basis> (<max+1>)"` geliefert.
pub fn disambiguate<'a>(names: impl Iterator<Item = &'a str> + Clone, basename: &str) -> String {
    let Some(exact_match) = names.clone().find(|name| *name == basename) else {
        return basename.to_string();
    };

    let root = strip_counter(exact_match).unwrap_or(exact_match);

    let Ok(candidate_pattern) = Regex::new(&format!(r"(?i)^{} \((\d+)\)$", regex::escape(root)))
    else {
        return format!("{root} (1)");
    };

    let taken: Vec<u64> = names
        .filter_map(|name| candidate_pattern.captures(name))
        .filter_map(|captures| captures.get(1)?.as_str().parse::<u64>().ok())
        .collect();
    let max_n = taken.iter().copied().max().unwrap_or(0);

    // Am Zählerende die kleinste freie Nummer nehmen
    let next = max_n
        .checked_add(1)
        .or_else(|| (1..u64::MAX).find(|n| !taken.contains(n)))
        .unwrap_or(max_n);
    format!("{root} ({next})")
}

/// `"Roads (2)"` -> `Some("Roads")`.
fn strip_counter(name: &str) -> Option<&str> {
    let (root, counter) = name.strip_suffix(')')?.rsplit_once(" (")?;
    (!counter.is_empty() && counter.bytes().all(|b| b.is_ascii_digit())).then_some(root)
}
