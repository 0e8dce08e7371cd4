//! Selektions-Registry für Layer- und Feature-IDs.

use crate::core::{FeatureId, LayerId, ResourceId};
use indexmap::IndexSet;

/// Menge der aktuell selektierten IDs in Selektionsreihenfolge.
///
/// Die Reihenfolge ist relevant: Layer-Clipboard-Operationen wirken auf den
/// zuerst selektierten Layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<ResourceId>,
}

impl Selection {
    /// Erstellt eine leere Selektion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt IDs hinzu (bereits selektierte behalten ihre Position).
    pub fn select<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<ResourceId>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
    }

    /// Entfernt IDs aus der Selektion; unbekannte IDs werden ignoriert.
    pub fn deselect<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<ResourceId>,
    {
        for id in ids {
            self.ids.shift_remove(&id.into());
        }
    }

    /// Hebt die gesamte Selektion auf.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selektierte IDs, gefiltert über ein Prädikat.
    pub fn selected(&self, predicate: impl Fn(&ResourceId) -> bool) -> Vec<ResourceId> {
        self.ids.iter().copied().filter(|id| predicate(id)).collect()
    }

    /// Selektierte Feature-IDs.
    pub fn selected_features(&self) -> Vec<FeatureId> {
        self.ids.iter().filter_map(|id| id.as_feature()).collect()
    }

    /// Selektierte Layer-IDs.
    pub fn selected_layers(&self) -> Vec<LayerId> {
        self.ids.iter().filter_map(|id| id.as_layer()).collect()
    }

    /// Die zuerst selektierte ID.
    pub fn first(&self) -> Option<ResourceId> {
        self.ids.first().copied()
    }

    /// Prüft ob eine ID selektiert ist.
    pub fn is_selected(&self, id: impl Into<ResourceId>) -> bool {
        self.ids.contains(&id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
