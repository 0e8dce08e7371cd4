//! Änderungs-Events und deren verzögerte Zustellung an Reducer.
//!
//! `emit` stellt nie synchron zu: jedes Event wird pro registriertem Reducer
//! in eine FIFO-Queue gelegt und erst von `dispatch_pending` ausgeliefert,
//! nachdem der mutierende Aufruf zurückgekehrt ist. Dadurch sieht jeder
//! Reducer die Events in Emissionsreihenfolge, und ein spät registrierter
//! Reducer bekommt zuerst seinen Snapshot und danach nur neuere Events.

use crate::core::{Feature, FeatureId, Geometry, LayerId, LayerView, Properties};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Änderungs-Event des Layer-Modells (minimales Delta, außer `Snapshot`).
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// Vollständiger Zustand für einen neu registrierten Reducer
    Snapshot {
        layers: Vec<LayerView>,
        features: Vec<Feature>,
    },
    /// Features hinzugefügt (`selected`: Views sollen sie selektieren)
    FeaturesAdded {
        features: Vec<Feature>,
        selected: bool,
    },
    /// Features entfernt
    FeaturesRemoved { ids: Vec<FeatureId> },
    /// Geometrien geändert
    GeometriesUpdated {
        geometries: Vec<(FeatureId, Geometry)>,
    },
    /// Properties eines Features ersetzt
    FeaturePropertiesUpdated {
        feature_id: FeatureId,
        properties: Properties,
    },
    /// Layer samt Features hinzugefügt
    LayerAdded {
        layer: LayerView,
        features: Vec<Feature>,
    },
    /// Layer samt Features entfernt
    LayerRemoved { layer_id: LayerId },
    /// Layer umbenannt
    LayerRenamed { layer_id: LayerId, name: String },
    /// Sperr-Zustand eines Layers geändert
    LayerLocked { layer_id: LayerId, locked: bool },
    /// Sichtbarkeit eines Layers geändert
    LayerHidden { layer_id: LayerId, hidden: bool },
    /// Layer wurde aktiver Layer
    LayerActivated { layer_id: LayerId },
    /// Layer ist nicht mehr aktiv
    LayerDeactivated { layer_id: LayerId },
}

impl ModelEvent {
    /// Kurzname des Event-Typs (für Logs).
    pub fn kind(&self) -> &'static str {
        match self {
            ModelEvent::Snapshot { .. } => "snapshot",
            ModelEvent::FeaturesAdded { .. } => "featuresadded",
            ModelEvent::FeaturesRemoved { .. } => "featuresremoved",
            ModelEvent::GeometriesUpdated { .. } => "geometriesupdated",
            ModelEvent::FeaturePropertiesUpdated { .. } => "featurepropertiesupdated",
            ModelEvent::LayerAdded { .. } => "layeradded",
            ModelEvent::LayerRemoved { .. } => "layerremoved",
            ModelEvent::LayerRenamed { .. } => "layerrenamed",
            ModelEvent::LayerLocked { .. } => "layerlocked",
            ModelEvent::LayerHidden { .. } => "layerhidden",
            ModelEvent::LayerActivated { .. } => "layeractivated",
            ModelEvent::LayerDeactivated { .. } => "layerdeactivated",
        }
    }
}

/// Handle eines registrierten Reducers (für `deregister`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReducerId(u64);

/// Abonnent der Modell-Events.
pub type Reducer = Box<dyn FnMut(&ModelEvent)>;

/// Reducer-Liste plus Zustell-Queue.
#[derive(Default)]
pub struct EventBus {
    reducers: IndexMap<ReducerId, Reducer>,
    queue: VecDeque<(ReducerId, Arc<ModelEvent>)>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("reducers", &self.reducers.len())
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert einen Reducer und plant `snapshot` als sein erstes Event.
    pub fn register(&mut self, reducer: Reducer, snapshot: ModelEvent) -> ReducerId {
        let id = ReducerId(self.next_id);
        self.next_id += 1;
        self.reducers.insert(id, reducer);
        self.queue.push_back((id, Arc::new(snapshot)));
        log::debug!("Reducer {:?} registriert", id);
        id
    }

    /// Entfernt einen Reducer; noch nicht zugestellte Events an ihn verfallen.
    pub fn deregister(&mut self, id: ReducerId) -> bool {
        let removed = self.reducers.shift_remove(&id).is_some();
        if removed {
            self.queue.retain(|(target, _)| *target != id);
            log::debug!("Reducer {:?} abgemeldet", id);
        }
        removed
    }

    /// Plant die Zustellung an alle aktuell registrierten Reducer
    /// (in Registrierungsreihenfolge).
    pub fn emit(&mut self, event: ModelEvent) {
        log::trace!("emit {}", event.kind());
        let event = Arc::new(event);
        for id in self.reducers.keys() {
            self.queue.push_back((*id, Arc::clone(&event)));
        }
    }

    /// Stellt alle geplanten Events in FIFO-Reihenfolge zu.
    /// Gibt die Anzahl der Zustellungen zurück.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Some((id, event)) = self.queue.pop_front() {
            if let Some(reducer) = self.reducers.get_mut(&id) {
                reducer(&event);
                delivered += 1;
            }
        }
        delivered
    }

    /// Anzahl noch nicht zugestellter Events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Anzahl registrierter Reducer.
    pub fn reducer_count(&self) -> usize {
        self.reducers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, Reducer) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (
            seen,
            Box::new(move |event: &ModelEvent| sink.borrow_mut().push(event.kind())),
        )
    }

    fn empty_snapshot() -> ModelEvent {
        ModelEvent::Snapshot {
            layers: Vec::new(),
            features: Vec::new(),
        }
    }

    #[test]
    fn emit_never_delivers_synchronously() {
        let mut bus = EventBus::new();
        let (seen, reducer) = recorder();
        bus.register(reducer, empty_snapshot());

        bus.emit(ModelEvent::LayerRemoved {
            layer_id: LayerId::generate(),
        });
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.pending(), 2);

        assert_eq!(bus.dispatch_pending(), 2);
        assert_eq!(*seen.borrow(), vec!["snapshot", "layerremoved"]);
    }

    #[test]
    fn late_reducer_only_sees_snapshot_and_newer_events() {
        let mut bus = EventBus::new();
        let (early, reducer) = recorder();
        bus.register(reducer, empty_snapshot());
        bus.emit(ModelEvent::LayerActivated {
            layer_id: LayerId::generate(),
        });

        let (late, reducer) = recorder();
        bus.register(reducer, empty_snapshot());
        bus.emit(ModelEvent::LayerDeactivated {
            layer_id: LayerId::generate(),
        });
        bus.dispatch_pending();

        assert_eq!(
            *early.borrow(),
            vec!["snapshot", "layeractivated", "layerdeactivated"]
        );
        assert_eq!(*late.borrow(), vec!["snapshot", "layerdeactivated"]);
    }

    #[test]
    fn deregister_drops_pending_deliveries() {
        let mut bus = EventBus::new();
        let (seen, reducer) = recorder();
        let id = bus.register(reducer, empty_snapshot());
        bus.emit(ModelEvent::LayerRemoved {
            layer_id: LayerId::generate(),
        });

        assert!(bus.deregister(id));
        assert!(!bus.deregister(id));
        assert_eq!(bus.dispatch_pending(), 0);
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.reducer_count(), 0);
    }
}
