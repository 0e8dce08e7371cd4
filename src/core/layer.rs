//! Input-Layer: benannte, einzeln persistierte Feature-Sammlung.

use super::LayerId;

/// Ein Layer im Modell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Eindeutige, unveränderliche ID
    pub id: LayerId,
    /// Anzeige- und Persistenzname (eindeutig unter allen Layern)
    pub name: String,
    /// Aktiver Layer (höchstens einer gleichzeitig)
    pub active: bool,
}

impl Layer {
    /// Erstellt einen inaktiven Layer.
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: false,
        }
    }
}

/// Layer-Ansicht für Views: inklusive der aus den Features abgeleiteten Flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerView {
    pub id: LayerId,
    pub name: String,
    pub active: bool,
    /// Mindestens ein Feature ist gesperrt
    pub locked: bool,
    /// Mindestens ein Feature ist versteckt
    pub hidden: bool,
}
