//! Features: Geometrie plus Property-Bag, genau einem Layer zugeordnet.

use super::{FeatureId, LayerId};
use glam::DVec2;
use serde_json::{Map, Value};

/// Property-Bag eines Features (Reihenfolge bleibt erhalten).
pub type Properties = Map<String, Value>;

/// Interne Properties, die nie über `feature_properties` sichtbar werden.
pub const INTERNAL_PROPERTIES: [&str; 4] = ["layerId", "geometry", "locked", "hidden"];

/// Prüft, ob ein Property-Key intern ist.
pub fn is_internal_property(key: &str) -> bool {
    INTERNAL_PROPERTIES.contains(&key)
}

/// Position `[x, y, …]`.
///
/// Achsen nach x/y (Höhe, Messwert) werden unverändert mitgeführt und beim
/// Schreiben wieder ausgegeben.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub xy: DVec2,
    /// Weitere Achsen in Dokument-Reihenfolge, meist leer oder nur die Höhe
    pub extra_axes: Vec<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            xy: DVec2::new(x, y),
            extra_axes: Vec::new(),
        }
    }

    /// Position mit weiteren Achsen (z, m, …).
    pub fn with_extra_axes(mut self, axes: impl Into<Vec<f64>>) -> Self {
        self.extra_axes = axes.into();
        self
    }

    /// Höhe, falls vorhanden.
    pub fn z(&self) -> Option<f64> {
        self.extra_axes.first().copied()
    }
}

impl From<DVec2> for Position {
    fn from(xy: DVec2) -> Self {
        Self {
            xy,
            extra_axes: Vec::new(),
        }
    }
}

/// Geometrie eines Features (GeoJSON-Geometrietypen).
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    /// Äußerer Ring gefolgt von optionalen Löchern
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// GeoJSON-Typname der Geometrie.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    /// Verschiebt alle Positionen in der Ebene um `delta`.
    #[cfg(test)]
    pub(crate) fn translate(&mut self, delta: DVec2) {
        fn shift(points: &mut [Position], delta: DVec2) {
            for p in points {
                p.xy += delta;
            }
        }

        match self {
            Geometry::Point(p) => p.xy += delta,
            Geometry::MultiPoint(points) | Geometry::LineString(points) => shift(points, delta),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter_mut().for_each(|l| shift(l, delta))
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter_mut()
                .flatten()
                .for_each(|ring| shift(ring, delta)),
            Geometry::GeometryCollection(geometries) => {
                geometries.iter_mut().for_each(|g| g.translate(delta))
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn translated(&self, delta: DVec2) -> Self {
        let mut moved = self.clone();
        moved.translate(delta);
        moved
    }
}

/// Ein Feature im Modell.
///
/// `locked`/`hidden` sind interne Flags; die Layer-Zustände "gesperrt" und
/// "versteckt" werden daraus abgeleitet.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Eindeutige ID (enthält die Layer-ID)
    pub id: FeatureId,
    /// Geometrie (GeoJSON erlaubt `null`)
    pub geometry: Option<Geometry>,
    /// Sichtbare Properties ohne interne Keys
    pub properties: Properties,
    /// Gesperrt: nicht lösch- oder ausschneidbar
    pub locked: bool,
    /// Versteckt: nicht auf der Karte sichtbar
    pub hidden: bool,
}

impl Feature {
    /// Layer, dem das Feature gehört.
    pub fn layer_id(&self) -> LayerId {
        self.id.layer_id()
    }

    /// Sichtbar (nicht versteckt).
    pub fn is_showing(&self) -> bool {
        !self.hidden
    }

    /// Nicht gesperrt.
    pub fn is_unlocked(&self) -> bool {
        !self.locked
    }

    /// Versteckt oder gesperrt (darf auf der Karte nicht selektiert bleiben).
    pub fn is_hidden_or_locked(&self) -> bool {
        self.hidden || self.locked
    }
}

/// Feature aus einem Dokument, noch ohne vergebene ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeature {
    pub geometry: Option<Geometry>,
    pub properties: Properties,
    pub locked: bool,
    pub hidden: bool,
    /// Herkunfts-Layer aus der `layerId`-Property (nur bei Clipboard-Inhalten gesetzt)
    pub origin_layer: Option<LayerId>,
}

impl ParsedFeature {
    /// Vergibt eine frische ID im Ziel-Layer.
    pub fn into_feature(self, layer_id: LayerId) -> Feature {
        Feature {
            id: FeatureId::generate(layer_id),
            geometry: self.geometry,
            properties: self.properties,
            locked: self.locked,
            hidden: self.hidden,
        }
    }
}
