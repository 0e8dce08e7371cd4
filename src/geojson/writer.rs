//! Writer für GeoJSON-Dokumente.

use crate::core::{Feature, Geometry, Position};
use anyhow::Result;
use serde_json::{json, Value};

/// Inhalt eines neuen, leeren Layers.
pub const EMPTY_COLLECTION: &str = r#"{"type":"FeatureCollection","features":[]}"#;

/// Schreibt Features als `FeatureCollection` (Layer-Dokument).
///
/// `locked`/`hidden` werden als Properties persistiert (nur wenn gesetzt),
/// die Layer-Zuordnung nicht.
pub fn write_features<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Result<String> {
    let features: Vec<Value> = features
        .into_iter()
        .map(|feature| feature_value(feature, false))
        .collect();

    Ok(serde_json::to_string(&json!({
        "type": "FeatureCollection",
        "features": features,
    }))?)
}

/// Schreibt ein einzelnes Feature (Clipboard-Inhalt) inklusive `layerId`.
pub fn write_feature(feature: &Feature) -> Result<String> {
    Ok(serde_json::to_string(&feature_value(feature, true))?)
}

fn feature_value(feature: &Feature, include_layer_id: bool) -> Value {
    let mut properties = feature.properties.clone();
    if feature.locked {
        properties.insert("locked".into(), Value::Bool(true));
    }
    if feature.hidden {
        properties.insert("hidden".into(), Value::Bool(true));
    }
    if include_layer_id {
        properties.insert(
            "layerId".into(),
            Value::String(feature.layer_id().to_string()),
        );
    }

    json!({
        "type": "Feature",
        "geometry": feature.geometry.as_ref().map_or(Value::Null, geometry_value),
        "properties": properties,
    })
}

fn geometry_value(geometry: &Geometry) -> Value {
    let coordinates = match geometry {
        Geometry::GeometryCollection(geometries) => {
            let geometries: Vec<Value> = geometries.iter().map(geometry_value).collect();
            return json!({ "type": geometry.type_name(), "geometries": geometries });
        }
        Geometry::Point(p) => position(p),
        Geometry::MultiPoint(points) | Geometry::LineString(points) => positions(points),
        Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
            Value::Array(lines.iter().map(|l| positions(l)).collect())
        }
        Geometry::MultiPolygon(polygons) => Value::Array(
            polygons
                .iter()
                .map(|rings| Value::Array(rings.iter().map(|r| positions(r)).collect()))
                .collect(),
        ),
    };

    json!({ "type": geometry.type_name(), "coordinates": coordinates })
}

fn position(p: &Position) -> Value {
    let mut axes = vec![json!(p.xy.x), json!(p.xy.y)];
    axes.extend(p.extra_axes.iter().map(|axis| json!(axis)));
    Value::Array(axes)
}

fn positions(points: &[Position]) -> Value {
    Value::Array(points.iter().map(position).collect())
}
