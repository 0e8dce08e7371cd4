//! Parser für GeoJSON-Dokumente.

use crate::core::{is_internal_property, Geometry, LayerId, ParsedFeature, Position, Properties};
use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Parsed ein Layer-Dokument (`FeatureCollection` oder einzelnes `Feature`).
///
/// Ein leeres Dokument ergibt eine leere Liste.
pub fn read_features(contents: &str) -> Result<Vec<ParsedFeature>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_str(contents).context("Layer-Dokument ist kein gültiges JSON")?;

    match type_of(&value)? {
        "FeatureCollection" => {
            let Some(features) = value.get("features").and_then(Value::as_array) else {
                bail!("FeatureCollection ohne 'features'-Array");
            };
            features
                .iter()
                .enumerate()
                .map(|(index, feature)| {
                    parse_feature(feature).with_context(|| format!("Feature #{index}"))
                })
                .collect()
        }
        "Feature" => Ok(vec![parse_feature(&value)?]),
        other => bail!("Unerwarteter GeoJSON-Typ '{}'", other),
    }
}

/// Parsed ein einzelnes serialisiertes `Feature`.
pub fn read_feature(json: &str) -> Result<ParsedFeature> {
    let value: Value = serde_json::from_str(json).context("Feature ist kein gültiges JSON")?;
    parse_feature(&value)
}

fn type_of(value: &Value) -> Result<&str> {
    value
        .get("type")
        .and_then(Value::as_str)
        .context("GeoJSON-Objekt ohne 'type'")
}

fn parse_feature(value: &Value) -> Result<ParsedFeature> {
    let kind = type_of(value)?;
    if kind != "Feature" {
        bail!("'Feature' erwartet, '{}' gefunden", kind);
    }

    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => None,
        Some(geometry) => Some(parse_geometry(geometry)?),
    };

    let mut properties = match value.get("properties") {
        None | Some(Value::Null) => Properties::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => bail!("'properties' muss ein Objekt sein"),
    };

    let locked = flag(&properties, "locked");
    let hidden = flag(&properties, "hidden");
    let origin_layer = properties
        .get("layerId")
        .and_then(Value::as_str)
        .and_then(|id| id.parse::<LayerId>().ok());

    properties.retain(|key, _| !is_internal_property(key));

    Ok(ParsedFeature {
        geometry,
        properties,
        locked,
        hidden,
        origin_layer,
    })
}

fn flag(properties: &Properties, key: &str) -> bool {
    properties
        .get(key)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn parse_geometry(value: &Value) -> Result<Geometry> {
    let kind = type_of(value)?;

    if kind == "GeometryCollection" {
        let Some(geometries) = value.get("geometries").and_then(Value::as_array) else {
            bail!("GeometryCollection ohne 'geometries'-Array");
        };
        return Ok(Geometry::GeometryCollection(
            geometries
                .iter()
                .map(parse_geometry)
                .collect::<Result<_>>()?,
        ));
    }

    let coordinates = value
        .get("coordinates")
        .with_context(|| format!("{kind} ohne 'coordinates'"))?;

    let geometry = match kind {
        "Point" => Geometry::Point(parse_position(coordinates)?),
        "MultiPoint" => Geometry::MultiPoint(parse_positions(coordinates)?),
        "LineString" => Geometry::LineString(parse_positions(coordinates)?),
        "MultiLineString" => Geometry::MultiLineString(parse_lines(coordinates)?),
        "Polygon" => Geometry::Polygon(parse_lines(coordinates)?),
        "MultiPolygon" => Geometry::MultiPolygon(
            array(coordinates)?
                .iter()
                .map(parse_lines)
                .collect::<Result<_>>()?,
        ),
        other => bail!("Unbekannter Geometrietyp '{}'", other),
    };

    Ok(geometry)
}

fn array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .with_context(|| format!("Array erwartet, gefunden: {value}"))
}

/// Position `[x, y, …]`; weitere Achsen bleiben erhalten.
fn parse_position(value: &Value) -> Result<Position> {
    let coords = array(value)?;
    if coords.len() < 2 {
        bail!("Position braucht mindestens 2 Koordinaten: {}", value);
    }
    let axes = coords
        .iter()
        .map(|axis| {
            axis.as_f64()
                .with_context(|| format!("Koordinate ist keine Zahl: {}", axis))
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(Position::new(axes[0], axes[1]).with_extra_axes(&axes[2..]))
}

fn parse_positions(value: &Value) -> Result<Vec<Position>> {
    array(value)?.iter().map(parse_position).collect()
}

fn parse_lines(value: &Value) -> Result<Vec<Vec<Position>>> {
    array(value)?.iter().map(parse_positions).collect()
}
