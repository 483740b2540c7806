//! GeoJSON FeatureCollection reading and writing.
//!
//! Only `Polygon` and `MultiPolygon` features are kept. String, number and
//! boolean properties become attribute columns; other property values are
//! dropped. Coordinates are WGS84 longitude/latitude per RFC 7946.
//!
//! See: <https://datatracker.ietf.org/doc/html/rfc7946>

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use relief_common::{Crs, Geometry, Polygon, ReliefError, ReliefResult, Ring};

use crate::record::{BoundaryDataset, BoundaryRecord, BoundarySource};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    type_: String,
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

impl BoundaryDataset {
    /// Parse a GeoJSON FeatureCollection.
    pub fn from_geojson_str(text: &str) -> ReliefResult<Self> {
        let collection: FeatureCollection = serde_json::from_str(text)?;
        if collection.type_ != "FeatureCollection" {
            return Err(ReliefError::DataReadError(format!(
                "expected a FeatureCollection, found '{}'",
                collection.type_
            )));
        }

        let mut dataset = BoundaryDataset::default();
        for (index, feature) in collection.features.into_iter().enumerate() {
            let Some(geometry) = feature.geometry.as_ref().map(parse_geometry).transpose()? else {
                debug!(feature = index, "Skipping feature without geometry");
                continue;
            };
            let Some(geometry) = geometry else {
                debug!(feature = index, "Skipping non-polygonal feature");
                continue;
            };

            let mut record = BoundaryRecord::new(geometry);
            for (key, value) in feature.properties.unwrap_or_default() {
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                record = record.with_attribute(key, text);
            }
            dataset.push(record);
        }

        debug!(records = dataset.len(), "Loaded GeoJSON boundary dataset");
        Ok(dataset)
    }

    /// Read a GeoJSON FeatureCollection from disk.
    pub fn from_geojson_path(path: impl AsRef<Path>) -> ReliefResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReliefError::DataReadError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_geojson_str(&text)
    }

    /// Serialize the dataset as a GeoJSON FeatureCollection.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .records()
            .iter()
            .map(|record| {
                let polygons: Vec<Value> = record
                    .geometry()
                    .parts()
                    .iter()
                    .map(|part| {
                        Value::Array(
                            part.rings()
                                .iter()
                                .map(|ring| {
                                    Value::Array(
                                        ring.points().iter().map(|&(x, y)| json!([x, y])).collect(),
                                    )
                                })
                                .collect(),
                        )
                    })
                    .collect();
                json!({
                    "type": "Feature",
                    "properties": record.attributes(),
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": polygons,
                    },
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

/// `Ok(None)` for valid but non-polygonal geometries.
fn parse_geometry(value: &Value) -> ReliefResult<Option<Geometry>> {
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
    let coordinates = value.get("coordinates");

    let parts = match (kind, coordinates) {
        ("Polygon", Some(coords)) => vec![parse_polygon(coords)?],
        ("MultiPolygon", Some(Value::Array(polygons))) => polygons
            .iter()
            .map(parse_polygon)
            .collect::<ReliefResult<Vec<_>>>()?,
        ("Polygon" | "MultiPolygon", _) => {
            return Err(ReliefError::InvalidGeometry(format!(
                "{} without coordinates",
                kind
            )))
        }
        _ => return Ok(None),
    };
    Geometry::new(parts, Crs::Geographic).map(Some)
}

fn parse_polygon(value: &Value) -> ReliefResult<Polygon> {
    let rings = value
        .as_array()
        .ok_or_else(|| ReliefError::InvalidGeometry("polygon is not an array of rings".to_string()))?
        .iter()
        .map(parse_ring)
        .collect::<ReliefResult<Vec<_>>>()?;
    Polygon::from_rings(rings)
}

fn parse_ring(value: &Value) -> ReliefResult<Ring> {
    let positions = value
        .as_array()
        .ok_or_else(|| ReliefError::InvalidGeometry("ring is not an array of positions".to_string()))?;
    let points = positions
        .iter()
        .map(|position| {
            // Positions may carry a third (altitude) element; only x/y are used
            match position.as_array().map(|p| p.as_slice()) {
                Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => Ok((x, y)),
                    _ => Err(ReliefError::InvalidGeometry(format!(
                        "non-numeric position {}",
                        position
                    ))),
                },
                _ => Err(ReliefError::InvalidGeometry(format!(
                    "malformed position {}",
                    position
                ))),
            }
        })
        .collect::<ReliefResult<Vec<_>>>()?;
    Ring::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"NAME": "Square", "POP": 1200, "ISO": null},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"NAME": "Capital"},
                "geometry": {"type": "Point", "coordinates": [1, 1]}
            },
            {
                "type": "Feature",
                "properties": {"NAME": "Islands"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[10, 0, 5], [11, 0, 5], [11, 1, 5], [10, 1, 5]]],
                        [[[20, 0], [21, 0], [21, 1], [20, 1], [20, 0]]]
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn test_reads_polygonal_features_only() {
        let dataset = BoundaryDataset::from_geojson_str(SAMPLE).unwrap();
        assert_eq!(dataset.len(), 2);

        let square = &dataset.records()[0];
        assert_eq!(square.attribute("NAME"), Some("Square"));
        assert_eq!(square.attribute("POP"), Some("1200"));
        assert_eq!(square.attribute("ISO"), None);
        assert_eq!(square.geometry().crs(), Crs::Geographic);

        let islands = &dataset.records()[1];
        assert!(islands.geometry().is_multi_part());
        // Unclosed ring with altitude was closed and flattened
        assert_eq!(islands.geometry().parts()[0].exterior().points().len(), 5);
    }

    #[test]
    fn test_rejects_other_documents() {
        let err = BoundaryDataset::from_geojson_str(r#"{"type": "Feature", "features": []}"#);
        assert!(matches!(err, Err(ReliefError::DataReadError(_))));
        assert!(BoundaryDataset::from_geojson_str("not json").is_err());
    }

    #[test]
    fn test_malformed_ring_is_an_error() {
        let text = r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature", "properties": {},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 1]]]}
        }]}"#;
        assert!(matches!(
            BoundaryDataset::from_geojson_str(text),
            Err(ReliefError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_geojson_output_reads_back() {
        let dataset = BoundaryDataset::from_geojson_str(SAMPLE).unwrap();
        let text = dataset.to_geojson().to_string();
        let again = BoundaryDataset::from_geojson_str(&text).unwrap();
        assert_eq!(again, dataset);
    }
}
