use std::path::Path;

use anyhow::{Context, Result, anyhow};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Value, json};

use crate::common::write_atomic;
use crate::types::Level;

use super::BoundaryPolygon;

/// Read a boundary file: a GeoJSON FeatureCollection whose features carry
/// `id`, `name`, `level` and optional `state` properties and Polygon or
/// MultiPolygon geometry in (lon, lat) order.
pub fn read_boundary_file(path: &Path) -> Result<Vec<BoundaryPolygon>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read boundary file: {}", path.display()))?;
    read_boundary_bytes(&bytes)
        .with_context(|| format!("Failed to parse boundary file: {}", path.display()))
}

pub fn read_boundary_bytes(bytes: &[u8]) -> Result<Vec<BoundaryPolygon>> {
    let value: Value = serde_json::from_slice(bytes).context("not valid JSON")?;
    let features = value["features"]
        .as_array()
        .ok_or_else(|| anyhow!("missing FeatureCollection features array"))?;

    let mut polygons = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        polygons.push(parse_feature(feature).with_context(|| format!("feature {idx}"))?);
    }
    Ok(polygons)
}

fn parse_feature(feature: &Value) -> Result<BoundaryPolygon> {
    let props = &feature["properties"];
    let id = props["id"]
        .as_str()
        .ok_or_else(|| anyhow!("missing string property 'id'"))?
        .to_string();
    let name = props["name"].as_str().unwrap_or(&id).to_string();
    let level: Level = props["level"]
        .as_str()
        .ok_or_else(|| anyhow!("missing string property 'level'"))?
        .parse()?;
    let state = props["state"].as_str().map(str::to_string);

    let geometry = feature["geometry"]
        .as_object()
        .ok_or_else(|| anyhow!("missing geometry"))?;
    let coords = geometry["coordinates"]
        .as_array()
        .ok_or_else(|| anyhow!("missing geometry coordinates"))?;

    let multipolygon = match geometry["type"].as_str() {
        Some("MultiPolygon") => parse_multipolygon_coords(coords)?,
        // Single Polygon features are accepted and promoted.
        Some("Polygon") => MultiPolygon(vec![parse_polygon_coords(coords)?]),
        other => anyhow::bail!("unsupported geometry type: {other:?}"),
    };

    Ok(BoundaryPolygon { id, name, level, state, geometry: multipolygon })
}

/// Parse MultiPolygon coordinates: `[[ring, ring, ...], ...]` where the
/// first ring of each polygon is the exterior and the rest are holes.
fn parse_multipolygon_coords(coords: &[Value]) -> Result<MultiPolygon<f64>> {
    let mut polygons = Vec::with_capacity(coords.len());
    for polygon_coords in coords {
        let rings = polygon_coords
            .as_array()
            .ok_or_else(|| anyhow!("polygon is not an array of rings"))?;
        polygons.push(parse_polygon_coords(rings)?);
    }
    Ok(MultiPolygon(polygons))
}

fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let exterior = rings
        .first()
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("polygon has no exterior ring"))?;
    let exterior = parse_ring_coords(exterior)?;

    let mut interiors = Vec::new();
    for hole in rings.iter().skip(1) {
        let ring = hole
            .as_array()
            .ok_or_else(|| anyhow!("hole is not a coordinate array"))?;
        interiors.push(parse_ring_coords(ring)?);
    }
    Ok(Polygon::new(exterior, interiors))
}

/// Parse one ring: `[[lon, lat], ...]`. Rings are closed implicitly.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len() + 1);
    for pair in coords {
        let pair = pair
            .as_array()
            .ok_or_else(|| anyhow!("coordinate is not a [lon, lat] pair"))?;
        let x = pair
            .first()
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("longitude must be a number"))?;
        let y = pair
            .get(1)
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("latitude must be a number"))?;
        points.push(Coord { x, y });
    }

    // Ensure the ring is closed (first point == last point).
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }
    Ok(LineString(points))
}

/// Write boundary polygons as a FeatureCollection, the inverse of
/// [`read_boundary_file`]. Used by the shapefile conversion path.
pub fn write_boundary_file(path: &Path, polygons: &[BoundaryPolygon]) -> Result<()> {
    let features: Vec<Value> = polygons
        .iter()
        .map(|boundary| {
            let coords: Vec<Value> = boundary
                .geometry
                .0
                .iter()
                .map(|polygon| {
                    let mut rings = vec![ring_coords(polygon.exterior())];
                    rings.extend(polygon.interiors().iter().map(ring_coords));
                    json!(rings)
                })
                .collect();
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": coords,
                },
                "properties": {
                    "id": boundary.id,
                    "name": boundary.name,
                    "level": boundary.level.to_str(),
                    "state": boundary.state,
                },
            })
        })
        .collect();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    let bytes = serde_json::to_vec(&collection).context("serialize boundary GeoJSON")?;
    write_atomic(path, &bytes)
}

fn ring_coords(ring: &LineString<f64>) -> Vec<Vec<f64>> {
    ring.coords().map(|c| vec![c.x, c.y]).collect()
}
