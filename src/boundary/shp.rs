//! Conversion from the binary geographic-packaging input (a zipped
//! shapefile, as electoral commissions publish) to the JSON boundary form.
//! The engine itself only ever loads the JSON form.

use std::path::Path;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use shapefile::{Reader, Shape, dbase::FieldValue};

use crate::common::extract_zip;
use crate::types::Level;

use super::BoundaryPolygon;
use super::geojson::write_boundary_file;

/// Attribute fields consulted for constituency identifier and name, in
/// order of preference. Covers the Bundeswahlleiter and common state-level
/// shapefile schemas.
const ID_FIELDS: [&str; 3] = ["WKR_NR", "WKNR", "id"];
const NAME_FIELDS: [&str; 3] = ["WKR_NAME", "WKNAME", "name"];

/// Extract a zipped shapefile, convert its polygons, and write the JSON
/// boundary file for the given level/state scope to `out_path`.
pub fn convert_zip(
    zip_path: &Path,
    level: Level,
    state: Option<&str>,
    out_path: &Path,
) -> Result<usize> {
    let workdir = tempfile::tempdir().context("create extraction directory")?;
    extract_zip(zip_path, workdir.path())?;

    let shp_path = find_shp(workdir.path())?;
    let polygons = read_shapefile(&shp_path, level, state)?;
    let count = polygons.len();
    write_boundary_file(out_path, &polygons)?;
    Ok(count)
}

/// Read all polygon shapes + attribute records from a `.shp` file and
/// convert them into boundary polygons for the given scope.
pub fn read_shapefile(
    path: &Path,
    level: Level,
    state: Option<&str>,
) -> Result<Vec<BoundaryPolygon>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut polygons = Vec::with_capacity(reader.shape_count()?);
    for (idx, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result.context("Error reading shape+record")?;
        let geometry = match shape {
            Shape::Polygon(p) => shp_to_multipolygon(&p),
            // Point/line layers carry no district areas.
            _ => continue,
        };

        let id = field_string(&record, &ID_FIELDS).unwrap_or_else(|| format!("{level}-{idx}"));
        let name = field_string(&record, &NAME_FIELDS).unwrap_or_else(|| id.clone());

        polygons.push(BoundaryPolygon {
            id,
            name,
            level,
            state: state.map(str::to_string),
            geometry,
        });
    }
    Ok(polygons)
}

/// First matching attribute value rendered as a string.
fn field_string(record: &shapefile::dbase::Record, fields: &[&str]) -> Option<String> {
    for field in fields {
        match record.get(field) {
            Some(FieldValue::Character(Some(value))) => {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
            Some(FieldValue::Numeric(Some(value))) => return Some(format!("{value}")),
            _ => {}
        }
    }
    None
}

/// Convert a shapefile polygon to geo::MultiPolygon, grouping each exterior
/// ring (CW in the shapefile convention) with its following holes.
fn shp_to_multipolygon(p: &shapefile::Polygon) -> MultiPolygon<f64> {
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0]);
        }
    }

    /// Signed area of a coordinate ring (negative for CW exterior rings).
    fn signed_area(pts: &[geo::Coord<f64>]) -> f64 {
        let mut a = 0.0;
        for w in pts.windows(2) {
            a += w[0].x * w[1].y - w[1].x * w[0].y;
        }
        a / 2.0
    }

    let mut polygons: Vec<geo::Polygon<f64>> = Vec::new();
    let mut exterior: Option<geo::LineString<f64>> = None;
    let mut holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in p.rings().iter() {
        let mut coords: Vec<geo::Coord<f64>> = ring
            .points()
            .iter()
            .map(|pt| geo::Coord { x: pt.x, y: pt.y })
            .collect();
        ensure_closed(&mut coords);
        let is_exterior = signed_area(&coords) < 0.0;
        let ls = geo::LineString(coords);

        if is_exterior {
            // Flush the previous polygon before starting a new one.
            if let Some(ext) = exterior.take() {
                polygons.push(geo::Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(ls);
        } else {
            holes.push(ls);
        }
    }
    if let Some(ext) = exterior {
        polygons.push(geo::Polygon::new(ext, holes));
    }

    MultiPolygon(polygons)
}

fn find_shp(dir: &Path) -> Result<std::path::PathBuf> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "shp") {
            return Ok(path);
        }
        if path.is_dir() {
            if let Ok(found) = find_shp(&path) {
                return Ok(found);
            }
        }
    }
    anyhow::bail!("No .shp file found in archive at {}", dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::{Point, PolygonRing};

    #[test]
    fn groups_exterior_with_following_holes() {
        // Exterior CW (negative signed area), hole CCW.
        let shp = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(vec![
                Point { x: 0.0, y: 0.0 },
                Point { x: 0.0, y: 10.0 },
                Point { x: 10.0, y: 10.0 },
                Point { x: 10.0, y: 0.0 },
                Point { x: 0.0, y: 0.0 },
            ]),
            PolygonRing::Inner(vec![
                Point { x: 4.0, y: 4.0 },
                Point { x: 6.0, y: 4.0 },
                Point { x: 6.0, y: 6.0 },
                Point { x: 4.0, y: 6.0 },
                Point { x: 4.0, y: 4.0 },
            ]),
        ]);

        let mp = shp_to_multipolygon(&shp);
        assert_eq!(mp.0.len(), 1);
        assert_eq!(mp.0[0].interiors().len(), 1);
    }
}
