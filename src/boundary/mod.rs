mod geojson;
mod locator;
mod shp;
mod store;

use geo::MultiPolygon;

use crate::types::Level;

pub use geojson::{read_boundary_file, write_boundary_file};
pub use locator::DistrictIndex;
pub use shp::convert_zip;
pub use store::{BoundaryStore, state_slug};

/// One named electoral-district polygon from a boundary file. Immutable
/// after load; ring closure is guaranteed by the readers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    pub id: String,
    pub name: String,
    pub level: Level,
    /// State scope; `None` means nationwide.
    pub state: Option<String>,
    /// Rings in (lon, lat) order, holes included.
    pub geometry: MultiPolygon<f64>,
}
