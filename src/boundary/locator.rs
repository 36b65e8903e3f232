use geo::{BoundingRect, Intersects, Rect};
use rstar::{AABB, RTree, RTreeObject};

use crate::types::Coordinates;

use super::BoundaryPolygon;

/// A bounding box in the R-tree, associated with a boundary polygon by index.
#[derive(Debug, Clone)]
struct BoundingBox {
    idx: usize, // Index of the corresponding polygon in load order
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Point-in-polygon index over one boundary scope. Candidates are
/// prefiltered through an R-tree of bounding boxes, then tested exactly.
#[derive(Debug)]
pub struct DistrictIndex {
    polygons: Vec<BoundaryPolygon>,
    rtree: RTree<BoundingBox>,
}

impl DistrictIndex {
    /// Build the index. Polygon order is load order and is significant:
    /// it is the tie-break for points on shared or overlapping boundaries.
    pub fn new(polygons: Vec<BoundaryPolygon>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                polygons
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, boundary)| {
                        // Degenerate/empty geometries get no bbox and can never match.
                        boundary
                            .geometry
                            .bounding_rect()
                            .map(|bbox| BoundingBox { idx, bbox })
                    })
                    .collect(),
            ),
            polygons,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn polygons(&self) -> &[BoundaryPolygon] {
        &self.polygons
    }

    /// Find the enclosing polygon for a point. The first polygon in load
    /// order containing the point wins; a point exactly on an edge counts
    /// as inside (closed region), so shared borders never produce false
    /// negatives. `None` means no polygon in this scope encloses the point.
    pub fn locate(&self, coords: &Coordinates) -> Option<&BoundaryPolygon> {
        let point = coords.to_point();
        let envelope = AABB::from_corners([point.x(), point.y()], [point.x(), point.y()]);

        // The R-tree yields candidates in arbitrary order; restore load
        // order before the exact test so the tie-break stays deterministic.
        let mut candidates: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&envelope)
            .map(|bb| bb.idx)
            .collect();
        candidates.sort_unstable();

        candidates
            .into_iter()
            .find(|&idx| self.polygons[idx].geometry.intersects(&point))
            .map(|idx| &self.polygons[idx])
    }
}
