//! In-memory R-tree of planning-area polygons for click lookups.

use geo::{BoundingRect, Contains, LineString, Polygon};
use rstar::{AABB, RTree, RTreeObject};
use sg_explorer_geography_models::{LatLng, PlanningArea};

struct AreaEntry {
    name: String,
    envelope: AABB<[f64; 2]>,
    polygon: Polygon<f64>,
}

impl RTreeObject for AreaEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index answering "which planning area contains this point".
pub struct PlanningAreaIndex {
    tree: RTree<AreaEntry>,
}

impl PlanningAreaIndex {
    /// Builds the index from parsed planning areas.
    ///
    /// Areas with fewer than three ring points cannot contain anything
    /// and are left out.
    #[must_use]
    pub fn new(areas: &[PlanningArea]) -> Self {
        let entries: Vec<AreaEntry> = areas
            .iter()
            .filter(|area| area.ring.len() >= 3)
            .map(|area| {
                let exterior: LineString<f64> =
                    area.ring.iter().copied().map(geo::Coord::from).collect();
                let polygon = Polygon::new(exterior, vec![]);
                let envelope = polygon.bounding_rect().map_or_else(
                    || AABB::from_point([0.0, 0.0]),
                    |rect| {
                        AABB::from_corners(
                            [rect.min().x, rect.min().y],
                            [rect.max().x, rect.max().y],
                        )
                    },
                );
                AreaEntry {
                    name: area.name.clone(),
                    envelope,
                    polygon,
                }
            })
            .collect();

        log::info!("Loaded {} planning areas into spatial index", entries.len());

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index has no areas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Name of the planning area containing `point`, if any.
    ///
    /// Planning areas tile the island without overlap, so the first
    /// match wins.
    #[must_use]
    pub fn lookup(&self, point: LatLng) -> Option<&str> {
        let query_env = AABB::from_point([point.lng, point.lat]);
        let geo_point = geo::Point::from(geo::Coord::from(point));

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&geo_point))
            .map(|entry| entry.name.as_str())
    }
}
