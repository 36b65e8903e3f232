use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::boundary::{BoundaryPolygon, BoundaryStore};
use crate::directory::Directory;
use crate::geocode::Geocoder;
use crate::types::{Address, Constituency, Level};

use super::postal::PostalTable;

/// How a constituency was found, recorded for explainability and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    Spatial,
    PostalPrefix,
    LevelDefault,
}

/// Outcome of resolving one address at one governmental level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Resolution {
    Resolved {
        constituency: Constituency,
        method: ResolutionMethod,
    },
    Unresolved {
        /// Guidance for the user, never an empty silent failure.
        guidance: String,
    },
}

impl Resolution {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }

    pub fn constituency(&self) -> Option<&Constituency> {
        match self {
            Resolution::Resolved { constituency, .. } => Some(constituency),
            Resolution::Unresolved { .. } => None,
        }
    }

    pub fn method(&self) -> Option<ResolutionMethod> {
        match self {
            Resolution::Resolved { method, .. } => Some(*method),
            Resolution::Unresolved { .. } => None,
        }
    }
}

/// Per-level resolution map for one address, in `Level::order()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionReport {
    pub levels: Vec<(Level, Resolution)>,
}

impl ResolutionReport {
    pub fn get(&self, level: Level) -> Option<&Resolution> {
        self.levels
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, resolution)| resolution)
    }
}

/// Orchestrates geocoder, district locator, postal-prefix table and
/// level defaults into the fallback chain:
/// spatial → postal-prefix → level-default → unresolved.
pub struct Resolver {
    geocoder: Geocoder,
    store: Arc<BoundaryStore>,
    postal: PostalTable,
    directory: Arc<dyn Directory>,
}

impl Resolver {
    pub fn new(
        geocoder: Geocoder,
        store: Arc<BoundaryStore>,
        postal: PostalTable,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self { geocoder, store, postal, directory }
    }

    /// Resolve an address at every governmental level independently.
    pub fn resolve(&self, address: &Address) -> ResolutionReport {
        ResolutionReport {
            levels: Level::order()
                .into_iter()
                .map(|level| (level, self.resolve_level(address, level)))
                .collect(),
        }
    }

    /// Resolve an address at one level. Each fallback stage runs only if
    /// the previous one yielded nothing; geocoding failures are recovered
    /// here and never abort the resolution.
    pub fn resolve_level(&self, address: &Address, level: Level) -> Resolution {
        if let Some(resolution) = self.try_spatial(address, level) {
            return resolution;
        }
        if let Some(resolution) = self.try_postal_prefix(address, level) {
            return resolution;
        }
        if let Some(resolution) = self.try_level_default(level) {
            return resolution;
        }
        Resolution::Unresolved { guidance: self.guidance(address) }
    }

    /// Stage 1: geocode, then point-in-polygon against the level's
    /// boundary scope (state-scoped first when the state is known).
    fn try_spatial(&self, address: &Address, level: Level) -> Option<Resolution> {
        let geocoded = match self.geocoder.geocode(address) {
            Ok(geocoded) => geocoded,
            Err(err) => {
                debug!("spatial stage skipped for level {level}: {err}");
                return None;
            }
        };

        let state = geocoded.state.as_deref();
        let polygon = state
            .and_then(|state| self.store.scope(level, Some(state)).locate(&geocoded.coords).cloned())
            .or_else(|| self.store.scope(level, None).locate(&geocoded.coords).cloned())?;

        Some(Resolution::Resolved {
            constituency: self.materialize(&polygon),
            method: ResolutionMethod::Spatial,
        })
    }

    /// Stage 2: postal-code prefix against the static table.
    fn try_postal_prefix(&self, address: &Address, level: Level) -> Option<Resolution> {
        let id = self.postal.lookup(level, &address.postal_code)?;
        Some(Resolution::Resolved {
            constituency: self.constituency_by_id(id, level),
            method: ResolutionMethod::PostalPrefix,
        })
    }

    /// Stage 3: for levels with exactly one nationwide constituency,
    /// return it unconditionally.
    fn try_level_default(&self, level: Level) -> Option<Resolution> {
        if !level.has_nationwide_default() {
            return None;
        }
        let nationwide: Vec<Constituency> = self
            .directory
            .constituencies_at(level, None)
            .into_iter()
            .filter(|c| c.state.is_none())
            .collect();
        match nationwide.as_slice() {
            [single] => Some(Resolution::Resolved {
                constituency: single.clone(),
                method: ResolutionMethod::LevelDefault,
            }),
            _ => None,
        }
    }

    /// Prefer the directory record for a polygon; synthesize from polygon
    /// metadata when the import collaborator does not know the district.
    fn materialize(&self, polygon: &BoundaryPolygon) -> Constituency {
        self.directory.constituency(&polygon.id).unwrap_or(Constituency {
            id: polygon.id.clone(),
            name: polygon.name.clone(),
            level: polygon.level,
            state: polygon.state.clone(),
            electoral_district: None,
        })
    }

    fn constituency_by_id(&self, id: &str, level: Level) -> Constituency {
        self.directory.constituency(id).unwrap_or(Constituency {
            id: id.to_string(),
            name: id.to_string(),
            level,
            state: None,
            electoral_district: None,
        })
    }

    fn guidance(&self, address: &Address) -> String {
        if address.postal_code.trim().is_empty() {
            "Could not determine a constituency for this address. \
             Please provide a postal code."
                .to_string()
        } else {
            "Could not determine a constituency for this address. \
             Please check the street and city spelling or provide the state."
                .to_string()
        }
    }

    #[inline]
    pub fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    #[inline]
    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::boundary::write_boundary_file;
    use crate::directory::FileDirectory;
    use crate::error::GeocodeError;
    use crate::geocode::{GeocodeCache, GeocodeProvider, ProviderHit};
    use crate::types::Coordinates;
    use geo::{Coord, LineString, MultiPolygon, Polygon};

    struct ScriptedProvider {
        hit: Option<ProviderHit>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn hit(coords: Coordinates, state: &str) -> Self {
            Self {
                hit: Some(ProviderHit {
                    coords,
                    state: Some(state.to_string()),
                    city: None,
                    confidence: Some(0.8),
                }),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn unavailable() -> Self {
            Self { hit: None, fail: true, calls: AtomicUsize::new(0) }
        }
    }

    impl GeocodeProvider for ScriptedProvider {
        fn lookup(&self, _address: &Address) -> Result<Option<ProviderHit>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeocodeError::Unavailable("scripted outage".into()));
            }
            Ok(self.hit.clone())
        }
    }

    fn square_boundary(id: &str, level: Level, state: Option<&str>) -> BoundaryPolygon {
        let ring = LineString(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: 10.0 },
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 10.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        BoundaryPolygon {
            id: id.to_string(),
            name: format!("Kreis {id}"),
            level,
            state: state.map(str::to_string),
            geometry: MultiPolygon(vec![Polygon::new(ring, vec![])]),
        }
    }

    fn store_with_state_square(dir: &std::path::Path) -> Arc<BoundaryStore> {
        let boundary = square_boundary("wk-1", Level::State, Some("Berlin"));
        write_boundary_file(&dir.join("state_berlin.geojson"), &[boundary]).unwrap();
        Arc::new(BoundaryStore::open(dir))
    }

    fn resolver(
        provider: ScriptedProvider,
        store: Arc<BoundaryStore>,
        postal: PostalTable,
        directory: FileDirectory,
    ) -> Resolver {
        Resolver::new(
            Geocoder::new(GeocodeCache::in_memory(), Box::new(provider)),
            store,
            postal,
            Arc::new(directory),
        )
    }

    fn berlin_address() -> Address {
        Address::new("Platz der Republik 1", "11011", "Berlin")
    }

    #[test]
    fn spatial_stage_wins_when_point_is_inside() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(
            ScriptedProvider::hit(Coordinates::new(5.0, 5.0), "Berlin"),
            store_with_state_square(dir.path()),
            PostalTable::empty(),
            FileDirectory::empty(),
        );

        let resolution = resolver.resolve_level(&berlin_address(), Level::State);
        assert_eq!(resolution.method(), Some(ResolutionMethod::Spatial));
        assert_eq!(resolution.constituency().unwrap().id, "wk-1");
    }

    #[test]
    fn point_outside_every_polygon_falls_back_to_postal_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut postal = PostalTable::empty();
        postal.insert(Level::State, "11", "agh-berlin");
        let resolver = resolver(
            ScriptedProvider::hit(Coordinates::new(55.0, 55.0), "Berlin"),
            store_with_state_square(dir.path()),
            postal,
            FileDirectory::empty(),
        );

        let resolution = resolver.resolve_level(&berlin_address(), Level::State);
        // Never "spatial" for an out-of-polygon point.
        assert_eq!(resolution.method(), Some(ResolutionMethod::PostalPrefix));
        assert_eq!(resolution.constituency().unwrap().id, "agh-berlin");
    }

    #[test]
    fn geocode_outage_falls_back_to_postal_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut postal = PostalTable::empty();
        postal.insert(Level::State, "11", "agh-berlin");
        let resolver = resolver(
            ScriptedProvider::unavailable(),
            store_with_state_square(dir.path()),
            postal,
            FileDirectory::empty(),
        );

        let resolution = resolver.resolve_level(&berlin_address(), Level::State);
        assert_eq!(resolution.method(), Some(ResolutionMethod::PostalPrefix));
    }

    #[test]
    fn level_default_is_last_resort_for_nationwide_levels() {
        let dir = tempfile::tempdir().unwrap();
        let directory = FileDirectory::from_records(
            vec![Constituency {
                id: "eu-de".into(),
                name: "Bundesgebiet (Europawahl)".into(),
                level: Level::Eu,
                state: None,
                electoral_district: None,
            }],
            vec![],
        );
        let resolver = resolver(
            ScriptedProvider::unavailable(),
            Arc::new(BoundaryStore::open(dir.path())),
            PostalTable::empty(),
            directory,
        );

        let resolution = resolver.resolve_level(&berlin_address(), Level::Eu);
        assert_eq!(resolution.method(), Some(ResolutionMethod::LevelDefault));
        assert_eq!(resolution.constituency().unwrap().id, "eu-de");

        // State has no nationwide default: unresolved, with guidance.
        let resolution = resolver.resolve_level(&berlin_address(), Level::State);
        assert!(!resolution.is_resolved());
    }

    #[test]
    fn unresolved_guidance_mentions_missing_postal_code() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(
            ScriptedProvider::unavailable(),
            Arc::new(BoundaryStore::open(dir.path())),
            PostalTable::empty(),
            FileDirectory::empty(),
        );

        let address = Address::new("Platz der Republik 1", "", "Berlin");
        match resolver.resolve_level(&address, Level::Local) {
            Resolution::Unresolved { guidance } => assert!(guidance.contains("postal code")),
            other => panic!("expected unresolved, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(
            ScriptedProvider::hit(Coordinates::new(5.0, 5.0), "Berlin"),
            store_with_state_square(dir.path()),
            PostalTable::empty(),
            FileDirectory::empty(),
        );

        let first = resolver.resolve(&berlin_address());
        let second = resolver.resolve(&berlin_address());
        assert_eq!(first, second);
    }

    #[test]
    fn directory_record_preferred_over_polygon_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let directory = FileDirectory::from_records(
            vec![Constituency {
                id: "wk-1".into(),
                name: "Berlin-Mitte".into(),
                level: Level::State,
                state: Some("Berlin".into()),
                electoral_district: Some(1),
            }],
            vec![],
        );
        let resolver = resolver(
            ScriptedProvider::hit(Coordinates::new(5.0, 5.0), "Berlin"),
            store_with_state_square(dir.path()),
            PostalTable::empty(),
            directory,
        );

        let resolution = resolver.resolve_level(&berlin_address(), Level::State);
        assert_eq!(resolution.constituency().unwrap().name, "Berlin-Mitte");
    }
}
