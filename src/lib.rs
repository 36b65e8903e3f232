#![doc = "Constituency resolution & representative suggestion engine"]
mod boundary;
mod common;
mod directory;
mod error;
mod geocode;
mod resolve;
mod suggest;
mod topics;
mod types;

pub mod cli;
pub mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

#[doc(inline)]
pub use boundary::{BoundaryPolygon, BoundaryStore, DistrictIndex, convert_zip, state_slug};
#[doc(inline)]
pub use directory::{Directory, FileDirectory};
#[doc(inline)]
pub use error::GeocodeError;
#[doc(inline)]
pub use geocode::{
    CacheEntry, GeocodeCache, GeocodeProvider, Geocoded, Geocoder, NominatimProvider, ProviderHit,
    canonical_state_name, normalize_key,
};
#[doc(inline)]
pub use resolve::{PostalTable, Resolution, ResolutionMethod, ResolutionReport, Resolver};
#[doc(inline)]
pub use suggest::{
    MatchOutcome, RankedRepresentative, SuggestedLevel, SuggestionEngine, SuggestionResult,
};
#[doc(inline)]
pub use topics::{Taxonomy, TopicArea, TopicMatch, TopicMatcher};
#[doc(inline)]
pub use types::{Address, Constituency, Coordinates, Level, Representative};

const DIRECTORY_FILE: &str = "directory.json";

/// Configuration for [`Engine::open`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding boundary files, the postal-prefix table, the
    /// taxonomy override and the representative directory.
    pub data_dir: PathBuf,
    /// Directory for the durable geocode cache.
    pub cache_dir: PathBuf,
    /// Cache entries older than this count as misses. `None` keeps
    /// entries permanently.
    pub cache_max_age: Option<Duration>,
    /// Bounded timeout for a single geocoding lookup.
    pub geocode_timeout: Duration,
    /// Alternative geocoding endpoint (e.g. a self-hosted Nominatim).
    pub geocode_base_url: Option<String>,
}

impl EngineConfig {
    pub fn new(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
            cache_max_age: None,
            geocode_timeout: Duration::from_secs(10),
            geocode_base_url: None,
        }
    }
}

/// The engine: the two-call public surface (`resolve`, `suggest`) the
/// presentation layer consumes. Stateless per request beyond the shared
/// immutable stores and the append-only geocode cache; safe to share
/// across worker threads.
pub struct Engine {
    resolver: Resolver,
    suggester: SuggestionEngine,
}

impl Engine {
    /// Wire the engine from on-disk configuration. Fails only on
    /// configuration that leaves the engine unable to produce anything:
    /// an empty taxonomy, or neither boundary files nor a postal table.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let provider: Box<dyn GeocodeProvider> = match &config.geocode_base_url {
            Some(url) => Box::new(NominatimProvider::with_base_url(url, config.geocode_timeout)?),
            None => Box::new(NominatimProvider::new(config.geocode_timeout)?),
        };

        let directory_path = config.data_dir.join(DIRECTORY_FILE);
        let directory: Arc<dyn Directory> = if directory_path.exists() {
            Arc::new(FileDirectory::open(&directory_path)?)
        } else {
            Arc::new(FileDirectory::empty())
        };

        Self::assemble(config, provider, directory)
    }

    /// Wire the engine from explicit parts. This is the seam embedders and
    /// tests use to supply their own provider or directory implementation.
    pub fn assemble(
        config: &EngineConfig,
        provider: Box<dyn GeocodeProvider>,
        directory: Arc<dyn Directory>,
    ) -> Result<Self> {
        let taxonomy = Taxonomy::open(&config.data_dir)?;
        let store = Arc::new(BoundaryStore::open(&config.data_dir));
        let postal = PostalTable::open(&config.data_dir)?;

        if !store.has_any_boundary_file() && postal.is_empty() {
            anyhow::bail!(
                "No boundary files and no postal-prefix table in {}; \
                 the engine could never resolve a constituency",
                config.data_dir.display()
            );
        }

        let cache = GeocodeCache::open(&config.cache_dir, config.cache_max_age);
        let geocoder = Geocoder::new(cache, provider);
        let resolver = Resolver::new(geocoder, store, postal, Arc::clone(&directory));
        let suggester = SuggestionEngine::new(TopicMatcher::new(taxonomy), directory);
        Ok(Self { resolver, suggester })
    }

    /// Resolve an address to its constituency at every governmental level.
    pub fn resolve(&self, address: &Address) -> ResolutionReport {
        self.resolver.resolve(address)
    }

    /// Resolve an address at a single level.
    pub fn resolve_level(&self, address: &Address, level: Level) -> Resolution {
        self.resolver.resolve_level(address, level)
    }

    /// Suggest representatives for a free-text concern, optionally
    /// narrowed to the constituency of an address.
    pub fn suggest(
        &self,
        text: &str,
        address: Option<&Address>,
        limit: usize,
    ) -> SuggestionResult {
        self.suggester.suggest(&self.resolver, text, address, limit)
    }

    #[inline]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}
