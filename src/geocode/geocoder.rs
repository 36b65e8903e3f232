use log::debug;

use crate::error::GeocodeError;
use crate::types::{Address, Coordinates};

use super::cache::{CacheEntry, GeocodeCache, normalize_key};
use super::provider::GeocodeProvider;
use super::synonyms::canonical_state_name;

/// Result of geocoding one address: coordinates plus the administrative
/// area the provider placed it in, normalized through the synonym table.
#[derive(Debug, Clone, PartialEq)]
pub struct Geocoded {
    pub coords: Coordinates,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl From<&CacheEntry> for Geocoded {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            coords: entry.coordinates(),
            state: entry.state.clone(),
            city: entry.city.clone(),
        }
    }
}

/// Cache-through wrapper around an external geocoding provider.
pub struct Geocoder {
    cache: GeocodeCache,
    provider: Box<dyn GeocodeProvider>,
}

impl Geocoder {
    pub fn new(cache: GeocodeCache, provider: Box<dyn GeocodeProvider>) -> Self {
        Self { cache, provider }
    }

    /// Geocode an address, serving repeat lookups of the same normalized
    /// address from the cache without touching the provider.
    pub fn geocode(&self, address: &Address) -> Result<Geocoded, GeocodeError> {
        if let Some(entry) = self.cache.get(address) {
            debug!("geocode cache hit for {}", normalize_key(address));
            return Ok(Geocoded::from(&entry));
        }
        self.geocode_uncached(address)
    }

    /// Bypass the cache and overwrite its entry wholesale with a fresh
    /// provider result. The only mutation path for existing entries.
    pub fn geocode_forced(&self, address: &Address) -> Result<Geocoded, GeocodeError> {
        self.geocode_uncached(address)
    }

    fn geocode_uncached(&self, address: &Address) -> Result<Geocoded, GeocodeError> {
        let hit = self
            .provider
            .lookup(address)?
            .ok_or(GeocodeError::NotFound)?;

        let state = hit
            .state
            .as_deref()
            .map(canonical_state_name)
            .map(str::to_string);

        let entry = CacheEntry {
            lat: hit.coords.lat,
            lon: hit.coords.lon,
            state,
            city: hit.city,
            confidence: hit.confidence,
            fetched_at: chrono::Utc::now(),
        };
        self.cache.put(address, entry.clone());
        Ok(Geocoded::from(&entry))
    }

    #[inline]
    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::geocode::provider::ProviderHit;

    struct FixedProvider {
        hit: Option<ProviderHit>,
        calls: AtomicUsize,
    }

    impl GeocodeProvider for FixedProvider {
        fn lookup(&self, _address: &Address) -> Result<Option<ProviderHit>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.hit.clone())
        }
    }

    fn reichstag_hit() -> ProviderHit {
        ProviderHit {
            coords: Coordinates::new(52.5186, 13.3761),
            state: Some("Berlin".to_string()),
            city: Some("Berlin".to_string()),
            confidence: Some(0.7),
        }
    }

    #[test]
    fn second_lookup_is_served_from_cache() {
        let geocoder = Geocoder::new(
            GeocodeCache::in_memory(),
            Box::new(FixedProvider { hit: Some(reichstag_hit()), calls: AtomicUsize::new(0) }),
        );
        let addr = Address::new("Platz der Republik 1", "11011", "Berlin");

        let first = geocoder.geocode(&addr).unwrap();
        let second = geocoder.geocode(&addr).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_provider_result_maps_to_not_found() {
        let geocoder = Geocoder::new(
            GeocodeCache::in_memory(),
            Box::new(FixedProvider { hit: None, calls: AtomicUsize::new(0) }),
        );
        let addr = Address::new("Nowhere 1", "00000", "Nirgendwo");
        assert!(matches!(geocoder.geocode(&addr), Err(GeocodeError::NotFound)));
    }

    #[test]
    fn provider_state_is_normalized() {
        let mut hit = reichstag_hit();
        hit.state = Some("Rheinland Pfalz".to_string());
        let geocoder = Geocoder::new(
            GeocodeCache::in_memory(),
            Box::new(FixedProvider { hit: Some(hit), calls: AtomicUsize::new(0) }),
        );
        let addr = Address::new("Deutschhausplatz 12", "55116", "Mainz");
        let geocoded = geocoder.geocode(&addr).unwrap();
        assert_eq!(geocoded.state.as_deref(), Some("Rheinland-Pfalz"));
    }
}
