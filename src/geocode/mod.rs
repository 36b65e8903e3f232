mod cache;
mod geocoder;
mod provider;
mod synonyms;

pub use cache::{CacheEntry, GeocodeCache, normalize_key};
pub use geocoder::{Geocoded, Geocoder};
pub use provider::{GeocodeProvider, NominatimProvider, ProviderHit};
pub use synonyms::canonical_state_name;
