use thiserror::Error;

/// Failure modes of the address-to-coordinate boundary. Callers treat every
/// variant as "no coordinates available" and continue with the fallback
/// chain; geocoding failures never abort a resolution.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The provider answered but found nothing for the address.
    #[error("no geocoding result for the given address")]
    NotFound,

    /// Network failure or a non-success response from the provider.
    #[error("geocoding provider unavailable: {0}")]
    Unavailable(String),

    /// The bounded request timeout elapsed.
    #[error("geocoding request timed out")]
    Timeout,

    /// The provider rejected the request under its fair-use policy.
    #[error("geocoding provider rate limit exceeded")]
    RateLimited,
}
