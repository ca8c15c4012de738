//! Pluggable geocoders: resolve free-text addresses to coordinates.
//!
//! The engine never geocodes on its own; callers resolve a snapshot with
//! [`resolve_snapshot_locations`] before planning. Implementations:
//!
//! - **`TableGeocoder`**: fixed in-memory address table. Zero dependencies.
//! - **`CachedGeocoder`**: LRU cache in front of any other geocoder.
//! - **`NominatimGeocoder`** (feature `nominatim`): OpenStreetMap Nominatim search API.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use thiserror::Error;
use tracing::{debug, warn};

use crate::geo::Coordinate;
use crate::plan::EventSnapshot;

/// Failure talking to a geocoding provider. "Address not found" is not an
/// error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[cfg(feature = "nominatim")]
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed geocoding response: {0}")]
    Decode(String),
    #[error("geocoding provider error: {0}")]
    Provider(String),
}

pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

fn normalize_address(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Fixed address → coordinate table; lookups ignore case and repeated whitespace.
#[derive(Debug, Default, Clone)]
pub struct TableGeocoder {
    table: HashMap<String, Coordinate>,
}

impl TableGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.insert(address, coordinate);
        self
    }

    pub fn insert(&mut self, address: &str, coordinate: Coordinate) {
        self.table.insert(normalize_address(address), coordinate);
    }
}

impl Geocoder for TableGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(self.table.get(&normalize_address(address)).copied())
    }
}

/// LRU-cached wrapper around any [`Geocoder`].
///
/// Both hits and "not found" answers are cached; provider errors are not.
pub struct CachedGeocoder {
    inner: Box<dyn Geocoder>,
    cache: Mutex<LruCache<String, Option<Coordinate>>>,
}

impl CachedGeocoder {
    pub fn new(inner: Box<dyn Geocoder>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl Geocoder for CachedGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let key = normalize_address(address);
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(*cached);
            }
        }

        let result = self.inner.geocode(address)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, result);
        }
        Ok(result)
    }
}

#[cfg(feature = "nominatim")]
pub mod nominatim {
    use super::*;
    use reqwest::blocking::Client;
    use reqwest::Url;
    use serde::Deserialize;
    use std::time::Duration;

    pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
    const USER_AGENT: &str = concat!("carpool/", env!("CARGO_PKG_VERSION"));

    /// Geocodes through the Nominatim `/search` endpoint, first result only.
    pub struct NominatimGeocoder {
        client: Client,
        endpoint: String,
    }

    impl NominatimGeocoder {
        pub fn new(endpoint: &str) -> Result<Self, GeocodeError> {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()?;
            Ok(Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            })
        }
    }

    #[derive(Deserialize)]
    struct NominatimPlace {
        lat: String,
        lon: String,
    }

    impl Geocoder for NominatimGeocoder {
        fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
            let mut url = Url::parse(&format!("{}/search", self.endpoint))
                .map_err(|err| GeocodeError::Provider(format!("bad endpoint: {err}")))?;
            url.query_pairs_mut()
                .append_pair("q", address)
                .append_pair("format", "json")
                .append_pair("limit", "1");

            let places: Vec<NominatimPlace> =
                self.client.get(url).send()?.error_for_status()?.json()?;
            let Some(place) = places.into_iter().next() else {
                return Ok(None);
            };

            let lat: f64 = place
                .lat
                .parse()
                .map_err(|_| GeocodeError::Decode(format!("latitude '{}'", place.lat)))?;
            let lng: f64 = place
                .lon
                .parse()
                .map_err(|_| GeocodeError::Decode(format!("longitude '{}'", place.lon)))?;
            Coordinate::new(lat, lng)
                .map(Some)
                .map_err(|err| GeocodeError::Decode(err.to_string()))
        }
    }
}

/// Outcome of resolving a snapshot's addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Locations filled in by the geocoder.
    pub resolved: usize,
    /// Households still without a location afterwards.
    pub unresolved: Vec<String>,
    pub meeting_spot_resolved: bool,
}

fn lookup(geocoder: &dyn Geocoder, subject: &str, address: &str) -> Option<Coordinate> {
    match geocoder.geocode(address) {
        Ok(Some(coordinate)) => Some(coordinate),
        Ok(None) => {
            warn!(%subject, %address, "address not found");
            None
        }
        Err(err) => {
            warn!(%subject, %address, %err, "geocoding failed");
            None
        }
    }
}

/// Fill in missing coordinates for households and the meeting spot.
///
/// Existing coordinates are kept. Failures leave the location absent, which
/// the engine treats as "cannot be matched/sequenced".
pub fn resolve_snapshot_locations(
    snapshot: &mut EventSnapshot,
    geocoder: &dyn Geocoder,
) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    for record in &mut snapshot.households {
        if record.lat.is_some() && record.lng.is_some() {
            continue;
        }
        let found = record
            .address
            .as_deref()
            .filter(|address| !address.trim().is_empty())
            .and_then(|address| lookup(geocoder, &record.name, address));
        match found {
            Some(coordinate) => {
                record.lat = Some(coordinate.lat());
                record.lng = Some(coordinate.lng());
                report.resolved += 1;
            }
            None => report.unresolved.push(record.name.clone()),
        }
    }

    let spot = &mut snapshot.meeting_spot;
    if spot.location.is_none() {
        if let Some(address) = spot.address.as_deref() {
            spot.location = lookup(geocoder, "meeting spot", address);
            if spot.location.is_some() {
                report.resolved += 1;
            }
        }
    }
    report.meeting_spot_resolved = spot.location.is_some();

    debug!(
        resolved = report.resolved,
        unresolved = report.unresolved.len(),
        "resolved snapshot locations"
    );
    report
}
