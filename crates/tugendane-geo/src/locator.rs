//! Service lookup: geocoding, proximity search, and walking directions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use tugendane_core::{GeoPoint, Language, Service, ServiceCategory};
use tugendane_store::ServiceStore;

/// A service together with its distance from the search origin.
#[derive(Clone, Debug)]
pub struct ServiceHit {
    pub service: Service,
    pub distance_km: f64,
}

/// One leg of a walking route.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionStep {
    pub text: String,
    pub distance_meters: f64,
}

/// Errors from a locator backend.
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("Locator backend error: {0}")]
    Backend(String),
    #[error("Locator request timed out")]
    Timeout,
}

/// Geographic queries the dialog engine needs.
///
/// The engine only sees this trait; tests and the static deployment plug in
/// [`StaticLocator`], a networked deployment would wrap a routing API.
#[async_trait]
pub trait ServiceLocator: Send + Sync {
    /// Services within the search radius, nearest first. Ties keep
    /// registry order so repeated queries return a stable ranking.
    async fn nearest(
        &self,
        origin: GeoPoint,
        category: Option<ServiceCategory>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<ServiceHit>, LocatorError>;

    /// Resolve a free-text place name to coordinates.
    async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>, LocatorError>;

    /// Walking route between two points.
    async fn directions(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        language: Language,
    ) -> Result<Vec<DirectionStep>, LocatorError>;
}

/// Locator backed by the in-process service registry and a fixed gazetteer.
pub struct StaticLocator {
    services: Arc<ServiceStore>,
    gazetteer: HashMap<String, GeoPoint>,
}

impl StaticLocator {
    pub fn new(services: Arc<ServiceStore>) -> Self {
        Self {
            services,
            gazetteer: HashMap::new(),
        }
    }

    /// Register a place name the geocoder should resolve. Lookup is
    /// case-insensitive.
    pub fn add_place(&mut self, name: &str, point: GeoPoint) {
        self.gazetteer.insert(name.to_lowercase(), point);
    }
}

#[async_trait]
impl ServiceLocator for StaticLocator {
    async fn nearest(
        &self,
        origin: GeoPoint,
        category: Option<ServiceCategory>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<ServiceHit>, LocatorError> {
        let candidates = match category {
            Some(c) => self.services.by_category(c),
            None => self.services.all(),
        }
        .map_err(|e| LocatorError::Backend(e.to_string()))?;

        let mut hits: Vec<ServiceHit> = candidates
            .into_iter()
            .map(|service| {
                let distance_km = haversine_km(origin, service.location);
                ServiceHit {
                    service,
                    distance_km,
                }
            })
            .filter(|hit| hit.distance_km <= radius_km)
            .collect();
        // Stable sort: equal distances keep registry order.
        hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        hits.truncate(limit);
        debug!("Found {} services within {} km", hits.len(), radius_km);
        Ok(hits)
    }

    async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>, LocatorError> {
        Ok(self.gazetteer.get(&place.trim().to_lowercase()).copied())
    }

    async fn directions(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        language: Language,
    ) -> Result<Vec<DirectionStep>, LocatorError> {
        let total_m = haversine_km(from, to) * 1000.0;
        if total_m < 1.0 {
            return Ok(Vec::new());
        }
        let heading = compass_heading(from, to);
        let (head, turn, arrive) = match language {
            Language::En => (
                format!("Head {} on the main road", heading),
                "Turn right at the junction".to_string(),
                "Continue to your destination".to_string(),
            ),
            Language::Rw => (
                format!("Erekeza {} ku muhanda munini", heading_rw(heading)),
                "Hindukira iburyo ku isangano".to_string(),
                "Komeza kugeza aho ujya".to_string(),
            ),
        };
        Ok(vec![
            DirectionStep {
                text: head,
                distance_meters: total_m * 0.6,
            },
            DirectionStep {
                text: turn,
                distance_meters: total_m * 0.3,
            },
            DirectionStep {
                text: arrive,
                distance_meters: total_m * 0.1,
            },
        ])
    }
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

fn compass_heading(from: GeoPoint, to: GeoPoint) -> &'static str {
    let d_lat = to.lat - from.lat;
    let d_lng = to.lng - from.lng;
    if d_lat.abs() >= d_lng.abs() {
        if d_lat >= 0.0 {
            "north"
        } else {
            "south"
        }
    } else if d_lng >= 0.0 {
        "east"
    } else {
        "west"
    }
}

fn heading_rw(heading: &str) -> &'static str {
    match heading {
        "north" => "mu majyaruguru",
        "south" => "mu majyepfo",
        "east" => "mu burasirazuba",
        _ => "mu burengerazuba",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIGALI: GeoPoint = GeoPoint {
        lat: -1.9441,
        lng: 30.0619,
    };

    fn seeded_store() -> Arc<ServiceStore> {
        let store = Arc::new(ServiceStore::new());
        // Offsets of 0.01 degrees latitude are roughly 1.1 km.
        store
            .insert(
                "Kacyiru Hospital",
                ServiceCategory::Health,
                GeoPoint {
                    lat: KIGALI.lat + 0.01,
                    lng: KIGALI.lng,
                },
            )
            .unwrap();
        store
            .insert(
                "Remera Health Center",
                ServiceCategory::Health,
                GeoPoint {
                    lat: KIGALI.lat + 0.03,
                    lng: KIGALI.lng,
                },
            )
            .unwrap();
        store
            .insert(
                "Huye District Hospital",
                ServiceCategory::Health,
                GeoPoint {
                    lat: -2.59,
                    lng: 29.74,
                },
            )
            .unwrap();
        store
            .insert("RRA Kigali Office", ServiceCategory::Taxation, KIGALI)
            .unwrap();
        store
    }

    #[test]
    fn test_haversine_known_distance() {
        // Kigali to Huye is roughly 84 km as the crow flies.
        let huye = GeoPoint {
            lat: -2.59,
            lng: 29.74,
        };
        let d = haversine_km(KIGALI, huye);
        assert!((70.0..100.0).contains(&d), "got {}", d);
        assert!(haversine_km(KIGALI, KIGALI) < 1e-9);
    }

    #[tokio::test]
    async fn test_nearest_filters_radius_and_category() {
        let locator = StaticLocator::new(seeded_store());
        let hits = locator
            .nearest(KIGALI, Some(ServiceCategory::Health), 10.0, 3)
            .await
            .unwrap();
        // Huye is far outside the 10 km window.
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].service.name, "Kacyiru Hospital");
        assert_eq!(hits[1].service.name, "Remera Health Center");
        assert!(hits[0].distance_km < hits[1].distance_km);
    }

    #[tokio::test]
    async fn test_nearest_without_category_and_limit() {
        let locator = StaticLocator::new(seeded_store());
        let hits = locator.nearest(KIGALI, None, 10.0, 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].service.name, "RRA Kigali Office");
    }

    #[tokio::test]
    async fn test_nearest_empty_when_nothing_in_radius() {
        let locator = StaticLocator::new(Arc::new(ServiceStore::new()));
        let hits = locator.nearest(KIGALI, None, 10.0, 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_geocode_case_insensitive() {
        let mut locator = StaticLocator::new(Arc::new(ServiceStore::new()));
        locator.add_place("Kigali", KIGALI);
        assert_eq!(locator.geocode("kigali").await.unwrap(), Some(KIGALI));
        assert_eq!(locator.geocode("  KIGALI ").await.unwrap(), Some(KIGALI));
        assert!(locator.geocode("Mars").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directions_cover_full_distance() {
        let locator = StaticLocator::new(Arc::new(ServiceStore::new()));
        let to = GeoPoint {
            lat: KIGALI.lat + 0.01,
            lng: KIGALI.lng,
        };
        let steps = locator.directions(KIGALI, to, Language::En).await.unwrap();
        assert_eq!(steps.len(), 3);
        let total: f64 = steps.iter().map(|s| s.distance_meters).sum();
        let expected = haversine_km(KIGALI, to) * 1000.0;
        assert!((total - expected).abs() < 1.0);
        assert!(steps[0].text.starts_with("Head north"));
    }

    #[tokio::test]
    async fn test_directions_localized() {
        let locator = StaticLocator::new(Arc::new(ServiceStore::new()));
        let to = GeoPoint {
            lat: KIGALI.lat,
            lng: KIGALI.lng + 0.02,
        };
        let steps = locator.directions(KIGALI, to, Language::Rw).await.unwrap();
        assert!(steps[0].text.contains("mu burasirazuba"));
        assert!(steps[1].text.contains("Hindukira iburyo"));
    }

    #[tokio::test]
    async fn test_directions_empty_for_same_point() {
        let locator = StaticLocator::new(Arc::new(ServiceStore::new()));
        let steps = locator
            .directions(KIGALI, KIGALI, Language::En)
            .await
            .unwrap();
        assert!(steps.is_empty());
    }
}
