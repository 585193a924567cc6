//! Geographic services: geocoding, nearest-service search, and walking
//! directions rendering.

pub mod directions;
pub mod locator;

pub use directions::{distance_text, format_directions_text};
pub use locator::{
    haversine_km, DirectionStep, LocatorError, ServiceHit, ServiceLocator, StaticLocator,
};
