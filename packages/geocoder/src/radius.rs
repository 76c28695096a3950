//! Approximate impact area when no neighborhood boundary is known.

use crate::{BoundaryPolygon, Coordinate, EARTH_RADIUS_METERS};

/// Radius used when the impacted-people count is unknown.
pub const UNKNOWN_IMPACT_RADIUS_METERS: u32 = 1000;

/// Default number of vertices for [`impact_circle`].
pub const CIRCLE_SEGMENTS: usize = 32;

/// `(exclusive upper bound on impacted people, radius in meters)`.
const RADIUS_STEPS: &[(u64, u32)] = &[(100, 300), (500, 750), (1000, 1200), (5000, 2000)];

/// Radius used by the map at or above the last step.
const MAX_RADIUS_METERS: u32 = 3000;

/// Impact-circle radius for a case, scaled by the number of people it
/// reaches.
#[must_use]
pub fn fallback_radius_meters(impacted_people: Option<u64>) -> u32 {
    let Some(impacted) = impacted_people else {
        return UNKNOWN_IMPACT_RADIUS_METERS;
    };

    RADIUS_STEPS
        .iter()
        .find(|(bound, _)| impacted < *bound)
        .map_or(MAX_RADIUS_METERS, |(_, radius)| *radius)
}

/// A closed ring approximating a circle of `radius_meters` around
/// `center`, with `segments` vertices (at least 3).
///
/// Points are computed on a sphere, so the ring stays round away from
/// the equator. Returns `None` when `center` is not finite.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn impact_circle(
    center: Coordinate,
    radius_meters: u32,
    segments: usize,
) -> Option<BoundaryPolygon> {
    let segments = segments.max(3);
    let angular = f64::from(radius_meters) / EARTH_RADIUS_METERS;
    let lat1 = center.latitude.to_radians();
    let lon1 = center.longitude.to_radians();

    let points = (0..segments)
        .map(|i| {
            let bearing = std::f64::consts::TAU * i as f64 / segments as f64;
            let lat2 = (lat1.sin() * angular.cos()
                + lat1.cos() * angular.sin() * bearing.cos())
            .asin();
            let lon2 = lon1
                + (bearing.sin() * angular.sin() * lat1.cos())
                    .atan2(angular.cos() - lat1.sin() * lat2.sin());
            Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
        })
        .collect();

    BoundaryPolygon::from_points(points)
}
