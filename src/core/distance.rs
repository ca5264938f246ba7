use geo::{Closest, ClosestPoint, Intersects, LineString, Point, Polygon};

use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[inline]
pub fn haversine_between(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Calculate a bounding box around a center point
///
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;
    let lon_delta = radius_km / (111.0 * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box (edges inclusive)
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lon >= bbox.min_lon && lon <= bbox.max_lon
}

/// Build a polygon from a GeoJSON-ordered `[lng, lat]` ring
pub fn polygon_from_ring(ring: &[[f64; 2]]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring.iter().map(|c| (c[0], c[1])).collect();
    Polygon::new(exterior, vec![])
}

/// Distance in km from a point to a polygon, 0 when the point lies inside or on
/// the boundary
///
/// The closest boundary point is found in planar lon/lat space and the distance
/// to it is then measured on the sphere, which is accurate enough at the scale
/// of a service region.
pub fn distance_to_polygon_km(point: GeoPoint, polygon: &Polygon<f64>) -> f64 {
    let p = Point::new(point.longitude, point.latitude);

    if polygon.intersects(&p) {
        return 0.0;
    }

    match polygon.exterior().closest_point(&p) {
        Closest::Intersection(c) | Closest::SinglePoint(c) => {
            haversine_distance(point.latitude, point.longitude, c.y(), c.x())
        }
        Closest::Indeterminate => polygon
            .exterior()
            .points()
            .map(|v| haversine_distance(point.latitude, point.longitude, v.y(), v.x()))
            .fold(f64::INFINITY, f64::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Auckland to Wellington (approximately 494 km)
        let distance = haversine_distance(-36.8485, 174.7633, -41.2865, 174.7762);
        assert!((distance - 494.0).abs() < 10.0, "Distance should be ~494km, got {}", distance);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(-36.8485, 174.7633, 10.0);

        assert!(bbox.min_lat < -36.8485);
        assert!(bbox.max_lat > -36.8485);
        assert!(bbox.min_lon < 174.7633);
        assert!(bbox.max_lon > 174.7633);

        // 20km / 111km per degree = ~0.18 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(-36.8485, 174.7633, 10.0);

        assert!(is_within_bounding_box(-36.8485, 174.7633, &bbox));
        assert!(is_within_bounding_box(-36.85, 174.77, &bbox));
        assert!(!is_within_bounding_box(-41.2865, 174.7762, &bbox));
    }

    fn square_around_auckland() -> Polygon<f64> {
        polygon_from_ring(&[
            [174.6, -37.0],
            [174.9, -37.0],
            [174.9, -36.7],
            [174.6, -36.7],
        ])
    }

    #[test]
    fn test_distance_to_polygon_inside_is_zero() {
        let polygon = square_around_auckland();
        assert_eq!(distance_to_polygon_km(GeoPoint::new(-36.85, 174.76), &polygon), 0.0);
    }

    #[test]
    fn test_distance_to_polygon_outside() {
        let polygon = square_around_auckland();
        // 0.1 degrees south of the southern edge is roughly 11 km
        let d = distance_to_polygon_km(GeoPoint::new(-37.1, 174.75), &polygon);
        assert!((d - 11.1).abs() < 1.0, "expected ~11km, got {}", d);
    }
}
