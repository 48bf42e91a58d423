pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

pub const MILES_PER_KM: f64 = 0.621371;
pub const FEET_PER_METER: f64 = 3.28084;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles / MILES_PER_KM
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Central angle between two WGS84 positions, in radians.
fn central_angle(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lat2_rad = to_radians(latitude_2);

    let dlat = to_radians(latitude_2 - latitude_1);
    let dlon = to_radians(longitude_2 - longitude_1);

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` slightly above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    EARTH_RADIUS_KM * central_angle(latitude_1, longitude_1, latitude_2, longitude_2)
}

pub fn haversine_distance_miles(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    EARTH_RADIUS_MILES
        * central_angle(latitude_1, longitude_1, latitude_2, longitude_2)
}

pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_arc_minute_of_latitude_is_about_a_statute_mile() {
        let distance = haversine_distance_miles(44.95, -93.10, 44.95 + 1.0 / 60.0, -93.10);
        assert!((distance - 1.15).abs() / 1.15 < 0.01, "got {distance}");
    }

    #[test]
    fn km_and_miles_use_the_same_angle() {
        let km = haversine_distance(40.6067, -74.0445, 40.912, -73.7348);
        let miles = haversine_distance_miles(40.6067, -74.0445, 40.912, -73.7348);
        assert!((km / EARTH_RADIUS_KM - miles / EARTH_RADIUS_MILES).abs() < 1e-12);
    }

    #[test]
    fn unit_conversions() {
        assert!((km_to_miles(42.195) - 26.2188).abs() < 1e-3);
        assert!((miles_to_km(km_to_miles(10.0)) - 10.0).abs() < 1e-9);
        assert_eq!(meters_to_feet(100.0).round(), 328.0);
    }

    #[test]
    fn coordinate_validation() {
        assert!(is_valid_coordinate(44.97, -93.26));
        assert!(!is_valid_coordinate(91.0, 0.0));
        assert!(!is_valid_coordinate(0.0, -181.0));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            lat1 in -89.0f64..89.0, lon1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0, lon2 in -179.0f64..179.0,
        ) {
            let there = haversine_distance_miles(lat1, lon1, lat2, lon2);
            let back = haversine_distance_miles(lat2, lon2, lat1, lon1);
            prop_assert!((there - back).abs() < 1e-9);
        }

        #[test]
        fn distance_to_self_is_zero(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            prop_assert_eq!(haversine_distance_miles(lat, lon, lat, lon), 0.0);
        }
    }
}
