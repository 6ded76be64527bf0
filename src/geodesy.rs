//! Ellipsoidal geometry on WGS-84: course and distance between two points and
//! conversion to and from earth-centred cartesian coordinates.

use crate::geo::Geod;

// WGS-84 ellipsoid parameters
pub const WGS84_A: f64 = 6_378_137.0; // semi-major axis (m)
pub const WGS84_F: f64 = 1.0 / 298.257_223_563; // flattening
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F); // semi-minor axis
pub const WGS84_E2: f64 = 1.0 - (WGS84_B * WGS84_B) / (WGS84_A * WGS84_A); // first eccentricity squared

/// Mean earth radius, only used when the ellipsoidal solution fails.
const MEAN_RADIUS_M: f64 = 6_371_008.8;

pub const NM_TO_METER: f64 = 1852.0;
pub const METER_TO_NM: f64 = 1.0 / NM_TO_METER;
pub const FEET_TO_METER: f64 = 0.3048;
pub const METER_TO_FEET: f64 = 1.0 / FEET_TO_METER;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// Solution of the inverse geodesic problem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inverse {
    /// Course at the origin, degrees true in [0, 360).
    pub initial_course_deg: f64,
    /// Course along the geodesic on arrival at the destination.
    pub final_course_deg: f64,
    pub distance_m: f64,
}

impl Inverse {
    /// Course from the destination back to the origin.
    pub fn reverse_course_deg(&self) -> f64 {
        normalize_deg(self.final_course_deg + 180.0)
    }

    pub fn distance_nm(&self) -> f64 {
        self.distance_m * METER_TO_NM
    }
}

fn normalize_deg(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Vincenty's inverse formula. Nearly antipodal pairs where the iteration
/// does not settle are solved on the mean sphere instead.
pub fn inverse(from: &Geod, to: &Geod) -> Inverse {
    let (phi1, phi2) = (from.latitude_rad(), to.latitude_rad());
    let l = to.longitude_rad() - from.longitude_rad();

    let u1 = ((1.0 - WGS84_F) * phi1.tan()).atan();
    let u2 = ((1.0 - WGS84_F) * phi2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // coincident points
            return Inverse {
                initial_course_deg: 0.0,
                final_course_deg: 0.0,
                distance_m: 0.0,
            };
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        // equatorial line: cos2_alpha = 0
        let cos_2sigma_m = if cos2_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos2_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos2_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - previous).abs() < CONVERGENCE {
            let u_sq = cos2_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
            let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
            let distance_m = WGS84_B * a * (sigma - delta_sigma);

            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let alpha1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
            let alpha2 = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

            return Inverse {
                initial_course_deg: normalize_deg(alpha1.to_degrees()),
                final_course_deg: normalize_deg(alpha2.to_degrees()),
                distance_m,
            };
        }
    }

    tracing::debug!(from = %from, to = %to, "geodesic inverse did not converge, using sphere");
    spherical_inverse(from, to)
}

fn spherical_inverse(from: &Geod, to: &Geod) -> Inverse {
    let (lat1, lat2) = (from.latitude_rad(), to.latitude_rad());
    let d_lat = lat2 - lat1;
    let d_lon = to.longitude_rad() - from.longitude_rad();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    let course = |lat1: f64, lat2: f64, d_lon: f64| {
        let x = d_lon.sin() * lat2.cos();
        let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        normalize_deg(x.atan2(y).to_degrees())
    };
    let initial = course(lat1, lat2, d_lon);
    let back = course(lat2, lat1, -d_lon);

    Inverse {
        initial_course_deg: initial,
        final_course_deg: normalize_deg(back + 180.0),
        distance_m: MEAN_RADIUS_M * c,
    }
}

pub fn course_deg(from: &Geod, to: &Geod) -> f64 {
    inverse(from, to).initial_course_deg
}

pub fn distance_m(from: &Geod, to: &Geod) -> f64 {
    inverse(from, to).distance_m
}

pub fn distance_nm(from: &Geod, to: &Geod) -> f64 {
    distance_m(from, to) * METER_TO_NM
}

/// Geodetic (lat/lon/alt) to earth-centred cartesian XYZ in meters.
pub fn geod_to_cart(geod: &Geod) -> [f64; 3] {
    let (slat, clat) = geod.latitude_rad().sin_cos();
    let (slon, clon) = geod.longitude_rad().sin_cos();
    let alt = geod.elevation_m();

    // Radius of curvature in the prime vertical
    let n = WGS84_A / (1.0 - WGS84_E2 * slat * slat).sqrt();

    [
        (n + alt) * clat * clon,
        (n + alt) * clat * slon,
        (n * (1.0 - WGS84_E2) + alt) * slat,
    ]
}

/// Earth-centred cartesian XYZ to geodetic using Bowring's iteration.
pub fn cart_to_geod(xyz: [f64; 3]) -> Geod {
    let [x, y, z] = xyz;

    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..10 {
        let slat = lat.sin();
        let n = WGS84_A / (1.0 - WGS84_E2 * slat * slat).sqrt();
        let next = (z + WGS84_E2 * n * slat).atan2(p);
        let done = (next - lat).abs() < 1e-14;
        lat = next;
        if done {
            break;
        }
    }

    let (slat, clat) = lat.sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * slat * slat).sqrt();

    // near the poles p / cos(lat) is unstable
    let alt = if clat.abs() > 1e-10 {
        p / clat - n
    } else {
        z.abs() / slat.abs() - n * (1.0 - WGS84_E2)
    };

    Geod::from_rad_m(lat, lon, alt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn geod(lat: f64, lon: f64) -> Geod {
        Geod::from_deg(lat, lon).unwrap()
    }

    #[test]
    fn due_east_along_parallel() {
        let r = inverse(&geod(37.0, -122.0), &geod(37.0, -121.0));
        assert!((r.initial_course_deg - 90.0).abs() < 1.0, "{:?}", r);
        assert!(r.final_course_deg > 90.0 && r.final_course_deg < 91.0);
        // one degree of longitude at 37N is roughly 89 km
        assert!((r.distance_m - 89_012.0).abs() < 200.0, "{:?}", r);
    }

    #[test]
    fn one_degree_of_latitude_at_the_equator() {
        let r = inverse(&geod(0.0, 0.0), &geod(1.0, 0.0));
        assert!((r.distance_m - 110_574.4).abs() < 1.0, "{:?}", r);
        assert!(r.initial_course_deg.abs() < 1e-9);
    }

    #[test]
    fn zero_distance_to_self() {
        let a = geod(51.4775, -0.4614);
        assert_eq!(inverse(&a, &a).distance_m, 0.0);
    }

    #[test]
    fn nearly_antipodal_points_still_resolve() {
        let r = inverse(&geod(0.0, 0.0), &geod(0.5, 179.7));
        assert!(r.distance_m > 19_900_000.0 && r.distance_m < 20_100_000.0, "{:?}", r);
    }

    #[test]
    fn reverse_course_points_back() {
        let r = inverse(&geod(37.0, -122.0), &geod(37.0, -121.0));
        let back = inverse(&geod(37.0, -121.0), &geod(37.0, -122.0));
        assert!((r.reverse_course_deg() - back.initial_course_deg).abs() < 1e-6);
    }

    #[test]
    fn sfo_cartesian_sanity() {
        let xyz = geod_to_cart(&geod(37.6213, -122.379));
        assert!((xyz[0] + 2_708_752.4).abs() < 1.0, "{:?}", xyz);
        assert!((xyz[1] + 4_271_770.7).abs() < 1.0, "{:?}", xyz);
        assert!((xyz[2] - 3_872_236.2).abs() < 1.0, "{:?}", xyz);
    }

    #[test]
    fn poles_round_trip() {
        for &lat in &[90.0, -90.0] {
            let g = Geod::from_deg_m(lat, 0.0, 1000.0).unwrap();
            let back = cart_to_geod(geod_to_cart(&g));
            assert!((back.latitude_deg() - lat).abs() < 1e-6);
            assert!((back.elevation_m() - 1000.0).abs() < 1e-3);
        }
    }

    proptest! {
        #[test]
        fn cartesian_round_trip(
            lat in -89.9f64..89.9,
            lon in -179.9f64..179.9,
            alt in -500.0f64..20_000.0,
        ) {
            let g = Geod::from_deg_m(lat, lon, alt).unwrap();
            let back = cart_to_geod(geod_to_cart(&g));
            prop_assert!((back.latitude_deg() - lat).abs() < 1e-6);
            prop_assert!((back.longitude_deg() - lon).abs() < 1e-6);
            prop_assert!((back.elevation_m() - alt).abs() < 1e-3);
        }

        #[test]
        fn distance_is_symmetric(
            lat1 in -80.0f64..80.0,
            lon1 in -60.0f64..60.0,
            lat2 in -80.0f64..80.0,
            lon2 in -60.0f64..60.0,
        ) {
            let (a, b) = (geod(lat1, lon1), geod(lat2, lon2));
            let ab = inverse(&a, &b).distance_m;
            let ba = inverse(&b, &a).distance_m;
            prop_assert!((ab - ba).abs() < 1e-3, "{} vs {}", ab, ba);
            prop_assert_eq!(inverse(&a, &a).distance_m, 0.0);
        }
    }
}
