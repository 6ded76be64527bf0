//! Scenery tile buckets.
//!
//! The world is cut into rows 1/8 degree tall. The width of a bucket grows
//! towards the poles so each one covers a roughly similar area. A bucket is
//! identified by the integer degree square it lies in plus its x/y
//! subdivision inside that square.

use std::fmt;

use crate::geo::Geod;

const EPSILON: f64 = 0.000_000_1;

/// Longitudinal width of a bucket in degrees for the given latitude.
pub fn bucket_span(lat: f64) -> f64 {
    if lat >= 89.0 {
        12.0
    } else if lat >= 88.0 {
        8.0
    } else if lat >= 86.0 {
        4.0
    } else if lat >= 83.0 {
        2.0
    } else if lat >= 76.0 {
        1.0
    } else if lat >= 62.0 {
        0.5
    } else if lat >= 22.0 {
        0.25
    } else if lat >= -22.0 {
        0.125
    } else if lat >= -62.0 {
        0.25
    } else if lat >= -76.0 {
        0.5
    } else if lat >= -83.0 {
        1.0
    } else if lat >= -86.0 {
        2.0
    } else if lat >= -88.0 {
        4.0
    } else if lat >= -89.0 {
        8.0
    } else {
        12.0
    }
}

/// Floor towards negative infinity, treating values within EPSILON of an
/// integer as that integer.
fn floor_deg(d: f64) -> i32 {
    let diff = d - d.trunc();
    if d >= 0.0 || diff.abs() < EPSILON {
        d.trunc() as i32
    } else {
        d.trunc() as i32 - 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bucket {
    lon: i32,
    lat: i32,
    x: i32,
    y: i32,
}

impl Bucket {
    pub fn new(pos: &Geod) -> Self {
        let dlon = pos.longitude_deg();
        let dlat = pos.latitude_deg();
        let span = bucket_span(dlat);

        let mut lon = floor_deg(dlon);
        let x;
        if span <= 1.0 {
            x = ((dlon - lon as f64) / span) as i32;
        } else {
            if dlon >= 0.0 {
                lon = ((lon as f64 / span) as i32 as f64 * span) as i32;
            } else {
                lon = (((lon + 1) as f64 / span) as i32 as f64 * span - span) as i32;
                if lon < -180 {
                    lon = -180;
                }
            }
            x = 0;
        }

        let lat = floor_deg(dlat);
        let y = ((dlat - lat as f64) * 8.0) as i32;

        Bucket { lon, lat, x, y }
    }

    /// Bucket index as used in scenery file names.
    pub fn index(&self) -> i64 {
        (((self.lon + 180) as i64) << 14)
            + (((self.lat + 90) as i64) << 6)
            + ((self.y as i64) << 3)
            + self.x as i64
    }

    /// Two-level directory path, ten degree square then one degree square,
    /// e.g. `w130n30/w123n37`.
    pub fn base_path(&self) -> String {
        let mut top_lon = self.lon / 10;
        if self.lon < 0 && top_lon * 10 != self.lon {
            top_lon -= 1;
        }
        top_lon *= 10;
        let hem = if top_lon >= 0 { 'e' } else { 'w' };

        let mut top_lat = self.lat / 10;
        if self.lat < 0 && top_lat * 10 != self.lat {
            top_lat -= 1;
        }
        top_lat *= 10;
        let pole = if top_lat >= 0 { 'n' } else { 's' };

        format!(
            "{}{:03}{}{:02}/{}{:03}{}{:02}",
            hem,
            top_lon.abs(),
            pole,
            top_lat.abs(),
            hem,
            self.lon.abs(),
            pole,
            self.lat.abs()
        )
    }

    pub fn span_deg(&self) -> f64 {
        bucket_span(self.lat as f64 + self.y as f64 / 8.0)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.base_path(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(lat: f64, lon: f64) -> Bucket {
        Bucket::new(&Geod::from_deg(lat, lon).unwrap())
    }

    #[test]
    fn ksfo_path() {
        let b = bucket(37.6188, -122.3754);
        assert_eq!(b.base_path(), "w130n30/w123n37");
        assert_eq!(b.index(), 942_050);
    }

    #[test]
    fn eastern_southern_hemisphere() {
        // Sydney
        let b = bucket(-33.9461, 151.1772);
        assert_eq!(b.base_path(), "e150s40/e151s34");
    }

    #[test]
    fn exact_degree_boundaries() {
        let b = bucket(-10.0, -20.0);
        assert_eq!(b.base_path(), "w020s10/w020s10");
        let b = bucket(0.0, 0.0);
        assert_eq!(b.base_path(), "e000n00/e000n00");
        assert_eq!(b.index(), (180 << 14) + (90 << 6));
    }

    #[test]
    fn polar_buckets_are_wide() {
        let b = bucket(89.5, 7.0);
        assert_eq!(b.span_deg(), 12.0);
        assert_eq!(b.base_path(), "e000n80/e000n89");
        let b = bucket(-89.5, -7.0);
        assert_eq!(b.base_path(), "w020s90/w012s90");
    }

    #[test]
    fn span_narrows_at_the_equator() {
        assert_eq!(bucket_span(0.0), 0.125);
        assert_eq!(bucket_span(45.0), 0.25);
        assert_eq!(bucket_span(-70.0), 0.5);
    }
}
