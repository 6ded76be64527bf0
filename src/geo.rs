use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::geodesy::{FEET_TO_METER, METER_TO_FEET};

/// A position on the WGS-84 ellipsoid in degrees, with elevation in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geod {
    lat: f64,
    lon: f64,
    elevation_m: f64,
}

impl Geod {
    /// Latitude and longitude in degrees, at zero elevation.
    pub fn from_deg(lat: f64, lon: f64) -> Result<Self> {
        Self::from_deg_m(lat, lon, 0.0)
    }

    pub fn from_deg_m(lat: f64, lon: f64, elevation_m: f64) -> Result<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && elevation_m.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        if !valid {
            return Err(Error::InvalidCoordinate { lat, lon });
        }
        Ok(Geod {
            lat,
            lon,
            elevation_m,
        })
    }

    pub fn from_deg_ft(lat: f64, lon: f64, elevation_ft: f64) -> Result<Self> {
        Self::from_deg_m(lat, lon, elevation_ft * FEET_TO_METER)
    }

    /// Radians in, already known to be in range (the output of the cartesian
    /// conversion). Longitude is normalised into [-180, 180].
    pub(crate) fn from_rad_m(lat: f64, lon: f64, elevation_m: f64) -> Self {
        let mut lon = lon.to_degrees();
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }
        Geod {
            lat: lat.to_degrees().max(-90.0).min(90.0),
            lon,
            elevation_m,
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        self.lat
    }

    pub fn longitude_deg(&self) -> f64 {
        self.lon
    }

    pub fn latitude_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    pub fn longitude_rad(&self) -> f64 {
        self.lon.to_radians()
    }

    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }

    pub fn elevation_ft(&self) -> f64 {
        self.elevation_m * METER_TO_FEET
    }

    pub fn with_elevation_m(self, elevation_m: f64) -> Self {
        Geod {
            elevation_m,
            ..self
        }
    }

    /// Parses a `gml:pos` body. AIXM writes "lat lon" for the FAA feeds.
    pub fn from_aixm(x: &str) -> Option<Self> {
        let mut parts = x.split_whitespace().map(|s| s.parse::<f64>());
        let lat = parts.next()?.ok()?;
        let lon = parts.next()?.ok()?;
        Geod::from_deg(lat, lon).ok()
    }

    //Ex: 31-53-00.510N
    pub fn from_fix_txt(lat: &str, lon: &str) -> Option<Self> {
        fn to_dd(d: f64, m: f64, s: f64) -> f64 {
            d + m / 60.0 + s / 3600.0
        }

        lazy_static! {
            static ref LAT_LON_REGEX: Regex = Regex::new(r"(\d+)-(\d+)-(\d+\.\d+)(\w)").unwrap();
        }

        let parse = |raw: &str| {
            LAT_LON_REGEX.captures(raw).and_then(|cap| {
                let (d, m, s, dir) = (&cap[1], &cap[2], &cap[3], &cap[4]);
                let (d, m, s) = (d.parse().ok()?, m.parse().ok()?, s.parse().ok()?);
                let dd = to_dd(d, m, s);
                Some(if dir == "S" || dir == "W" { -dd } else { dd })
            })
        };

        match (parse(lat), parse(lon)) {
            (Some(lat), Some(lon)) => Geod::from_deg(lat, lon).ok(),
            _ => None,
        }
    }

    /// Degrees-minutes-seconds, e.g. `N037.37.08.400 W122.22.30.000`.
    pub fn to_dms(self) -> String {
        fn to_dms(dd: f64) -> (i32, i32, f64) {
            let d = dd.trunc() as i32;
            let m = (dd.abs() * 60.0).trunc() as i32 % 60;
            let s = (dd.abs() * 3600.0) % 60.0;
            (d, m, s)
        }

        let mut tmp = String::new();
        tmp += if self.lat.is_sign_positive() { "N" } else { "S" };
        let (d, m, s) = to_dms(self.lat);
        tmp += &format!("{:03}.{:02}.{:06.03}", d.abs(), m, s);

        tmp += " ";

        tmp += if self.lon.is_sign_positive() { "E" } else { "W" };
        let (d, m, s) = to_dms(self.lon);
        tmp += &format!("{:03}.{:02}.{:06.03}", d.abs(), m, s);
        tmp
    }
}

impl fmt::Display for Geod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.6},{:.6},{:.1}m", self.lat, self.lon, self.elevation_m)
    }
}

/// Anything that can report where it is.
pub trait Locate {
    fn geod(&self) -> Geod;
}

impl Locate for Geod {
    fn geod(&self) -> Geod {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(Geod::from_deg(90.5, 0.0).is_err());
        assert!(Geod::from_deg(0.0, -180.01).is_err());
        assert!(Geod::from_deg(std::f64::NAN, 0.0).is_err());
        assert!(Geod::from_deg(-90.0, 180.0).is_ok());
    }

    #[test]
    fn parses_aixm_pos() {
        let g = Geod::from_aixm("29.984433 -95.341442").unwrap();
        assert_eq!(g.latitude_deg(), 29.984433);
        assert_eq!(g.longitude_deg(), -95.341442);
        assert!(Geod::from_aixm("29.98").is_none());
        assert!(Geod::from_aixm("abc def").is_none());
    }

    #[test]
    fn parses_fix_txt() {
        let g = Geod::from_fix_txt("31-53-00.510N", "095-10-30.000W").unwrap();
        assert!((g.latitude_deg() - 31.883475).abs() < 1e-6);
        assert!((g.longitude_deg() + 95.175).abs() < 1e-6);
        assert!(Geod::from_fix_txt("garbage", "095-10-30.000W").is_none());
    }

    #[test]
    fn formats_dms() {
        let g = Geod::from_deg(37.5, -122.25).unwrap();
        assert_eq!(g.to_dms(), "N037.30.00.000 W122.15.00.000");
    }

    #[test]
    fn feet_are_converted() {
        let g = Geod::from_deg_ft(0.0, 0.0, 1000.0).unwrap();
        assert!((g.elevation_m() - 304.8).abs() < 1e-9);
        assert!((g.elevation_ft() - 1000.0).abs() < 1e-9);
    }
}
