//! Magnetic variation.
//!
//! The resolver only needs a position and a date; the field model itself is
//! behind [`MagneticModel`]. [`DipoleModel`] is a coarse stand-in built from
//! the first-degree IGRF terms and is good to a few degrees away from the
//! magnetic poles.

use crate::geo::Geod;
use crate::time::{jd_to_years_since_j2000, J2000_JD};

pub trait MagneticModel {
    /// Declination in degrees, east positive.
    fn variation_deg(&self, pos: &Geod, julian_date: f64) -> f64;
}

/// The same variation everywhere, at all times.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedVariation(pub f64);

impl MagneticModel for FixedVariation {
    fn variation_deg(&self, _pos: &Geod, _julian_date: f64) -> f64 {
        self.0
    }
}

/// Centred tilted dipole with linear secular variation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DipoleModel {
    /// Years since J2000.0 of the coefficient epoch.
    epoch_years: f64,
    g10: f64,
    g11: f64,
    h11: f64,
    dg10: f64,
    dg11: f64,
    dh11: f64,
}

impl DipoleModel {
    /// IGRF-13, epoch 2020.0, nT and nT/year.
    pub fn igrf2020() -> Self {
        DipoleModel {
            epoch_years: 20.0,
            g10: -29_404.8,
            g11: -1_450.9,
            h11: 4_652.5,
            dg10: 5.7,
            dg11: 7.4,
            dh11: -25.9,
        }
    }

    /// Position of the geomagnetic north pole, (lat, lon) in degrees.
    pub fn north_pole(&self, julian_date: f64) -> (f64, f64) {
        let dt = jd_to_years_since_j2000(julian_date) - self.epoch_years;
        let g10 = self.g10 + self.dg10 * dt;
        let g11 = self.g11 + self.dg11 * dt;
        let h11 = self.h11 + self.dh11 * dt;

        let b0 = (g10 * g10 + g11 * g11 + h11 * h11).sqrt();
        let lat = 90.0 - (-g10 / b0).acos().to_degrees();
        let lon = (-h11).atan2(-g11).to_degrees();
        (lat, lon)
    }
}

impl Default for DipoleModel {
    fn default() -> Self {
        DipoleModel::igrf2020()
    }
}

impl MagneticModel for DipoleModel {
    fn variation_deg(&self, pos: &Geod, julian_date: f64) -> f64 {
        // The horizontal field of a centred dipole lies along the great
        // circle through the geomagnetic pole.
        let (pole_lat, pole_lon) = self.north_pole(julian_date);
        let (lat1, lat2) = (pos.latitude_rad(), pole_lat.to_radians());
        let d_lon = pole_lon.to_radians() - pos.longitude_rad();

        let x = d_lon.sin() * lat2.cos();
        let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        let mut dec = x.atan2(y).to_degrees();
        if dec > 180.0 {
            dec -= 360.0;
        }
        dec
    }
}

/// Julian date of the model epoch, handy for reproducible queries.
pub fn igrf2020_epoch_jd() -> f64 {
    J2000_JD + 20.0 * 365.25
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geod(lat: f64, lon: f64) -> Geod {
        Geod::from_deg(lat, lon).unwrap()
    }

    #[test]
    fn pole_is_in_northern_canada() {
        let (lat, lon) = DipoleModel::igrf2020().north_pole(igrf2020_epoch_jd());
        assert!((lat - 80.6).abs() < 0.2, "{}", lat);
        assert!((lon + 72.7).abs() < 0.2, "{}", lon);
    }

    #[test]
    fn west_coast_is_east_of_true() {
        let m = DipoleModel::igrf2020();
        let dec = m.variation_deg(&geod(37.6188, -122.3754), igrf2020_epoch_jd());
        assert!(dec > 5.0 && dec < 25.0, "{}", dec);
    }

    #[test]
    fn europe_is_west_of_pole_meridian() {
        let m = DipoleModel::igrf2020();
        let dec = m.variation_deg(&geod(51.4775, -0.4614), igrf2020_epoch_jd());
        assert!(dec < 0.0, "{}", dec);
    }

    #[test]
    fn under_the_pole_meridian_is_zero() {
        let m = DipoleModel::igrf2020();
        let jd = igrf2020_epoch_jd();
        let (_, lon) = m.north_pole(jd);
        let dec = m.variation_deg(&geod(10.0, lon), jd);
        assert!(dec.abs() < 1e-9, "{}", dec);
    }

    #[test]
    fn drifts_with_date() {
        let m = DipoleModel::igrf2020();
        let here = geod(45.0, 10.0);
        let now = m.variation_deg(&here, igrf2020_epoch_jd());
        let later = m.variation_deg(&here, igrf2020_epoch_jd() + 365.25 * 10.0);
        assert!((now - later).abs() > 1e-3);
    }

    #[test]
    fn fixed_ignores_inputs() {
        assert_eq!(FixedVariation(-3.5).variation_deg(&geod(1.0, 2.0), 0.0), -3.5);
    }
}
