use std::time::SystemTime;

/// Julian Date of the Unix epoch.
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian Date of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;

/// Source of the current simulated date.
pub trait SimClock {
    fn julian_date(&self) -> f64;
}

/// Follows the host's wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SimClock for SystemClock {
    fn julian_date(&self) -> f64 {
        let unix = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        unix_to_jd(unix)
    }
}

/// A frozen date.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedClock(pub f64);

impl SimClock for FixedClock {
    fn julian_date(&self) -> f64 {
        self.0
    }
}

/// Unix timestamp (seconds since 1970-01-01T00:00:00Z) to Julian Date.
pub fn unix_to_jd(unix_secs: f64) -> f64 {
    UNIX_EPOCH_JD + unix_secs / 86_400.0
}

/// Fractional Julian years since J2000.0.
pub fn jd_to_years_since_j2000(jd: f64) -> f64 {
    (jd - J2000_JD) / 365.25
}
