//! Script-visible values and the records built from catalog entities.
//!
//! Field names are part of the public contract; existing scripts read them
//! directly.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::geo::{Geod, Locate};
use crate::geodesy::{self, METER_TO_NM};
use crate::positioned::{Airport, Navaid, Positioned, Runway};
use crate::route::{SpeedRestriction, Waypoint};

/// Field holding the entity handle of airport, runway and navaid records.
pub const POSITIONED_FIELD: &str = "_positioned";
pub const WAYPOINT_FIELD: &str = "_waypt";

#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Num(f64),
    Str(String),
    List(Vec<Value>),
    Record(Record),
    Positioned(Positioned),
    Waypoint(Arc<Waypoint>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        match self {
            Value::Nil => true,
            _ => false,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<Geod> {
        match self {
            Value::Positioned(p) => Some(p.geod()),
            Value::Waypoint(w) => Some(w.geod()),
            Value::Record(r) => r.position(),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Num(if b { 1.0 } else { 0.0 })
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Num(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(l) => write!(f, "[{}]", l.iter().join(", ")),
            Value::Record(r) => write!(f, "{}", r),
            Value::Positioned(p) => write!(f, "<{}>", p),
            Value::Waypoint(w) => write!(f, "<waypoint {}>", w.ident),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn num(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_num)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn positioned(&self) -> Option<&Positioned> {
        match self.get(POSITIONED_FIELD)? {
            Value::Positioned(p) => Some(p),
            _ => None,
        }
    }

    pub fn waypoint(&self) -> Option<&Arc<Waypoint>> {
        match self.get(WAYPOINT_FIELD)? {
            Value::Waypoint(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_a(&self, proto: &str) -> bool {
        self.get("parents")
            .and_then(Value::as_list)
            .map_or(false, |parents| parents.iter().any(|p| p.as_str() == Some(proto)))
    }

    /// Entity handle first, then waypoint handle, then plain `lat`/`lon`.
    pub fn position(&self) -> Option<Geod> {
        if let Some(p) = self.positioned() {
            return Some(p.geod());
        }
        if let Some(w) = self.waypoint() {
            return Some(w.geod());
        }
        match (self.num("lat"), self.num("lon")) {
            (Some(lat), Some(lon)) => Geod::from_deg(lat, lon).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.fields.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSchema {
    pub airport: String,
    pub route: String,
    pub waypoint: String,
}

impl Default for RecordSchema {
    fn default() -> Self {
        RecordSchema {
            airport: "airport".to_string(),
            route: "route".to_string(),
            waypoint: "waypoint".to_string(),
        }
    }
}

fn parents(proto: &str) -> Value {
    Value::List(vec![Value::Str(proto.to_string())])
}

/// Turns resolved entities into script-visible records.
pub trait RecordBuilder {
    fn airport(&self, apt: &Arc<Airport>) -> Value;
    fn runway(&self, rwy: &Arc<Runway>) -> Value;
    /// `relative_to` feeds the legacy `distance`/`bearing` fields.
    fn navaid(&self, nav: &Arc<Navaid>, relative_to: &Geod) -> Value;
    fn waypoint(&self, wpt: &Arc<Waypoint>, next: Option<&Arc<Waypoint>>) -> Value;
    fn route(&self) -> Value;
}

#[derive(Clone, Debug, Default)]
pub struct DefaultRecords {
    pub schema: RecordSchema,
}

impl DefaultRecords {
    pub fn new(schema: RecordSchema) -> Self {
        DefaultRecords { schema }
    }
}

impl RecordBuilder for DefaultRecords {
    fn airport(&self, apt: &Arc<Airport>) -> Value {
        let mut runways = Record::new();
        for rwy in &apt.runways {
            runways.set(rwy.ident.clone(), self.runway(rwy));
        }

        Record::new()
            .with("id", apt.ident.as_str())
            .with("name", apt.name.as_str())
            .with("lat", apt.geod.latitude_deg())
            .with("lon", apt.geod.longitude_deg())
            .with("elevation", apt.geod.elevation_m())
            .with("has_metar", apt.has_metar)
            .with("runways", runways)
            .with(POSITIONED_FIELD, Value::Positioned(Positioned::Airport(apt.clone())))
            .with("parents", parents(&self.schema.airport))
            .into()
    }

    fn runway(&self, rwy: &Arc<Runway>) -> Value {
        let mut rec = Record::new()
            .with("id", rwy.ident.as_str())
            .with("lat", rwy.geod.latitude_deg())
            .with("lon", rwy.geod.longitude_deg())
            .with("heading", rwy.heading_deg)
            .with("length", rwy.length_m)
            .with("width", rwy.width_m)
            .with("threshold", rwy.displaced_threshold_m)
            .with("stopway", rwy.stopway_m);

        if let Some(ils) = &rwy.ils {
            rec.set("ils_frequency_mhz", ils.frequency_mhz());
            // an ILS record has no meaningful reference point
            rec.set("ils", self.navaid(ils, &Geod::default()));
        }

        rec.with(POSITIONED_FIELD, Value::Positioned(Positioned::Runway(rwy.clone())))
            .into()
    }

    fn navaid(&self, nav: &Arc<Navaid>, relative_to: &Geod) -> Value {
        let leg = geodesy::inverse(relative_to, &nav.geod);
        Record::new()
            .with("id", nav.ident.as_str())
            .with("name", nav.name.as_str())
            .with("frequency", f64::from(nav.frequency))
            .with("lat", nav.geod.latitude_deg())
            .with("lon", nav.geod.longitude_deg())
            .with("elevation", nav.geod.elevation_m())
            .with("type", nav.ty.name())
            // meters, despite the legacy nautical mile round trip
            .with("distance", leg.distance_m)
            .with("bearing", leg.initial_course_deg)
            .with(POSITIONED_FIELD, Value::Positioned(Positioned::Navaid(nav.clone())))
            .into()
    }

    fn waypoint(&self, wpt: &Arc<Waypoint>, next: Option<&Arc<Waypoint>>) -> Value {
        let mut rec = Record::new();
        if let Some(procedure) = &wpt.procedure {
            rec.set("wp_parent_name", procedure.as_str());
        }
        rec.set("fly_type", wpt.fly_type().name())
            .set("wp_type", wpt.ty.as_str())
            .set("wp_name", wpt.ident.as_str())
            .set("wp_lat", wpt.geod.latitude_deg())
            .set("wp_lon", wpt.geod.longitude_deg())
            .set("alt_cstr", wpt.altitude_ft.unwrap_or(0.0));

        let speed = match wpt.speed {
            SpeedRestriction::None => 0.0,
            SpeedRestriction::Knots(kts) => kts,
            SpeedRestriction::Mach(mach) => mach,
        };
        rec.set("spd_cstr", speed);

        if let Some(next) = next {
            let leg = next.course_and_distance_from(&wpt.geod);
            rec.set("leg_distance", leg.distance_m * METER_TO_NM)
                .set("leg_bearing", leg.initial_course_deg)
                .set("hdg_radial", wpt.heading_radial_deg);
        }

        rec.with(WAYPOINT_FIELD, Value::Waypoint(wpt.clone()))
            .with("parents", parents(&self.schema.waypoint))
            .into()
    }

    fn route(&self) -> Value {
        Record::new().with("parents", parents(&self.schema.route)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positioned::{AirportBuilder, NavaidBuilder, PositionedType, RunwayBuilder};
    use crate::route::WaypointBuilder;

    fn ksfo() -> Arc<Airport> {
        let ils = NavaidBuilder::default()
            .ident("ISFO")
            .ty(PositionedType::Ils)
            .geod(Geod::from_deg(37.63, -122.39).unwrap())
            .frequency(10955u32)
            .build()
            .unwrap();
        let rwy = RunwayBuilder::default()
            .ident("28L")
            .geod(Geod::from_deg(37.6117, -122.3581).unwrap())
            .heading_deg(297.0)
            .length_m(3618.0)
            .width_m(61.0)
            .ils(Some(Arc::new(ils)))
            .build()
            .unwrap();
        Arc::new(
            AirportBuilder::default()
                .ident("KSFO")
                .name("San Francisco Intl")
                .geod(Geod::from_deg_ft(37.6188, -122.3754, 13.0).unwrap())
                .has_metar(true)
                .runways(vec![Arc::new(rwy)])
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn airport_fields() {
        let value = DefaultRecords::default().airport(&ksfo());
        let rec = value.as_record().unwrap();
        let keys: Vec<_> = rec.keys().collect();
        assert_eq!(
            keys,
            vec!["id", "name", "lat", "lon", "elevation", "has_metar", "runways", "_positioned", "parents"]
        );
        assert_eq!(rec.str("id"), Some("KSFO"));
        assert!((rec.num("elevation").unwrap() - 3.9624).abs() < 1e-9);
        assert_eq!(rec.num("has_metar"), Some(1.0));

        let rwy = rec.get("runways").and_then(Value::as_record).and_then(|r| r.get("28L")).unwrap();
        let rwy = rwy.as_record().unwrap();
        assert_eq!(rwy.num("heading"), Some(297.0));
        assert_eq!(rwy.num("ils_frequency_mhz"), Some(109.55));
        assert!(rwy.get("ils").and_then(Value::as_record).is_some());
    }

    #[test]
    fn airport_record_carries_its_position() {
        let value = DefaultRecords::default().airport(&ksfo());
        let pos = value.position().unwrap();
        assert_eq!(pos.latitude_deg(), 37.6188);
    }

    #[test]
    fn navaid_distance_is_in_meters() {
        let nav = Arc::new(
            NavaidBuilder::default()
                .ident("X")
                .ty(PositionedType::Vor)
                .geod(Geod::from_deg(1.0, 0.0).unwrap())
                .build()
                .unwrap(),
        );
        let value = DefaultRecords::default().navaid(&nav, &Geod::from_deg(0.0, 0.0).unwrap());
        let rec = value.as_record().unwrap();
        assert!((rec.num("distance").unwrap() - 110_574.4).abs() < 1.0);
        assert!(rec.num("bearing").unwrap().abs() < 1e-9);
        assert_eq!(rec.str("type"), Some("vor"));
    }

    #[test]
    fn waypoint_leg_fields_only_with_next() {
        let records = DefaultRecords::default();
        let a = Arc::new(
            WaypointBuilder::default()
                .ident("A")
                .geod(Geod::from_deg(0.0, 0.0).unwrap())
                .speed(SpeedRestriction::Mach(0.78))
                .procedure(Some("BDEGA2".to_string()))
                .build()
                .unwrap(),
        );
        let b = Arc::new(
            WaypointBuilder::default()
                .ident("B")
                .geod(Geod::from_deg(0.0, 1.0).unwrap())
                .build()
                .unwrap(),
        );

        let last = records.waypoint(&b, None);
        assert!(last.as_record().unwrap().get("leg_distance").is_none());

        let first = records.waypoint(&a, Some(&b));
        let rec = first.as_record().unwrap();
        assert_eq!(rec.str("wp_parent_name"), Some("BDEGA2"));
        assert_eq!(rec.num("spd_cstr"), Some(0.78));
        assert!((rec.num("leg_bearing").unwrap() - 90.0).abs() < 1e-6);
        assert!(rec.waypoint().is_some());
    }

    #[test]
    fn plain_lat_lon_record_is_a_position() {
        let rec = Record::new().with("lat", 10.0).with("lon", 20.0);
        assert_eq!(rec.position(), Some(Geod::from_deg(10.0, 20.0).unwrap()));
        assert!(Record::new().with("lat", 10.0).position().is_none());
        assert!(Record::new().with("lat", 100.0).with("lon", 0.0).position().is_none());
    }
}
