//! Public query entry points.
//!
//! A [`Dispatcher`] composes argument resolution, catalog search and geodesy
//! and hands results to its [`RecordBuilder`]. It keeps no state between
//! calls; every query borrows entity handles only for as long as it runs.

use std::sync::Arc;

use crate::args::{Leg, ObserverPosition, Resolver, Term};
use crate::bucket::Bucket;
use crate::catalog::Catalog;
use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::geo::Geod;
use crate::geodesy;
use crate::magvar::{DipoleModel, MagneticModel};
use crate::positioned::{Airport, PositionedType, TypeFilter};
use crate::record::{DefaultRecords, Record, RecordBuilder, Value};
use crate::route::{Route, Waypoint};
use crate::search::{self, Hit};
use crate::time::{SimClock, SystemClock};

/// Names accepted by [`Dispatcher::call`].
pub const FUNCTIONS: &[&str] = &[
    "airportinfo",
    "navinfo",
    "courseAndDistance",
    "magvar",
    "bucketPath",
    "carttogeod",
    "geodtocart",
    "route",
];

/// What an airport lookup is after.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AirportQuery<'s> {
    Nearest(TypeFilter),
    Ident(&'s str),
}

pub struct Dispatcher<'a> {
    catalog: &'a dyn Catalog,
    resolver: Resolver<'a>,
    route: Option<&'a Route>,
    clock: Box<dyn SimClock + 'a>,
    magnetic: Box<dyn MagneticModel + 'a>,
    records: Box<dyn RecordBuilder + 'a>,
    config: QueryConfig,
}

impl<'a> Dispatcher<'a> {
    /// Wall clock, IGRF dipole and default records.
    pub fn new(catalog: &'a dyn Catalog, observer: &'a dyn ObserverPosition) -> Self {
        let config = QueryConfig::default();
        Dispatcher {
            catalog,
            resolver: Resolver::new(observer),
            route: None,
            clock: Box::new(SystemClock),
            magnetic: Box::new(DipoleModel::igrf2020()),
            records: Box::new(DefaultRecords::new(config.schema.clone())),
            config,
        }
    }

    /// Also resets the record builder to the default one for the new schema.
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.records = Box::new(DefaultRecords::new(config.schema.clone()));
        self.config = config;
        self
    }

    pub fn with_route(mut self, route: &'a Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_clock<C: SimClock + 'a>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_magnetic_model<M: MagneticModel + 'a>(mut self, model: M) -> Self {
        self.magnetic = Box::new(model);
        self
    }

    pub fn with_records<R: RecordBuilder + 'a>(mut self, records: R) -> Self {
        self.records = Box::new(records);
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn observer(&self) -> Geod {
        self.resolver.observer()
    }

    pub fn find_airport(&self, origin: &Geod, query: AirportQuery) -> Option<Arc<Airport>> {
        match query {
            AirportQuery::Nearest(filter) => {
                search::nearest(self.catalog, origin, filter, self.config.max_range_m())
                    .and_then(|hit| hit.entity.as_airport().cloned())
            }
            AirportQuery::Ident(ident) => self
                .catalog
                .find_by_ident(ident)
                .and_then(|p| p.as_airport().cloned()),
        }
    }

    /// Navaids and fixes passing `filter`, nearest first. Aids beyond
    /// `max_range_nm` of `origin` are left out.
    pub fn find_navaids(&self, origin: &Geod, filter: TypeFilter, ident: Option<&str>) -> Vec<Hit> {
        search::search(self.catalog, origin, filter, ident, self.config.max_range_m())
            .into_iter()
            .filter(|hit| hit.entity.as_navaid().is_some())
            .collect()
    }

    /// Initial course in degrees and distance in nautical miles.
    pub fn course_and_distance(&self, leg: &Leg) -> (f64, f64) {
        let inverse = geodesy::inverse(&leg.origin, &leg.destination);
        (inverse.initial_course_deg, inverse.distance_nm())
    }

    /// Variation at `pos` on the current simulated date.
    pub fn magvar(&self, pos: &Geod) -> f64 {
        self.magnetic.variation_deg(pos, self.clock.julian_date())
    }

    pub fn bucket_path(&self, pos: &Geod) -> String {
        Bucket::new(pos).base_path()
    }

    /// Runs one of [`FUNCTIONS`] on script-shaped arguments.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        tracing::debug!(function = name, argc = args.len(), "call");
        match name {
            "airportinfo" => self.call_airportinfo(args),
            "navinfo" => self.call_navinfo(args),
            "courseAndDistance" => {
                let (course, distance) = self.course_and_distance(&self.resolver.pair(name, args)?);
                Ok(Value::List(vec![course.into(), distance.into()]))
            }
            "magvar" => Ok(self.magvar(&self.resolver.single(name, args)?).into()),
            "bucketPath" => Ok(self.bucket_path(&self.resolver.single(name, args)?).into()),
            "carttogeod" => {
                let [x, y, z] = three_numbers(name, args)?;
                let geod = geodesy::cart_to_geod([x, y, z]);
                Ok(numbers(&[geod.latitude_deg(), geod.longitude_deg(), geod.elevation_m()]))
            }
            "geodtocart" => {
                let [lat, lon, alt] = three_numbers(name, args)?;
                let geod = Geod::from_deg_m(lat, lon, alt)
                    .map_err(|_| Error::contract(name, format!("lat,lon out of range: {},{}", lat, lon)))?;
                Ok(numbers(&geodesy::geod_to_cart(&geod)))
            }
            "route" => {
                if !args.is_empty() {
                    return Err(Error::contract(name, "takes no arguments"));
                }
                Ok(self.records.route())
            }
            _ => Err(Error::contract(name, "no such function")),
        }
    }

    /// Runs a method on a record previously returned by a query.
    pub fn call_method(&self, me: &Value, name: &str, args: &[Value]) -> Result<Value> {
        tracing::debug!(method = name, argc = args.len(), "method call");
        match name {
            "tower" => {
                let airport = me
                    .as_record()
                    .and_then(Record::positioned)
                    .and_then(|p| p.as_airport())
                    .ok_or_else(|| Error::contract("airport.tower", "called on non-airport object"))?;
                let tower = airport.tower_location();
                Ok(Record::new()
                    .with("lat", tower.latitude_deg())
                    .with("lon", tower.longitude_deg())
                    .with("elevation", tower.elevation_m())
                    .into())
            }
            "getWP" | "currentWP" | "currentIndex" | "getPlanSize" => self.call_route_method(me, name, args),
            "navaid" | "airport" | "runway" => self.call_waypoint_method(me, name),
            _ => Err(Error::contract(name, "no such method")),
        }
    }

    fn call_airportinfo(&self, args: &[Value]) -> Result<Value> {
        const F: &str = "airportinfo";
        let (origin, rest) = self.resolver.leading_position(F, args)?;

        let query = match Term::classify(rest).as_slice() {
            [] => AirportQuery::Nearest(TypeFilter::Airport),
            [Term::Ident(s)] => match TypeFilter::airport_keyword(s) {
                Some(filter) => AirportQuery::Nearest(filter),
                None => AirportQuery::Ident(*s),
            },
            _ => return Err(Error::contract(F, "invalid function arguments")),
        };

        Ok(self
            .find_airport(&origin, query)
            .map_or(Value::Nil, |apt| self.records.airport(&apt)))
    }

    fn call_navinfo(&self, args: &[Value]) -> Result<Value> {
        const F: &str = "navinfo";
        let (origin, rest) = self.resolver.leading_position(F, args)?;

        let (filter, ident) = match Term::classify(rest).as_slice() {
            [] => (TypeFilter::Any, None),
            [Term::Ident(s)] => match TypeFilter::navaid_keyword(s) {
                Some(filter) => (filter, None),
                None => (TypeFilter::Any, Some(*s)),
            },
            [Term::Ident(keyword), Term::Ident(ident), extra @ ..] => {
                let filter = TypeFilter::navaid_keyword(keyword)
                    .ok_or_else(|| Error::contract(F, "called with navaid id"))?;
                if !extra.is_empty() {
                    return Err(Error::contract(F, "called with too many arguments"));
                }
                (filter, Some(*ident))
            }
            _ => return Err(Error::contract(F, "called with too many arguments")),
        };

        let records = self
            .find_navaids(&origin, filter, ident)
            .iter()
            .filter_map(|hit| hit.entity.as_navaid())
            .map(|nav| self.records.navaid(nav, &origin))
            .collect();
        Ok(Value::List(records))
    }

    fn call_route_method(&self, me: &Value, name: &str, args: &[Value]) -> Result<Value> {
        let is_route = me.as_record().map_or(false, |r| r.is_a(&self.config.schema.route));
        if !is_route {
            return Err(Error::contract(format!("route.{}", name), "called on non-route object"));
        }

        let empty = Route::default();
        let route = self.route.unwrap_or(&empty);
        let current = route.current_index();

        match (name, args) {
            ("getWP", []) | ("currentWP", _) => Ok(self.waypoint_at(route, current)),
            ("getWP", [Value::Num(index)]) => {
                if *index < 0.0 {
                    Ok(Value::Nil)
                } else {
                    Ok(self.waypoint_at(route, *index as usize))
                }
            }
            ("getWP", _) => Err(Error::contract("route.getWP", "expected a waypoint index")),
            ("currentIndex", _) => Ok((current as f64).into()),
            _ => Ok((route.len() as f64).into()),
        }
    }

    fn waypoint_at(&self, route: &Route, index: usize) -> Value {
        route
            .get(index)
            .map_or(Value::Nil, |wpt| self.records.waypoint(wpt, route.next_after(index)))
    }

    fn call_waypoint_method(&self, me: &Value, name: &str) -> Result<Value> {
        let wpt: &Arc<Waypoint> = me
            .as_record()
            .and_then(Record::waypoint)
            .ok_or_else(|| Error::contract(format!("waypoint.{}", name), "called on non-waypoint object"))?;

        let value = match name {
            "navaid" => wpt
                .navaid()
                .filter(|nav| nav.ty != PositionedType::Fix)
                .map(|nav| self.records.navaid(nav, &self.observer())),
            "airport" => wpt.airport().map(|apt| self.records.airport(apt)),
            _ => wpt.runway().map(|rwy| self.records.runway(rwy)),
        };
        Ok(value.unwrap_or(Value::Nil))
    }
}

fn three_numbers(function: &str, args: &[Value]) -> Result<[f64; 3]> {
    match args {
        [Value::Num(a), Value::Num(b), Value::Num(c)] => Ok([*a, *b, *c]),
        _ => Err(Error::contract(function, "expects 3 arguments")),
    }
}

fn numbers(values: &[f64]) -> Value {
    Value::List(values.iter().map(|&n| Value::Num(n)).collect())
}
