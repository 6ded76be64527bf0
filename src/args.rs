//! Resolution of loosely shaped argument lists into coordinates.
//!
//! Every argument is first classified into a [`Term`]; the resolvers then
//! match the term slice against an ordered list of shapes. The first shape
//! that matches wins, anything left over is a caller contract violation.

use crate::error::{Error, Result};
use crate::geo::Geod;
use crate::record::Value;

/// How an argument takes part in resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Term<'a> {
    Number(f64),
    Ident(&'a str),
    /// Entity handle, waypoint handle, or a record carrying either or a
    /// numeric `lat`/`lon` pair.
    Position(Geod),
    Absent,
    Opaque,
}

impl<'a> Term<'a> {
    pub fn of(value: &'a Value) -> Term<'a> {
        match value {
            Value::Nil => Term::Absent,
            Value::Num(n) => Term::Number(*n),
            Value::Str(s) => Term::Ident(s),
            other => other.position().map(Term::Position).unwrap_or(Term::Opaque),
        }
    }

    pub fn classify(args: &'a [Value]) -> Vec<Term<'a>> {
        args.iter().map(Term::of).collect()
    }
}

pub trait ObserverPosition {
    fn observer_position(&self) -> Geod;
}

impl ObserverPosition for Geod {
    fn observer_position(&self) -> Geod {
        *self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub origin: Geod,
    pub destination: Geod,
}

pub struct Resolver<'o> {
    observer: &'o dyn ObserverPosition,
}

impl<'o> Resolver<'o> {
    pub fn new(observer: &'o dyn ObserverPosition) -> Self {
        Resolver { observer }
    }

    pub fn observer(&self) -> Geod {
        self.observer.observer_position()
    }

    /// Nothing, one position, or a lat,lon pair.
    pub fn single(&self, function: &str, args: &[Value]) -> Result<Geod> {
        match Term::classify(args).as_slice() {
            [] => Ok(self.observer()),
            [Term::Position(p)] => Ok(*p),
            [Term::Number(lat), Term::Number(lon)] => point(function, *lat, *lon),
            _ => Err(Error::contract(
                function,
                "expects no arguments, a positioned hash or lat,lon pair",
            )),
        }
    }

    /// The two point forms, tried in order:
    ///
    /// 1. `to` from the observer
    /// 2. `lat, lon` from the observer
    /// 3. `from, to`
    /// 4. `from, lat, lon`
    /// 5. `lat, lon, to`
    /// 6. `lat1, lon1, lat2, lon2`
    pub fn pair(&self, function: &str, args: &[Value]) -> Result<Leg> {
        let leg = |origin, destination| Ok(Leg { origin, destination });

        match Term::classify(args).as_slice() {
            [Term::Position(to)] => leg(self.observer(), *to),
            [Term::Number(lat), Term::Number(lon)] => leg(self.observer(), point(function, *lat, *lon)?),
            [Term::Position(from), Term::Position(to)] => leg(*from, *to),
            [Term::Position(from), Term::Number(lat), Term::Number(lon)] => {
                leg(*from, point(function, *lat, *lon)?)
            }
            [Term::Number(lat), Term::Number(lon), Term::Position(to)] => {
                leg(point(function, *lat, *lon)?, *to)
            }
            [Term::Number(lat1), Term::Number(lon1), Term::Number(lat2), Term::Number(lon2)] => leg(
                point(function, *lat1, *lon1)?,
                point(function, *lat2, *lon2)?,
            ),
            [_, _, _, _] => Err(Error::contract(function, "expected four numbers")),
            _ => Err(Error::contract(function, "invalid arguments")),
        }
    }

    /// Splits off an optional leading lat,lon pair. Without one the origin
    /// is the observer and every argument is returned untouched.
    pub fn leading_position<'v>(&self, function: &str, args: &'v [Value]) -> Result<(Geod, &'v [Value])> {
        match args {
            [Value::Num(lat), Value::Num(lon), rest @ ..] => Ok((point(function, *lat, *lon)?, rest)),
            _ => Ok((self.observer(), args)),
        }
    }
}

fn point(function: &str, lat: f64, lon: f64) -> Result<Geod> {
    Geod::from_deg(lat, lon)
        .map_err(|_| Error::contract(function, format!("lat,lon out of range: {},{}", lat, lon)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use proptest::prelude::*;

    fn observer() -> Geod {
        Geod::from_deg(51.47, -0.46).unwrap()
    }

    fn nums(v: &[f64]) -> Vec<Value> {
        v.iter().map(|&n| Value::Num(n)).collect()
    }

    fn hash(lat: f64, lon: f64) -> Value {
        Record::new().with("lat", lat).with("lon", lon).into()
    }

    #[test]
    fn terms() {
        let args = vec![Value::Nil, Value::Num(1.0), "KSFO".into(), hash(1.0, 2.0), Value::List(vec![])];
        let terms = Term::classify(&args);
        assert_eq!(terms[0], Term::Absent);
        assert_eq!(terms[1], Term::Number(1.0));
        assert_eq!(terms[2], Term::Ident("KSFO"));
        assert_eq!(terms[3], Term::Position(Geod::from_deg(1.0, 2.0).unwrap()));
        assert_eq!(terms[4], Term::Opaque);
    }

    #[test]
    fn single_forms() {
        let obs = observer();
        let r = Resolver::new(&obs);
        assert_eq!(r.single("magvar", &[]).unwrap(), obs);
        assert_eq!(r.single("magvar", &[hash(10.0, 20.0)]).unwrap(), Geod::from_deg(10.0, 20.0).unwrap());
        assert_eq!(r.single("magvar", &nums(&[10.0, 20.0])).unwrap(), Geod::from_deg(10.0, 20.0).unwrap());

        let err = r.single("magvar", &nums(&[1.0])).unwrap_err();
        assert!(err.is_contract());
        assert_eq!(
            err.to_string(),
            "magvar(): expects no arguments, a positioned hash or lat,lon pair"
        );
        assert!(r.single("magvar", &nums(&[1.0, 2.0, 3.0])).is_err());
        assert!(r.single("magvar", &["KSFO".into()]).is_err());
        assert!(r.single("magvar", &nums(&[91.0, 0.0])).unwrap_err().is_contract());
    }

    #[test]
    fn pair_forms() {
        let obs = observer();
        let r = Resolver::new(&obs);
        let a = Geod::from_deg(1.0, 2.0).unwrap();
        let b = Geod::from_deg(3.0, 4.0).unwrap();

        let leg = r.pair("courseAndDistance", &[hash(3.0, 4.0)]).unwrap();
        assert_eq!((leg.origin, leg.destination), (obs, b));

        let leg = r.pair("courseAndDistance", &nums(&[3.0, 4.0])).unwrap();
        assert_eq!((leg.origin, leg.destination), (obs, b));

        let leg = r.pair("courseAndDistance", &[hash(1.0, 2.0), hash(3.0, 4.0)]).unwrap();
        assert_eq!((leg.origin, leg.destination), (a, b));

        let leg = r
            .pair("courseAndDistance", &[hash(1.0, 2.0), Value::Num(3.0), Value::Num(4.0)])
            .unwrap();
        assert_eq!((leg.origin, leg.destination), (a, b));

        let leg = r
            .pair("courseAndDistance", &[Value::Num(1.0), Value::Num(2.0), hash(3.0, 4.0)])
            .unwrap();
        assert_eq!((leg.origin, leg.destination), (a, b));
    }

    #[test]
    fn pair_rejects_malformed_shapes() {
        let obs = observer();
        let r = Resolver::new(&obs);
        assert!(r.pair("courseAndDistance", &[]).unwrap_err().is_contract());
        assert!(r.pair("courseAndDistance", &nums(&[1.0])).is_err());
        assert!(r.pair("courseAndDistance", &nums(&[1.0, 2.0, 3.0])).is_err());
        assert!(r.pair("courseAndDistance", &nums(&[1.0, 2.0, 3.0, 4.0, 5.0])).is_err());

        let err = r
            .pair("courseAndDistance", &[Value::Num(1.0), Value::Num(2.0), Value::Num(3.0), "x".into()])
            .unwrap_err();
        assert_eq!(err.to_string(), "courseAndDistance(): expected four numbers");
    }

    #[test]
    fn leading_position_is_optional() {
        let obs = observer();
        let r = Resolver::new(&obs);
        let args = vec![Value::Num(10.0), Value::Num(20.0), "vor".into()];
        let (origin, rest) = r.leading_position("navinfo", &args).unwrap();
        assert_eq!(origin, Geod::from_deg(10.0, 20.0).unwrap());
        assert_eq!(rest.len(), 1);

        let args = vec![Value::from("vor"), Value::Num(1.0)];
        let (origin, rest) = r.leading_position("navinfo", &args).unwrap();
        assert_eq!(origin, obs);
        assert_eq!(rest.len(), 2);
    }

    proptest! {
        #[test]
        fn four_numbers_resolve_in_order(
            lat1 in -90.0f64..=90.0,
            lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0,
            lon2 in -180.0f64..=180.0,
        ) {
            let obs = observer();
            let leg = Resolver::new(&obs)
                .pair("courseAndDistance", &nums(&[lat1, lon1, lat2, lon2]))
                .unwrap();
            prop_assert_eq!(leg.origin, Geod::from_deg(lat1, lon1).unwrap());
            prop_assert_eq!(leg.destination, Geod::from_deg(lat2, lon2).unwrap());
        }

        #[test]
        fn no_arguments_is_the_observer(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let obs = Geod::from_deg(lat, lon).unwrap();
            prop_assert_eq!(Resolver::new(&obs).single("bucketPath", &[]).unwrap(), obs);
        }
    }
}
