//! Navigational entities: airports, their runways, radio aids and fixes.
//!
//! Entities are immutable once built and shared through [`Positioned`]
//! handles. The catalog owns them; a query clones handles for as long as it
//! needs them.

use std::fmt;
use std::sync::Arc;

use crate::geo::{Geod, Locate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PositionedType {
    Airport,
    Seaport,
    Heliport,
    Runway,
    Fix,
    Vor,
    Ndb,
    Ils,
    Loc,
    Dme,
    Tacan,
}

impl PositionedType {
    pub fn name(self) -> &'static str {
        match self {
            PositionedType::Airport => "airport",
            PositionedType::Seaport => "seaport",
            PositionedType::Heliport => "heliport",
            PositionedType::Runway => "runway",
            PositionedType::Fix => "fix",
            PositionedType::Vor => "vor",
            PositionedType::Ndb => "ndb",
            PositionedType::Ils => "ils",
            PositionedType::Loc => "loc",
            PositionedType::Dme => "dme",
            PositionedType::Tacan => "tacan",
        }
    }

    pub fn is_airport(self) -> bool {
        match self {
            PositionedType::Airport | PositionedType::Seaport | PositionedType::Heliport => true,
            _ => false,
        }
    }

    pub fn is_navaid(self) -> bool {
        !self.is_airport() && self != PositionedType::Runway
    }
}

impl fmt::Display for PositionedType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Narrows a catalog search to one kind of entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    Airport,
    Seaport,
    Heliport,
    Fix,
    Vor,
    Ndb,
    Ils,
    Dme,
    Tacan,
    /// Any radio aid or fix. Never matches airports or runways.
    Any,
}

impl TypeFilter {
    pub fn airport_keyword(s: &str) -> Option<TypeFilter> {
        match s {
            "airport" => Some(TypeFilter::Airport),
            "seaport" => Some(TypeFilter::Seaport),
            "heliport" => Some(TypeFilter::Heliport),
            _ => None,
        }
    }

    pub fn navaid_keyword(s: &str) -> Option<TypeFilter> {
        match s {
            "any" => Some(TypeFilter::Any),
            "fix" => Some(TypeFilter::Fix),
            "vor" => Some(TypeFilter::Vor),
            "ndb" => Some(TypeFilter::Ndb),
            "ils" => Some(TypeFilter::Ils),
            "dme" => Some(TypeFilter::Dme),
            "tacan" => Some(TypeFilter::Tacan),
            _ => None,
        }
    }

    pub fn matches(self, ty: PositionedType) -> bool {
        use self::PositionedType as T;
        match self {
            TypeFilter::Airport => ty == T::Airport,
            TypeFilter::Seaport => ty == T::Seaport,
            TypeFilter::Heliport => ty == T::Heliport,
            TypeFilter::Fix => ty == T::Fix,
            TypeFilter::Vor => ty == T::Vor,
            TypeFilter::Ndb => ty == T::Ndb,
            TypeFilter::Ils => ty == T::Ils || ty == T::Loc,
            TypeFilter::Dme => ty == T::Dme,
            TypeFilter::Tacan => ty == T::Tacan,
            TypeFilter::Any => ty.is_navaid(),
        }
    }
}

#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct Airport {
    pub ident: String,
    #[builder(default)]
    pub name: String,
    #[builder(default = "PositionedType::Airport")]
    pub ty: PositionedType,
    /// Aerodrome reference point; elevation is the field elevation.
    pub geod: Geod,
    #[builder(default)]
    pub has_metar: bool,
    #[builder(default)]
    pub runways: Vec<Arc<Runway>>,
    #[builder(default)]
    pub tower: Option<Geod>,
}

impl Airport {
    pub fn runway(&self, ident: &str) -> Option<&Arc<Runway>> {
        self.runways.iter().find(|r| r.ident.eq_ignore_ascii_case(ident))
    }

    /// Tower position, or the reference point when none is recorded.
    pub fn tower_location(&self) -> Geod {
        self.tower.unwrap_or(self.geod)
    }
}

#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct Runway {
    pub ident: String,
    pub geod: Geod,
    #[builder(default)]
    pub heading_deg: f64,
    #[builder(default)]
    pub length_m: f64,
    #[builder(default)]
    pub width_m: f64,
    #[builder(default)]
    pub displaced_threshold_m: f64,
    #[builder(default)]
    pub stopway_m: f64,
    #[builder(default)]
    pub ils: Option<Arc<Navaid>>,
}

#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct Navaid {
    pub ident: String,
    #[builder(default)]
    pub name: String,
    pub ty: PositionedType,
    pub geod: Geod,
    /// 10 kHz units for VHF aids (11630 is 116.30 MHz), kHz for NDBs, zero
    /// for fixes.
    #[builder(default)]
    pub frequency: u32,
}

impl Navaid {
    pub fn frequency_mhz(&self) -> f64 {
        f64::from(self.frequency) / 100.0
    }
}

#[derive(Clone, Debug)]
pub enum Positioned {
    Airport(Arc<Airport>),
    Runway(Arc<Runway>),
    Navaid(Arc<Navaid>),
}

impl Positioned {
    pub fn ident(&self) -> &str {
        match self {
            Positioned::Airport(a) => &a.ident,
            Positioned::Runway(r) => &r.ident,
            Positioned::Navaid(n) => &n.ident,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Positioned::Airport(a) => &a.name,
            Positioned::Runway(r) => &r.ident,
            Positioned::Navaid(n) => &n.name,
        }
    }

    pub fn ty(&self) -> PositionedType {
        match self {
            Positioned::Airport(a) => a.ty,
            Positioned::Runway(_) => PositionedType::Runway,
            Positioned::Navaid(n) => n.ty,
        }
    }

    pub fn as_airport(&self) -> Option<&Arc<Airport>> {
        match self {
            Positioned::Airport(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_runway(&self) -> Option<&Arc<Runway>> {
        match self {
            Positioned::Runway(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_navaid(&self) -> Option<&Arc<Navaid>> {
        match self {
            Positioned::Navaid(n) => Some(n),
            _ => None,
        }
    }

    /// Same underlying entity, not merely equal fields.
    pub fn same(&self, other: &Positioned) -> bool {
        match (self, other) {
            (Positioned::Airport(a), Positioned::Airport(b)) => Arc::ptr_eq(a, b),
            (Positioned::Runway(a), Positioned::Runway(b)) => Arc::ptr_eq(a, b),
            (Positioned::Navaid(a), Positioned::Navaid(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Locate for Positioned {
    fn geod(&self) -> Geod {
        match self {
            Positioned::Airport(a) => a.geod,
            Positioned::Runway(r) => r.geod,
            Positioned::Navaid(n) => n.geod,
        }
    }
}

impl Locate for Airport {
    fn geod(&self) -> Geod {
        self.geod
    }
}

impl Locate for Runway {
    fn geod(&self) -> Geod {
        self.geod
    }
}

impl Locate for Navaid {
    fn geod(&self) -> Geod {
        self.geod
    }
}

impl From<Airport> for Positioned {
    fn from(a: Airport) -> Self {
        Positioned::Airport(Arc::new(a))
    }
}

impl From<Runway> for Positioned {
    fn from(r: Runway) -> Self {
        Positioned::Runway(Arc::new(r))
    }
}

impl From<Navaid> for Positioned {
    fn from(n: Navaid) -> Self {
        Positioned::Navaid(Arc::new(n))
    }
}

impl fmt::Display for Positioned {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ({})", self.ty(), self.ident(), self.geod().to_dms())
    }
}
