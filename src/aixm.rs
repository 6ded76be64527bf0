//! Records read from the FAA AIXM 5.1 subscriber files.

use crate::geo::Geod;
use crate::positioned::PositionedType;

pub mod parse;

/// An organisational unit. Only ARTCC units matter: they link to the
/// airports they control.
#[derive(Debug, Builder, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct Unit {
    pub designator: String,
    pub ty: String,
    pub airport_location: String,
}

#[derive(Clone, Debug, Builder)]
#[builder(private, setter(into))]
pub struct AirportRecord {
    /// `gml:id`, the target of unit links.
    pub id: String,
    /// FAA location identifier.
    pub designator: String,
    #[builder(default)]
    pub icao: Option<String>,
    #[builder(default)]
    pub name: String,
    pub ty: PositionedType,
    pub geod: Geod,
}

impl AirportRecord {
    /// ICAO location indicator where one is assigned, the FAA identifier
    /// otherwise.
    pub fn ident(&self) -> &str {
        self.icao.as_ref().unwrap_or(&self.designator)
    }
}

#[derive(Clone, Debug, Builder)]
#[builder(private, setter(into))]
pub struct NavaidRecord {
    pub designator: String,
    #[builder(default)]
    pub name: String,
    pub ty: PositionedType,
    pub geod: Geod,
    /// ARTCC responsible at low altitude.
    #[builder(default)]
    pub low_id: String,
}

/// AIXM `CodeAirportHeliportType`. The FAA files mark seaplane bases in the
/// name only.
pub fn airport_type(code: &str, name: &str) -> PositionedType {
    match code {
        "HP" => PositionedType::Heliport,
        _ if name.to_uppercase().contains("SEAPLANE BASE") => PositionedType::Seaport,
        _ => PositionedType::Airport,
    }
}

/// AIXM `CodeNavaidServiceType`. Unlisted services are not loaded.
pub fn navaid_type(code: &str) -> Option<PositionedType> {
    match code {
        "VOR" | "VOR_DME" | "VORTAC" => Some(PositionedType::Vor),
        "NDB" | "NDB_DME" | "NDB_MKR" => Some(PositionedType::Ndb),
        "TACAN" => Some(PositionedType::Tacan),
        "DME" => Some(PositionedType::Dme),
        "ILS" | "ILS_DME" => Some(PositionedType::Ils),
        "LOC" | "LOC_DME" => Some(PositionedType::Loc),
        _ => None,
    }
}
