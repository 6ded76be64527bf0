//! Flight plan waypoints.

use std::sync::Arc;

use crate::geo::{Geod, Locate};
use crate::geodesy::{self, Inverse};
use crate::positioned::{Airport, Navaid, Positioned, Runway};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpeedRestriction {
    None,
    Knots(f64),
    Mach(f64),
}

impl Default for SpeedRestriction {
    fn default() -> Self {
        SpeedRestriction::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlyType {
    FlyBy,
    FlyOver,
    Hold,
}

impl FlyType {
    pub fn name(self) -> &'static str {
        match self {
            FlyType::FlyBy => "flyBy",
            FlyType::FlyOver => "flyOver",
            FlyType::Hold => "Hold",
        }
    }
}

#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct Waypoint {
    pub ident: String,
    /// Kind of leg terminator, e.g. "navaid", "basic", "runway", "hold".
    #[builder(default = "\"basic\".to_string()")]
    pub ty: String,
    pub geod: Geod,
    /// Catalog entity the waypoint was created from.
    #[builder(default)]
    pub source: Option<Positioned>,
    #[builder(default)]
    pub overflight: bool,
    #[builder(default)]
    pub altitude_ft: Option<f64>,
    #[builder(default)]
    pub speed: SpeedRestriction,
    #[builder(default)]
    pub heading_radial_deg: f64,
    /// SID, STAR or approach this waypoint belongs to.
    #[builder(default)]
    pub procedure: Option<String>,
}

impl Waypoint {
    /// Waypoint sitting on a catalog entity.
    pub fn from_positioned(source: Positioned) -> Self {
        let ty = match source {
            Positioned::Airport(_) => "airport",
            Positioned::Runway(_) => "runway",
            Positioned::Navaid(_) => "navaid",
        };
        Waypoint {
            ident: source.ident().to_string(),
            ty: ty.to_string(),
            geod: source.geod(),
            source: Some(source),
            overflight: false,
            altitude_ft: None,
            speed: SpeedRestriction::None,
            heading_radial_deg: 0.0,
            procedure: None,
        }
    }

    pub fn fly_type(&self) -> FlyType {
        if self.ty == "hold" {
            FlyType::Hold
        } else if self.overflight {
            FlyType::FlyOver
        } else {
            FlyType::FlyBy
        }
    }

    /// Course and distance from `from` to this waypoint.
    pub fn course_and_distance_from(&self, from: &Geod) -> Inverse {
        geodesy::inverse(from, &self.geod)
    }

    pub fn navaid(&self) -> Option<&Arc<Navaid>> {
        self.source.as_ref()?.as_navaid()
    }

    pub fn airport(&self) -> Option<&Arc<Airport>> {
        self.source.as_ref()?.as_airport()
    }

    pub fn runway(&self) -> Option<&Arc<Runway>> {
        self.source.as_ref()?.as_runway()
    }
}

impl Locate for Waypoint {
    fn geod(&self) -> Geod {
        self.geod
    }
}

/// The active flight plan.
#[derive(Clone, Debug, Default)]
pub struct Route {
    waypoints: Vec<Arc<Waypoint>>,
    current: usize,
}

impl Route {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Route {
            waypoints: waypoints.into_iter().map(Arc::new).collect(),
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Clamped to the last waypoint.
    pub fn set_current_index(&mut self, index: usize) {
        self.current = index.min(self.waypoints.len().saturating_sub(1));
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Waypoint>> {
        self.waypoints.get(index)
    }

    pub fn current(&self) -> Option<&Arc<Waypoint>> {
        self.get(self.current)
    }

    /// The waypoint after `index`, if any.
    pub fn next_after(&self, index: usize) -> Option<&Arc<Waypoint>> {
        self.get(index.checked_add(1)?)
    }
}
