#![deny(clippy::all)]
#![forbid(unsafe_code)]

// FIXME: When derive_builder supports Rust 2018 syntax switch to a local import
#[macro_use]
extern crate derive_builder;

pub mod aixm;
pub mod args;
pub mod bucket;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geo;
pub mod geodesy;
pub mod magvar;
pub mod nasr;
pub mod positioned;
pub mod query;
pub mod record;
pub mod route;
pub mod search;
pub mod time;
mod txt_data;

pub use crate::args::{Leg, ObserverPosition, Resolver, Term};
pub use crate::catalog::{Catalog, MemoryCatalog};
pub use crate::config::{QueryConfig, QueryConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::geo::{Geod, Locate};
pub use crate::positioned::{Airport, Navaid, Positioned, PositionedType, Runway, TypeFilter};
pub use crate::query::{AirportQuery, Dispatcher};
pub use crate::record::{DefaultRecords, Record, RecordBuilder, RecordSchema, Value};
pub use crate::route::{Route, Waypoint};
