//! Indexed store of navigational entities.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;

use crate::geo::Geod;
use crate::positioned::{Airport, Navaid, Positioned, TypeFilter};
use crate::search;

/// Identifier and proximity lookup over airports and navaids.
///
/// Implementations own their entities and hand out shared handles.
pub trait Catalog {
    /// Exact identifier match, case-insensitive. Airports win over navaids
    /// sharing the same identifier.
    fn find_by_ident(&self, ident: &str) -> Option<Positioned>;

    /// Closest entity passing `filter` no farther than `max_range_m`.
    fn find_closest(&self, origin: &Geod, max_range_m: f64, filter: TypeFilter) -> Option<Positioned>;

    /// Every entity passing `filter` whose identifier or name starts with
    /// `ident` (case-insensitive; empty matches everything). Order is
    /// unspecified, ranking is the caller's job.
    fn find_by_ident_and_filter(&self, origin: &Geod, ident: &str, filter: TypeFilter) -> Vec<Positioned>;
}

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entries: Vec<Positioned>,
    by_ident: HashMap<String, Vec<usize>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<Positioned>>(&mut self, entity: P) -> Positioned {
        let entity = entity.into();
        self.by_ident
            .entry(entity.ident().to_uppercase())
            .or_insert_with(Vec::new)
            .push(self.entries.len());
        self.entries.push(entity.clone());
        entity
    }

    pub fn add_airport(&mut self, airport: Airport) -> Arc<Airport> {
        let airport = Arc::new(airport);
        self.insert(Positioned::Airport(airport.clone()));
        airport
    }

    pub fn add_navaid(&mut self, navaid: Navaid) -> Arc<Navaid> {
        let navaid = Arc::new(navaid);
        self.insert(Positioned::Navaid(navaid.clone()));
        navaid
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Positioned> {
        self.entries.iter()
    }

    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.ty().name())
            .sorted()
            .group_by(|name| *name)
            .into_iter()
            .map(|(name, group)| format!("{}={}", name, group.count()))
            .join(" ")
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack
            .chars()
            .zip(prefix.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
}

impl Catalog for MemoryCatalog {
    fn find_by_ident(&self, ident: &str) -> Option<Positioned> {
        let hits = self.by_ident.get(&ident.to_uppercase())?;
        hits.iter()
            .map(|&i| &self.entries[i])
            .find(|e| e.ty().is_airport())
            .or_else(|| hits.first().map(|&i| &self.entries[i]))
            .cloned()
    }

    fn find_closest(&self, origin: &Geod, max_range_m: f64, filter: TypeFilter) -> Option<Positioned> {
        let candidates = self.entries.iter().filter(|e| filter.matches(e.ty())).cloned();
        search::rank(origin, candidates, max_range_m)
            .into_iter()
            .next()
            .map(|hit| hit.entity)
    }

    fn find_by_ident_and_filter(&self, _origin: &Geod, ident: &str, filter: TypeFilter) -> Vec<Positioned> {
        self.entries
            .iter()
            .filter(|e| filter.matches(e.ty()))
            .filter(|e| starts_with_ignore_case(e.ident(), ident) || starts_with_ignore_case(e.name(), ident))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positioned::{AirportBuilder, NavaidBuilder, PositionedType};

    fn catalog() -> MemoryCatalog {
        let mut c = MemoryCatalog::new();
        c.add_airport(
            AirportBuilder::default()
                .ident("KSFO")
                .name("San Francisco Intl")
                .geod(Geod::from_deg(37.6188, -122.3754).unwrap())
                .build()
                .unwrap(),
        );
        c.add_airport(
            AirportBuilder::default()
                .ident("KOAK")
                .name("Metropolitan Oakland Intl")
                .geod(Geod::from_deg(37.7213, -122.2208).unwrap())
                .build()
                .unwrap(),
        );
        c.add_navaid(
            NavaidBuilder::default()
                .ident("SFO")
                .name("SAN FRANCISCO")
                .ty(PositionedType::Vor)
                .geod(Geod::from_deg(37.6193, -122.3738).unwrap())
                .frequency(11580u32)
                .build()
                .unwrap(),
        );
        c.add_navaid(
            NavaidBuilder::default()
                .ident("OAK")
                .name("OAKLAND")
                .ty(PositionedType::Vor)
                .geod(Geod::from_deg(37.7259, -122.2236).unwrap())
                .frequency(11680u32)
                .build()
                .unwrap(),
        );
        c
    }

    #[test]
    fn ident_lookup_is_case_insensitive() {
        let c = catalog();
        assert_eq!(c.find_by_ident("ksfo").map(|p| p.ident().to_string()), Some("KSFO".into()));
        assert!(c.find_by_ident("KXXX").is_none());
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn closest_respects_filter_and_range() {
        let c = catalog();
        let near_oak = Geod::from_deg(37.73, -122.22).unwrap();
        let apt = c.find_closest(&near_oak, 100_000.0, TypeFilter::Airport).unwrap();
        assert_eq!(apt.ident(), "KOAK");
        let vor = c.find_closest(&near_oak, 100_000.0, TypeFilter::Vor).unwrap();
        assert_eq!(vor.ident(), "OAK");
        assert!(c.find_closest(&near_oak, 100.0, TypeFilter::Airport).is_none());
        assert!(c.find_closest(&near_oak, 100_000.0, TypeFilter::Ndb).is_none());
    }

    #[test]
    fn prefix_matches_ident_or_name() {
        let c = catalog();
        let here = Geod::from_deg(0.0, 0.0).unwrap();
        let hits = c.find_by_ident_and_filter(&here, "oak", TypeFilter::Any);
        assert_eq!(hits.len(), 1);
        let hits = c.find_by_ident_and_filter(&here, "SAN", TypeFilter::Vor);
        assert_eq!(hits[0].ident(), "SFO");
        assert_eq!(c.find_by_ident_and_filter(&here, "", TypeFilter::Any).len(), 2);
    }

    #[test]
    fn summary_counts_types() {
        assert_eq!(catalog().summary(), "airport=2 vor=2");
    }
}
