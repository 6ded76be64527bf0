//! Distance-ranked catalog search.

use crate::catalog::Catalog;
use crate::geo::{Geod, Locate};
use crate::geodesy::{self, NM_TO_METER};
use crate::positioned::{Positioned, TypeFilter};

/// Search radius used when the caller gives none. Large enough to cover
/// almost any query from anywhere on the globe.
pub const DEFAULT_MAX_RANGE_NM: f64 = 10_000.0;

pub fn default_max_range_m() -> f64 {
    DEFAULT_MAX_RANGE_NM * NM_TO_METER
}

#[derive(Clone, Debug)]
pub struct Hit {
    pub entity: Positioned,
    pub distance_m: f64,
}

/// Distance-sorted and range-bounded. Equal distances keep candidate order.
pub fn rank<I>(origin: &Geod, candidates: I, max_range_m: f64) -> Vec<Hit>
where
    I: IntoIterator<Item = Positioned>,
{
    let mut hits: Vec<Hit> = candidates
        .into_iter()
        .map(|entity| {
            let distance_m = geodesy::distance_m(origin, &entity.geod());
            Hit { entity, distance_m }
        })
        .filter(|hit| hit.distance_m <= max_range_m)
        .collect();
    // sort_by is stable
    hits.sort_by(|a, b| a.distance_m.partial_cmp(&b.distance_m).unwrap_or(std::cmp::Ordering::Equal));
    hits
}

/// All entities matching `filter` and the optional identifier prefix,
/// nearest first.
pub fn search(
    catalog: &dyn Catalog,
    origin: &Geod,
    filter: TypeFilter,
    ident_prefix: Option<&str>,
    max_range_m: f64,
) -> Vec<Hit> {
    let candidates = catalog.find_by_ident_and_filter(origin, ident_prefix.unwrap_or(""), filter);
    let hits = rank(origin, candidates, max_range_m);
    tracing::debug!(
        filter = ?filter,
        prefix = ident_prefix.unwrap_or(""),
        count = hits.len(),
        "ranked search"
    );
    hits
}

/// Closest entity matching `filter`, by pure proximity.
pub fn nearest(catalog: &dyn Catalog, origin: &Geod, filter: TypeFilter, max_range_m: f64) -> Option<Hit> {
    let entity = catalog.find_closest(origin, max_range_m, filter)?;
    let distance_m = geodesy::distance_m(origin, &entity.geod());
    // guard against catalogs that are loose about the bound
    if distance_m > max_range_m {
        return None;
    }
    Some(Hit { entity, distance_m })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::positioned::{NavaidBuilder, PositionedType};
    use proptest::prelude::*;

    fn fix(ident: &str, lat: f64, lon: f64) -> Positioned {
        Positioned::from(
            NavaidBuilder::default()
                .ident(ident)
                .ty(PositionedType::Fix)
                .geod(Geod::from_deg(lat, lon).unwrap())
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn ranks_nearest_first() {
        let origin = Geod::from_deg(0.0, 0.0).unwrap();
        let hits = rank(
            &origin,
            vec![fix("FAR", 0.0, 3.0), fix("NEAR", 0.0, 1.0), fix("MID", 0.0, 2.0)],
            default_max_range_m(),
        );
        let idents: Vec<_> = hits.iter().map(|h| h.entity.ident()).collect();
        assert_eq!(idents, vec!["NEAR", "MID", "FAR"]);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let origin = Geod::from_deg(0.0, 0.0).unwrap();
        let hits = rank(
            &origin,
            vec![fix("B", 0.0, 1.0), fix("A", 0.0, 1.0), fix("C", 0.0, -1.0)],
            default_max_range_m(),
        );
        let idents: Vec<_> = hits.iter().map(|h| h.entity.ident()).collect();
        assert_eq!(idents, vec!["B", "A", "C"]);
    }

    #[test]
    fn out_of_range_is_dropped() {
        let origin = Geod::from_deg(0.0, 0.0).unwrap();
        let hits = rank(&origin, vec![fix("NEAR", 0.0, 1.0), fix("FAR", 0.0, 3.0)], 200_000.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity.ident(), "NEAR");
    }

    #[test]
    fn empty_catalog_gives_empty_result() {
        let catalog = MemoryCatalog::new();
        let origin = Geod::from_deg(10.0, 10.0).unwrap();
        assert!(search(&catalog, &origin, TypeFilter::Any, Some("HAM"), default_max_range_m()).is_empty());
        assert!(nearest(&catalog, &origin, TypeFilter::Airport, default_max_range_m()).is_none());
    }

    proptest! {
        #[test]
        fn ranked_results_are_ordered_and_bounded(
            points in prop::collection::vec((-60.0f64..60.0, -60.0f64..60.0), 0..40),
            range_km in 1.0f64..8_000.0,
        ) {
            let mut catalog = MemoryCatalog::new();
            for (i, &(lat, lon)) in points.iter().enumerate() {
                catalog.insert(fix(&format!("F{}", i), lat, lon));
            }
            let origin = Geod::from_deg(0.0, 0.0).unwrap();
            let max_range_m = range_km * 1000.0;
            let hits = search(&catalog, &origin, TypeFilter::Fix, None, max_range_m);
            for pair in hits.windows(2) {
                prop_assert!(pair[0].distance_m <= pair[1].distance_m);
            }
            for hit in &hits {
                prop_assert!(hit.distance_m <= max_range_m);
            }
        }
    }
}
